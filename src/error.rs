//! Error types for the bridge
//!
//! Every fallible operation in the crate returns [`BridgeResult`]. Errors raised
//! by wrapped native functions travel through the adapters inside
//! [`BridgeError::Native`] without being rewritten.

use crate::arity::Arity;
use crate::value::ValueKind;
use std::fmt;

/// Crate-wide result alias
pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug)]
pub enum BridgeError {
    /// Script-level call with an argument count the callee's arity rejects
    ArityMismatch {
        name: String,
        arity: Arity,
        supplied: usize,
    },
    /// Adapter entry point invoked with a frame of the wrong width
    FrameMismatch { expected: usize, got: usize },
    /// Registration exceeds the runtime's parameter limit
    ArityLimit {
        name: String,
        arity: Arity,
        limit: usize,
    },
    WrongType {
        expected: &'static str,
        found: ValueKind,
    },
    OutOfRange {
        target: &'static str,
        value: String,
    },
    NotAList { found: ValueKind },
    UnboundVariable { name: String },
    NotCallable { found: ValueKind },
    DivisionByZero,
    NumericOverflow { op: &'static str },
    /// Runtime used from a thread that has not entered it
    NotEntered,
    /// Failure raised by a native function
    Native(NativeError),
    Config(String),
}

impl BridgeError {
    /// Wrap an arbitrary native error
    pub fn native<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Native(NativeError::new(error))
    }

    /// Native failure carrying only a message
    pub fn native_msg(message: impl Into<String>) -> Self {
        Self::Native(NativeError::msg(message))
    }

    pub fn wrong_type(expected: &'static str, found: ValueKind) -> Self {
        Self::WrongType { expected, found }
    }

    /// True for errors reported by runtime dispatch before any adapter ran
    pub fn is_arity_mismatch(&self) -> bool {
        matches!(self, Self::ArityMismatch { .. })
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch { name, arity, supplied } => {
                write!(
                    f,
                    "Wrong number of arguments to {}: expected {}, got {}",
                    name,
                    arity.describe_counts(),
                    supplied
                )
            }
            Self::FrameMismatch { expected, got } => {
                write!(f, "Malformed call frame: expected {} slots, got {}", expected, got)
            }
            Self::ArityLimit { name, arity, limit } => {
                write!(
                    f,
                    "Cannot define {} with arity {}: runtime accepts at most {} parameters",
                    name, arity, limit
                )
            }
            Self::WrongType { expected, found } => {
                write!(f, "Wrong type: expected {}, found {}", expected, found)
            }
            Self::OutOfRange { target, value } => {
                write!(f, "Value out of range for {}: {}", target, value)
            }
            Self::NotAList { found } => write!(f, "Expected a proper list, found {}", found),
            Self::UnboundVariable { name } => write!(f, "Unbound variable: {}", name),
            Self::NotCallable { found } => write!(f, "Wrong type to apply: {}", found),
            Self::DivisionByZero => write!(f, "Numerical division by zero"),
            Self::NumericOverflow { op } => write!(f, "Numeric overflow in {}", op),
            Self::NotEntered => write!(f, "Runtime called from a thread that has not entered it"),
            Self::Native(err) => write!(f, "{}", err),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Native(err) => err.source_error(),
            _ => None,
        }
    }
}

impl From<NativeError> for BridgeError {
    fn from(err: NativeError) -> Self {
        Self::Native(err)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for BridgeError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Native(NativeError::boxed(err))
    }
}

/// Error raised inside a wrapped native function
///
/// Holds the original error so callers can downcast it back.
pub struct NativeError {
    inner: NativeErrorInner,
}

enum NativeErrorInner {
    Error(Box<dyn std::error::Error + Send + Sync>),
    Message(String),
}

impl NativeError {
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::boxed(Box::new(error))
    }

    pub fn boxed(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self {
            inner: NativeErrorInner::Error(error),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            inner: NativeErrorInner::Message(message.into()),
        }
    }

    /// Recover the original error type
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match &self.inner {
            NativeErrorInner::Error(err) => err.downcast_ref::<E>(),
            NativeErrorInner::Message(_) => None,
        }
    }

    fn source_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.inner {
            NativeErrorInner::Error(err) => Some(err.as_ref()),
            NativeErrorInner::Message(_) => None,
        }
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            NativeErrorInner::Error(err) => write!(f, "{}", err),
            NativeErrorInner::Message(msg) => f.write_str(msg),
        }
    }
}

impl fmt::Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            NativeErrorInner::Error(err) => f.debug_tuple("NativeError").field(err).finish(),
            NativeErrorInner::Message(msg) => f.debug_tuple("NativeError").field(msg).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct PenJammed;

    impl fmt::Display for PenJammed {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "pen jammed")
        }
    }

    impl std::error::Error for PenJammed {}

    #[test]
    fn test_arity_mismatch_message() {
        let err = BridgeError::ArityMismatch {
            name: "add-ish".to_string(),
            arity: Arity::new(2, 1, false),
            supplied: 1,
        };
        assert_eq!(
            err.to_string(),
            "Wrong number of arguments to add-ish: expected 2 to 3, got 1"
        );
        assert!(err.is_arity_mismatch());
    }

    #[test]
    fn test_native_error_is_not_rewritten() {
        let err = BridgeError::native(PenJammed);
        assert_eq!(err.to_string(), "pen jammed");

        match &err {
            BridgeError::Native(native) => assert!(native.downcast_ref::<PenJammed>().is_some()),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_native_message() {
        let err = BridgeError::native_msg("out of ink");
        assert_eq!(err.to_string(), "out of ink");
        assert!(std::error::Error::source(&err).is_none());
    }
}
