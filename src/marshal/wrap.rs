//! Native → runtime adapter
//!
//! [`wrap`] turns a curried native function into a [`Subr`]: a flat entry
//! point taking exactly `required + optional + rest` values, the frame shape
//! the runtime's dispatch hands to registered procedures.

use super::{invoke_partitioned, IntoDynResult};
use crate::arity::Arity;
use crate::error::{BridgeError, BridgeResult};
use crate::signature::{Curried, OptionalArgs, RequiredArgs, RestArgs};
use crate::value::DynValue;
use std::fmt;
use std::sync::Arc;

/// Flat entry point signature
pub type SubrFn = dyn Fn(&[DynValue]) -> BridgeResult<DynValue> + Send + Sync;

/// Fixed-arity entry point together with its arity triple
#[derive(Clone)]
pub struct Subr {
    arity: Arity,
    entry: Arc<SubrFn>,
}

impl Subr {
    /// Entry point over a hand-written flat function
    pub fn from_fn<F>(arity: Arity, entry: F) -> Self
    where
        F: Fn(&[DynValue]) -> BridgeResult<DynValue> + Send + Sync + 'static,
    {
        Self {
            arity,
            entry: Arc::new(entry),
        }
    }

    #[inline]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Run the entry point on a complete frame
    ///
    /// The frame must hold exactly `arity.flat_len()` values: absent
    /// optionals as the undefined sentinel, the rest group as one list.
    pub fn invoke(&self, frame: &[DynValue]) -> BridgeResult<DynValue> {
        let expected = self.arity.flat_len();
        if frame.len() != expected {
            return Err(BridgeError::FrameMismatch {
                expected,
                got: frame.len(),
            });
        }
        (self.entry)(frame)
    }
}

impl fmt::Debug for Subr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subr").field("arity", &self.arity).finish()
    }
}

/// Adapt a curried native function to a flat runtime entry point
///
/// ```
/// use gsubr::{wrap, Arity, DynValue};
///
/// let add_ish = wrap(|a: i64, b: i64| move |c: Option<i64>| move || a + b + c.unwrap_or(0));
/// assert_eq!(add_ish.arity(), Arity::new(2, 1, false));
///
/// let frame = [DynValue::from(3), DynValue::from(4), DynValue::undefined()];
/// assert_eq!(add_ish.invoke(&frame).unwrap(), DynValue::from(7));
/// ```
pub fn wrap<F, Req, Opt, Rest>(function: F) -> Subr
where
    F: Curried<Req, Opt, Rest> + Send + Sync + 'static,
    <F as Curried<Req, Opt, Rest>>::Output: IntoDynResult,
    Req: RequiredArgs,
    Opt: OptionalArgs,
    Rest: RestArgs,
{
    let arity = <F as Curried<Req, Opt, Rest>>::ARITY;

    Subr::from_fn(arity, move |frame: &[DynValue]| {
        let parts = arity.partition(frame.len()).ok_or(BridgeError::FrameMismatch {
            expected: arity.flat_len(),
            got: frame.len(),
        })?;

        // The rest slot of a frame already holds the collected list
        let result = invoke_partitioned(&function, frame, &parts, |tail| {
            tail.first().cloned().unwrap_or_else(DynValue::nil)
        })?;
        result.into_dyn_result()
    })
}
