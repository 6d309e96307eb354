//! Native functions as Lisp-style procedures
//!
//! Native functions are written in a three-layer curried form, one layer per
//! parameter group:
//!
//! ```
//! # use gsubr::DynValue;
//! // (define (add-ish a b #:optional c) ...)
//! let add_ish = |a: i64, b: i64| move |c: Option<i64>| move || a + b + c.unwrap_or(0);
//! // (define (sum-all . items) ...)
//! let sum_all = || || |items: DynValue| items.list_len();
//! # let _ = (add_ish, sum_all);
//! ```
//!
//! The arity `(required, optional, rest)` is read off the layer signatures at
//! compile time. [`wrap`] turns such a function into a flat entry point for
//! registration in a [`Runtime`]; [`call`] invokes it from native code with
//! runtime values, splitting them at the same offsets the runtime uses.

// Core modules
pub mod arity;
pub mod error;
pub mod marshal;
pub mod signature;
pub mod value;

// Host boundary
pub mod runtime;

// Infrastructure
pub mod config;
pub mod logging;

// Demo consumer
pub mod tortoise;

// Re-export commonly used items
pub use arity::{Arity, Partition};
pub use config::{Config, LoggingConfig, RuntimeConfig};
pub use error::{BridgeError, BridgeResult, NativeError};
pub use logging::{init_dev_logging, init_logging, LogConfig, LogFormat, LogOutput};
pub use marshal::{call, call_dynamic, wrap, IntoDynResult, Subr};
pub use runtime::{with_runtime, Procedure, Runtime};
pub use signature::{arity_of, Curried};
pub use value::{Complex, DynValue, FromDyn, ToDyn, ValueKind};
