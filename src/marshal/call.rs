//! Native-side invocation of curried functions with runtime values
//!
//! [`call`] takes the arguments as a fixed-size array, so the argument count
//! is a compile-time constant. A count the callee's arity cannot accept is a
//! build error:
//!
//! ```compile_fail
//! use gsubr::{call, DynValue};
//!
//! let add_ish = |a: i64, b: i64| move |c: Option<i64>| move || a + b + c.unwrap_or(0);
//! // two arguments are required
//! let _ = call(&add_ish, [DynValue::from(3)]);
//! ```
//!
//! ```compile_fail
//! use gsubr::{call, DynValue};
//!
//! let square = |x: i64| move || move || x * x;
//! // no rest layer, so no room for a second argument
//! let _ = call(&square, [DynValue::from(3), DynValue::from(4)]);
//! ```
//!
//! [`call_dynamic`] accepts a slice and performs the same check at run time.

use super::invoke_partitioned;
use crate::error::{BridgeError, BridgeResult};
use crate::signature::{Curried, OptionalArgs, RequiredArgs, RestArgs};
use crate::value::DynValue;
use std::marker::PhantomData;

/// Name reported when a native call site supplies a bad argument count
pub const NATIVE_CALLER: &str = "#<native>";

/// Compile-time acceptance check of `N` arguments
struct CallSite<Req, Opt, Rest, const N: usize>(PhantomData<fn() -> (Req, Opt, Rest)>);

impl<Req, Opt, Rest, const N: usize> CallSite<Req, Opt, Rest, N>
where
    Req: RequiredArgs,
    Opt: OptionalArgs,
    Rest: RestArgs,
{
    const ACCEPTED: () = {
        assert!(N >= Req::COUNT, "too few arguments for the required parameters");
        assert!(
            Rest::PRESENT || N <= Req::COUNT + Opt::COUNT,
            "too many arguments for a function without a rest parameter"
        );
    };
}

/// Call a curried function with `N` runtime values
///
/// The first `required` values fill the required layer, the next (up to
/// `optional`) fill the optional layer with missing positions absent, and
/// for functions with a rest layer everything beyond is collected into a
/// list, empty when nothing is left over.
///
/// ```
/// use gsubr::{call, DynValue};
///
/// let add_ish = |a: i64, b: i64| move |c: Option<i64>| move || a + b + c.unwrap_or(0);
/// assert_eq!(call(&add_ish, [DynValue::from(3), DynValue::from(4)]).unwrap(), 7);
/// ```
pub fn call<F, Req, Opt, Rest, const N: usize>(
    function: &F,
    args: [DynValue; N],
) -> BridgeResult<<F as Curried<Req, Opt, Rest>>::Output>
where
    F: Curried<Req, Opt, Rest>,
    Req: RequiredArgs,
    Opt: OptionalArgs,
    Rest: RestArgs,
{
    #[allow(clippy::let_unit_value)]
    let () = CallSite::<Req, Opt, Rest, N>::ACCEPTED;

    call_dynamic(function, &args)
}

/// Call a curried function with a run-time number of values
pub fn call_dynamic<F, Req, Opt, Rest>(
    function: &F,
    args: &[DynValue],
) -> BridgeResult<<F as Curried<Req, Opt, Rest>>::Output>
where
    F: Curried<Req, Opt, Rest>,
    Req: RequiredArgs,
    Opt: OptionalArgs,
    Rest: RestArgs,
{
    let arity = <F as Curried<Req, Opt, Rest>>::ARITY;
    let parts = arity
        .partition(args.len())
        .ok_or_else(|| BridgeError::ArityMismatch {
            name: NATIVE_CALLER.to_string(),
            arity,
            supplied: args.len(),
        })?;

    invoke_partitioned(function, args, &parts, |tail| {
        DynValue::list(tail.iter().cloned())
    })
}
