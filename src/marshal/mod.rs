//! Argument marshalling between native functions and the runtime
//!
//! Two adapters share one partitioning path:
//! - [`wrap`]: native → runtime, a flat entry point for registration
//! - [`call`] / [`call_dynamic`]: native code invoking a curried function
//!   with runtime values, as a script call would
//!
//! Both split their argument slice with [`Arity::partition`](crate::Arity::partition)
//! and hand the groups to [`invoke_partitioned`]; they differ only in how the
//! rest group becomes the rest list.

mod call;
mod result;
mod wrap;

pub use call::{call, call_dynamic, NATIVE_CALLER};
pub use result::IntoDynResult;
pub use wrap::{wrap, Subr, SubrFn};

use crate::arity::Partition;
use crate::error::BridgeResult;
use crate::signature::{Curried, OptionalArgs, RequiredArgs, RestArgs};
use crate::value::DynValue;

/// Coerce the groups of a partitioned argument slice and call through
///
/// `rest_list` turns the rest range into the single list value for the rest
/// layer; it is not called for functions without one.
pub(crate) fn invoke_partitioned<F, Req, Opt, Rest, L>(
    function: &F,
    args: &[DynValue],
    parts: &Partition,
    rest_list: L,
) -> BridgeResult<<F as Curried<Req, Opt, Rest>>::Output>
where
    F: Curried<Req, Opt, Rest>,
    Req: RequiredArgs,
    Opt: OptionalArgs,
    Rest: RestArgs,
    L: FnOnce(&[DynValue]) -> DynValue,
{
    let (required, optional, tail) = parts.split(args);

    let required = Req::from_args(required)?;
    let optional = Opt::from_args(optional)?;
    let rest = Rest::bind(|| rest_list(tail));

    tracing::trace!(
        target: "gsubr::marshal",
        required = parts.required.len(),
        optional = parts.optional.len(),
        rest = parts.rest.len(),
        "invoking native function"
    );

    Ok(function.call_curried(required, optional, rest))
}

/// Declare a native procedure with a flat parameter list
///
/// Generates a module holding the scheme-level `NAME`, the wrapped
/// [`Subr`], a `define` helper for registration and a `call` helper for
/// native call sites. Optional parameters are bound as `Option<T>`.
///
/// ```
/// use gsubr::{define_subr, DynValue, Runtime};
///
/// define_subr! {
///     fn add_ish = "add-ish" (a: i64, b: i64) [c: i64] -> i64 {
///         a + b + c.unwrap_or(0)
///     }
/// }
///
/// assert_eq!(add_ish::call([DynValue::from(3), DynValue::from(4)]).unwrap(), 7);
///
/// let runtime = Runtime::default();
/// let sum = runtime.enter(|| {
///     add_ish::define(&runtime)?;
///     runtime.call("add-ish", &[DynValue::from(3), DynValue::from(4), DynValue::from(10)])
/// });
/// assert_eq!(sum.unwrap(), DynValue::from(17));
/// ```
#[macro_export]
macro_rules! define_subr {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident = $scheme_name:literal
            ($($req:ident : $rt:ty),* $(,)?)
            [$($opt:ident : $ot:ty),* $(,)?]
            $(rest $rest:ident)?
            -> $ret:ty $body:block
    ) => {
        $(#[$meta])*
        #[allow(non_snake_case)]
        $vis mod $name {
            #[allow(unused_imports)]
            use super::*;

            /// Name the procedure is registered under
            pub const NAME: &str = $scheme_name;

            #[allow(unused_variables, clippy::too_many_arguments)]
            fn body(
                $($req: $rt,)*
                $($opt: ::core::option::Option<$ot>,)*
                $($rest: $crate::DynValue)?
            ) -> $ret $body

            /// Flat entry point
            pub fn subr() -> $crate::Subr {
                $crate::wrap($crate::curried!(
                    ($($req: $rt),*) ($($opt: $ot),*) ($($rest)?)
                        => body($($req,)* $($opt,)* $($rest)?)
                ))
            }

            /// Bind the procedure in `runtime`'s global namespace
            pub fn define(runtime: &$crate::Runtime) -> $crate::BridgeResult<$crate::DynValue> {
                runtime.define_gsubr(NAME, subr())
            }

            /// Invoke from native code with runtime values
            pub fn call<const N: usize>(
                args: [$crate::DynValue; N],
            ) -> $crate::BridgeResult<$ret> {
                $crate::call(
                    &$crate::curried!(
                        ($($req: $rt),*) ($($opt: $ot),*) ($($rest)?)
                            => body($($req,)* $($opt,)* $($rest)?)
                    ),
                    args,
                )
            }
        }
    };
}

#[cfg(test)]
mod tests;
