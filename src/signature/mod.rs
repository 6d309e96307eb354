//! Curried signatures and compile-time arity classification
//!
//! A native function exposed to the runtime is written as three nested
//! call layers:
//!
//! ```text
//! |required...| -> |optional: Option<_>...| -> |rest?| -> result
//! ```
//!
//! The first layer is a reusable `Fn`; the two inner layers are produced
//! fresh per call and only need to be `FnOnce`. The parameter tuples of the
//! three layers are inferred by the trait system, and [`Curried::ARITY`]
//! counts them into an [`Arity`] without running anything.
//!
//! The rest layer takes nothing or exactly one [`DynValue`]. Anything else
//! has no [`RestArgs`] impl and is rejected when the function is wrapped:
//!
//! ```compile_fail
//! use gsubr::{wrap, DynValue};
//!
//! let two_rests = |a: i64| move || move |x: DynValue, y: DynValue| a;
//! let _ = wrap(two_rests);
//! ```

use crate::arity::Arity;
use crate::error::{BridgeError, BridgeResult};
use crate::value::{DynValue, FromDyn};

/// Outer layer: called once per invocation, borrowed
pub trait Entry<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

/// Inner layer: consumed by its single call
pub trait Layer<Args> {
    type Output;

    fn invoke_once(self, args: Args) -> Self::Output;
}

/// Parameter group of the required layer
pub trait RequiredArgs: Sized {
    const COUNT: usize;

    /// Coerce exactly `COUNT` values
    fn from_args(args: &[DynValue]) -> BridgeResult<Self>;
}

/// Parameter group of the optional layer
pub trait OptionalArgs: Sized {
    const COUNT: usize;

    /// Coerce up to `COUNT` values; missing and undefined slots become `None`
    fn from_args(args: &[DynValue]) -> BridgeResult<Self>;
}

/// Parameter group of the rest layer: `()` or `(DynValue,)`
pub trait RestArgs: Sized {
    const PRESENT: bool;

    /// Build the group, pulling the rest list only when there is a slot for it
    fn bind<L>(list: L) -> Self
    where
        L: FnOnce() -> DynValue;
}

impl RestArgs for () {
    const PRESENT: bool = false;

    #[inline]
    fn bind<L>(_list: L) -> Self
    where
        L: FnOnce() -> DynValue,
    {
    }
}

impl RestArgs for (DynValue,) {
    const PRESENT: bool = true;

    #[inline]
    fn bind<L>(list: L) -> Self
    where
        L: FnOnce() -> DynValue,
    {
        (list(),)
    }
}

macro_rules! count_idents {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count_idents!($($tail)*) };
}

#[inline]
fn next_slot<'a>(
    slots: &mut std::slice::Iter<'a, DynValue>,
    expected: usize,
    got: usize,
) -> BridgeResult<&'a DynValue> {
    slots
        .next()
        .ok_or(BridgeError::FrameMismatch { expected, got })
}

macro_rules! impl_layers {
    ($($t:ident),*) => {
        impl<F, O $(, $t)*> Entry<($($t,)*)> for F
        where
            F: Fn($($t),*) -> O,
        {
            type Output = O;

            #[inline]
            #[allow(non_snake_case)]
            fn invoke(&self, args: ($($t,)*)) -> O {
                let ($($t,)*) = args;
                (self)($($t),*)
            }
        }

        impl<F, O $(, $t)*> Layer<($($t,)*)> for F
        where
            F: FnOnce($($t),*) -> O,
        {
            type Output = O;

            #[inline]
            #[allow(non_snake_case)]
            fn invoke_once(self, args: ($($t,)*)) -> O {
                let ($($t,)*) = args;
                (self)($($t),*)
            }
        }

        impl<$($t: FromDyn),*> RequiredArgs for ($($t,)*) {
            const COUNT: usize = count_idents!($($t)*);

            #[allow(unused_mut, unused_variables)]
            fn from_args(args: &[DynValue]) -> BridgeResult<Self> {
                // `()` is both a required and an optional group
                let count = <Self as RequiredArgs>::COUNT;
                if args.len() != count {
                    return Err(BridgeError::FrameMismatch {
                        expected: count,
                        got: args.len(),
                    });
                }
                let mut slots = args.iter();
                Ok(($(
                    <$t as FromDyn>::from_dyn(next_slot(&mut slots, count, args.len())?)?,
                )*))
            }
        }

        impl<$($t: FromDyn),*> OptionalArgs for ($(Option<$t>,)*) {
            const COUNT: usize = count_idents!($($t)*);

            #[allow(unused_mut, unused_variables)]
            fn from_args(args: &[DynValue]) -> BridgeResult<Self> {
                let count = <Self as OptionalArgs>::COUNT;
                if args.len() > count {
                    return Err(BridgeError::FrameMismatch {
                        expected: count,
                        got: args.len(),
                    });
                }
                let mut slots = args.iter();
                Ok(($(
                    match slots.next().and_then(DynValue::to_opt) {
                        Some(value) => Some(<$t as FromDyn>::from_dyn(value)?),
                        None => None,
                    },
                )*))
            }
        }
    };
}

impl_layers!();
impl_layers!(A);
impl_layers!(A, B);
impl_layers!(A, B, C);
impl_layers!(A, B, C, D);
impl_layers!(A, B, C, D, E);
impl_layers!(A, B, C, D, E, G);
impl_layers!(A, B, C, D, E, G, H);
impl_layers!(A, B, C, D, E, G, H, I);
impl_layers!(A, B, C, D, E, G, H, I, J);
impl_layers!(A, B, C, D, E, G, H, I, J, K);
impl_layers!(A, B, C, D, E, G, H, I, J, K, L);
impl_layers!(A, B, C, D, E, G, H, I, J, K, L, M);

/// A native function in three-layer curried form
///
/// `Req`, `Opt` and `Rest` are the parameter tuples of the three layers.
/// They are inferred from the function's type, so callers rarely name them.
pub trait Curried<Req, Opt, Rest> {
    /// `(required, optional, rest)` counted from the layer signatures
    const ARITY: Arity;

    type Output;

    fn call_curried(&self, required: Req, optional: Opt, rest: Rest) -> Self::Output;
}

impl<F, Mid, Last, Req, Opt, Rest> Curried<Req, Opt, Rest> for F
where
    F: Entry<Req, Output = Mid>,
    Mid: Layer<Opt, Output = Last>,
    Last: Layer<Rest>,
    Req: RequiredArgs,
    Opt: OptionalArgs,
    Rest: RestArgs,
{
    const ARITY: Arity = Arity::new(Req::COUNT, Opt::COUNT, Rest::PRESENT);

    type Output = <Last as Layer<Rest>>::Output;

    #[inline]
    fn call_curried(&self, required: Req, optional: Opt, rest: Rest) -> Self::Output {
        let mid = Entry::invoke(self, required);
        let last = Layer::invoke_once(mid, optional);
        Layer::invoke_once(last, rest)
    }
}

/// Arity of a curried function value
///
/// ```
/// use gsubr::{arity_of, Arity};
///
/// let add_ish = |a: i64, b: i64| move |c: Option<i64>| move || a + b + c.unwrap_or(0);
/// assert_eq!(arity_of(&add_ish), Arity::new(2, 1, false));
/// ```
pub fn arity_of<F, Req, Opt, Rest>(_function: &F) -> Arity
where
    F: Curried<Req, Opt, Rest>,
{
    <F as Curried<Req, Opt, Rest>>::ARITY
}

/// Build a curried native function from a flat parameter list
///
/// Groups are written `(required) (optional) (rest)`. Optional parameters
/// are bound as `Option<T>`; the rest parameter, if named, as a
/// [`DynValue`](crate::DynValue) list.
///
/// ```
/// use gsubr::{arity_of, curried, Arity};
///
/// let add_ish = curried!((a: i64, b: i64) (c: i64) () => a + b + c.unwrap_or(0));
/// assert_eq!(arity_of(&add_ish), Arity::new(2, 1, false));
///
/// let sum_all = curried!(() () (items) => items.list_len().unwrap_or(0));
/// assert_eq!(arity_of(&sum_all), Arity::new(0, 0, true));
/// ```
#[macro_export]
macro_rules! curried {
    (
        ($($req:ident : $rt:ty),* $(,)?)
        ($($opt:ident : $ot:ty),* $(,)?)
        ($($rest:ident)?)
        => $body:expr
    ) => {
        move |$($req: $rt),*| {
            move |$($opt: ::core::option::Option<$ot>),*| {
                move |$($rest: $crate::DynValue)?| $body
            }
        }
    };
}
