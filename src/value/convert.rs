//! Scalar conversions between native types and dynamic values
//!
//! Implementing [`ToDyn`] / [`FromDyn`] for a type lets it appear as a
//! parameter or result of a wrapped native function.

use super::{Complex, Datum, DynValue};
use crate::error::{BridgeError, BridgeResult};
use std::sync::Arc;

/// Conversion of a native value into a runtime value
pub trait ToDyn {
    fn to_dyn(self) -> DynValue;
}

/// Coercion of a runtime value into a native value
pub trait FromDyn: Sized {
    fn from_dyn(value: &DynValue) -> BridgeResult<Self>;
}

impl ToDyn for DynValue {
    #[inline]
    fn to_dyn(self) -> DynValue {
        self
    }
}

impl ToDyn for &DynValue {
    #[inline]
    fn to_dyn(self) -> DynValue {
        self.clone()
    }
}

impl FromDyn for DynValue {
    #[inline]
    fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
        Ok(value.clone())
    }
}

/// No value: converts to the unspecified marker
impl ToDyn for () {
    #[inline]
    fn to_dyn(self) -> DynValue {
        DynValue::unspecified()
    }
}

macro_rules! impl_int_conversions {
    ($($t:ty),*) => {
        $(
            impl ToDyn for $t {
                #[inline]
                fn to_dyn(self) -> DynValue {
                    DynValue::from_datum(Datum::Int(self as i128))
                }
            }

            impl FromDyn for $t {
                fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
                    match &value.0 {
                        Datum::Int(i) => num_traits::cast::<i128, $t>(*i).ok_or_else(|| {
                            BridgeError::OutOfRange {
                                target: stringify!($t),
                                value: i.to_string(),
                            }
                        }),
                        _ => Err(BridgeError::wrong_type("exact integer", value.kind())),
                    }
                }
            }

            impl From<$t> for DynValue {
                #[inline]
                fn from(value: $t) -> Self {
                    value.to_dyn()
                }
            }
        )*
    };
}

impl_int_conversions!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float_conversions {
    ($($t:ty),*) => {
        $(
            impl ToDyn for $t {
                #[inline]
                fn to_dyn(self) -> DynValue {
                    DynValue::from_datum(Datum::Real(self as f64))
                }
            }

            impl FromDyn for $t {
                fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
                    match &value.0 {
                        Datum::Real(r) => narrow_real(*r, !r.is_finite(), stringify!($t)),
                        Datum::Int(i) => narrow_real(*i, false, stringify!($t)),
                        _ => Err(BridgeError::wrong_type("real number", value.kind())),
                    }
                }
            }

            impl From<$t> for DynValue {
                #[inline]
                fn from(value: $t) -> Self {
                    value.to_dyn()
                }
            }
        )*
    };
}

impl_float_conversions!(f32, f64);

/// Finite values that do not fit the target float are out of range
fn narrow_real<S, T>(value: S, non_finite: bool, target: &'static str) -> BridgeResult<T>
where
    S: num_traits::NumCast + ToString + Copy,
    T: num_traits::Float,
{
    match num_traits::cast::<S, T>(value) {
        Some(narrowed) if narrowed.is_finite() || non_finite => Ok(narrowed),
        _ => Err(BridgeError::OutOfRange {
            target,
            value: value.to_string(),
        }),
    }
}

impl ToDyn for bool {
    #[inline]
    fn to_dyn(self) -> DynValue {
        DynValue::boolean(self)
    }
}

impl FromDyn for bool {
    fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
        match &value.0 {
            Datum::Bool(b) => Ok(*b),
            _ => Err(BridgeError::wrong_type("boolean", value.kind())),
        }
    }
}

impl From<bool> for DynValue {
    #[inline]
    fn from(value: bool) -> Self {
        DynValue::boolean(value)
    }
}

impl ToDyn for char {
    #[inline]
    fn to_dyn(self) -> DynValue {
        DynValue::from_datum(Datum::Char(self))
    }
}

impl FromDyn for char {
    fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
        match &value.0 {
            Datum::Char(c) => Ok(*c),
            _ => Err(BridgeError::wrong_type("character", value.kind())),
        }
    }
}

impl From<char> for DynValue {
    #[inline]
    fn from(value: char) -> Self {
        value.to_dyn()
    }
}

impl ToDyn for Complex {
    #[inline]
    fn to_dyn(self) -> DynValue {
        DynValue::from_datum(Datum::Complex(self))
    }
}

impl FromDyn for Complex {
    fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
        Ok(Complex::new(value.real_part()?, value.imag_part()?))
    }
}

impl From<Complex> for DynValue {
    #[inline]
    fn from(value: Complex) -> Self {
        value.to_dyn()
    }
}

impl ToDyn for &str {
    #[inline]
    fn to_dyn(self) -> DynValue {
        DynValue::string(self)
    }
}

impl ToDyn for String {
    fn to_dyn(self) -> DynValue {
        DynValue::from_datum(Datum::Str(Arc::from(self)))
    }
}

impl FromDyn for String {
    fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
        match &value.0 {
            Datum::Str(s) => Ok(s.to_string()),
            _ => Err(BridgeError::wrong_type("string", value.kind())),
        }
    }
}

impl From<&str> for DynValue {
    #[inline]
    fn from(value: &str) -> Self {
        DynValue::string(value)
    }
}

impl From<String> for DynValue {
    #[inline]
    fn from(value: String) -> Self {
        value.to_dyn()
    }
}

/// Vectors convert to proper lists
impl<T: ToDyn> ToDyn for Vec<T> {
    fn to_dyn(self) -> DynValue {
        DynValue::list(self.into_iter().map(ToDyn::to_dyn))
    }
}

impl<T: FromDyn> FromDyn for Vec<T> {
    fn from_dyn(value: &DynValue) -> BridgeResult<Self> {
        value.iter_list()?.map(T::from_dyn).collect()
    }
}
