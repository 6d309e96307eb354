//! Numeric tower - polymorphic arithmetic over dynamic values
//!
//! Design: fast path for exact integers, then promotion
//! integer → real → complex for mixed operands. Exact integer arithmetic is
//! checked; overflow is reported instead of wrapping.

use super::{Datum, DynValue, ValueKind};
use crate::error::{BridgeError, BridgeResult};
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Sub};

/// Rectangular complex number
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Complex;

    fn div(self, rhs: Complex) -> Complex {
        let denom = rhs.re * rhs.re + rhs.im * rhs.im;
        Complex::new(
            (self.re * rhs.re + self.im * rhs.im) / denom,
            (self.im * rhs.re - self.re * rhs.im) / denom,
        )
    }
}

/// Operands promoted to a common representation
enum Promoted {
    Int(i128, i128),
    Real(f64, f64),
    Complex(Complex, Complex),
}

#[derive(Clone, Copy)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

fn as_complex(datum: &Datum) -> Option<Complex> {
    match datum {
        Datum::Int(i) => Some(Complex::new(*i as f64, 0.0)),
        Datum::Real(r) => Some(Complex::new(*r, 0.0)),
        Datum::Complex(c) => Some(*c),
        _ => None,
    }
}

fn promote(a: &DynValue, b: &DynValue) -> BridgeResult<Promoted> {
    for operand in [a, b] {
        if !operand.kind().is_number() {
            return Err(BridgeError::wrong_type("number", operand.kind()));
        }
    }

    Ok(match (&a.0, &b.0) {
        (Datum::Int(x), Datum::Int(y)) => Promoted::Int(*x, *y),
        (Datum::Int(x), Datum::Real(y)) => Promoted::Real(*x as f64, *y),
        (Datum::Real(x), Datum::Int(y)) => Promoted::Real(*x, *y as f64),
        (Datum::Real(x), Datum::Real(y)) => Promoted::Real(*x, *y),
        (x, y) => match (as_complex(x), as_complex(y)) {
            (Some(x), Some(y)) => Promoted::Complex(x, y),
            // both operands were checked to be numbers above
            _ => return Err(BridgeError::wrong_type("number", a.kind())),
        },
    })
}

fn arith(op: ArithOp, a: &DynValue, b: &DynValue) -> BridgeResult<DynValue> {
    // Fast path: both exact integers
    if let (Datum::Int(x), Datum::Int(y)) = (&a.0, &b.0) {
        return int_arith(op, *x, *y);
    }

    Ok(match promote(a, b)? {
        Promoted::Int(x, y) => return int_arith(op, x, y),
        Promoted::Real(x, y) => DynValue::from_datum(Datum::Real(match op {
            ArithOp::Add => x + y,
            ArithOp::Sub => x - y,
            ArithOp::Mul => x * y,
            ArithOp::Div => x / y,
        })),
        Promoted::Complex(x, y) => DynValue::from_datum(Datum::Complex(match op {
            ArithOp::Add => x + y,
            ArithOp::Sub => x - y,
            ArithOp::Mul => x * y,
            ArithOp::Div => x / y,
        })),
    })
}

fn int_arith(op: ArithOp, x: i128, y: i128) -> BridgeResult<DynValue> {
    let overflow = || BridgeError::NumericOverflow { op: op.symbol() };

    let result = match op {
        ArithOp::Add => x.checked_add(y).ok_or_else(overflow)?,
        ArithOp::Sub => x.checked_sub(y).ok_or_else(overflow)?,
        ArithOp::Mul => x.checked_mul(y).ok_or_else(overflow)?,
        ArithOp::Div => {
            if y == 0 {
                return Err(BridgeError::DivisionByZero);
            }
            // Inexact quotient when the division does not come out even
            if x.checked_rem(y).ok_or_else(overflow)? != 0 {
                return Ok(DynValue::from_datum(Datum::Real(x as f64 / y as f64)));
            }
            x.checked_div(y).ok_or_else(overflow)?
        }
    };

    Ok(DynValue::from_datum(Datum::Int(result)))
}

fn bitwise(a: &DynValue, b: &DynValue, f: fn(i128, i128) -> i128) -> BridgeResult<DynValue> {
    match (&a.0, &b.0) {
        (Datum::Int(x), Datum::Int(y)) => Ok(DynValue::from_datum(Datum::Int(f(*x, *y)))),
        (Datum::Int(_), _) => Err(BridgeError::wrong_type("exact integer", b.kind())),
        _ => Err(BridgeError::wrong_type("exact integer", a.kind())),
    }
}

impl DynValue {
    /// Absolute value of a real number
    pub fn abs(&self) -> BridgeResult<DynValue> {
        match &self.0 {
            Datum::Int(i) => i
                .checked_abs()
                .map(|i| DynValue::from_datum(Datum::Int(i)))
                .ok_or(BridgeError::NumericOverflow { op: "abs" }),
            Datum::Real(r) => Ok(DynValue::from_datum(Datum::Real(r.abs()))),
            _ => Err(BridgeError::wrong_type("real number", self.kind())),
        }
    }

    pub fn floor(&self) -> BridgeResult<DynValue> {
        self.round_with(f64::floor)
    }

    pub fn ceil(&self) -> BridgeResult<DynValue> {
        self.round_with(f64::ceil)
    }

    fn round_with(&self, f: fn(f64) -> f64) -> BridgeResult<DynValue> {
        match &self.0 {
            Datum::Int(_) => Ok(self.clone()),
            Datum::Real(r) => Ok(DynValue::from_datum(Datum::Real(f(*r)))),
            _ => Err(BridgeError::wrong_type("real number", self.kind())),
        }
    }

    /// True for exact integers and reals
    pub fn is_real(&self) -> bool {
        matches!(self.kind(), ValueKind::Integer | ValueKind::Real)
    }

    /// Real part of any number
    pub fn real_part(&self) -> BridgeResult<f64> {
        as_complex(&self.0)
            .map(|c| c.re)
            .ok_or_else(|| BridgeError::wrong_type("number", self.kind()))
    }

    /// Imaginary part of any number (0 for reals)
    pub fn imag_part(&self) -> BridgeResult<f64> {
        as_complex(&self.0)
            .map(|c| c.im)
            .ok_or_else(|| BridgeError::wrong_type("number", self.kind()))
    }
}

macro_rules! impl_arith_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait for DynValue {
            type Output = BridgeResult<DynValue>;

            #[inline]
            fn $method(self, rhs: DynValue) -> BridgeResult<DynValue> {
                arith($op, &self, &rhs)
            }
        }

        impl<'a> $trait<&'a DynValue> for &'a DynValue {
            type Output = BridgeResult<DynValue>;

            #[inline]
            fn $method(self, rhs: &'a DynValue) -> BridgeResult<DynValue> {
                arith($op, self, rhs)
            }
        }
    };
}

impl_arith_op!(Add, add, ArithOp::Add);
impl_arith_op!(Sub, sub, ArithOp::Sub);
impl_arith_op!(Mul, mul, ArithOp::Mul);
impl_arith_op!(Div, div, ArithOp::Div);

macro_rules! impl_bit_op {
    ($trait:ident, $method:ident, $f:expr) => {
        impl $trait for DynValue {
            type Output = BridgeResult<DynValue>;

            #[inline]
            fn $method(self, rhs: DynValue) -> BridgeResult<DynValue> {
                bitwise(&self, &rhs, $f)
            }
        }

        impl<'a> $trait<&'a DynValue> for &'a DynValue {
            type Output = BridgeResult<DynValue>;

            #[inline]
            fn $method(self, rhs: &'a DynValue) -> BridgeResult<DynValue> {
                bitwise(self, rhs, $f)
            }
        }
    };
}

impl_bit_op!(BitAnd, bitand, |x, y| x & y);
impl_bit_op!(BitOr, bitor, |x, y| x | y);
impl_bit_op!(BitXor, bitxor, |x, y| x ^ y);
