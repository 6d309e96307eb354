//! Dynamic values - handles to runtime-owned data
//!
//! Design: a cheap-to-clone handle over a small tagged representation:
//! - Immediates (booleans, characters, numbers, markers) stored inline
//! - Strings, symbols, pairs and procedures behind `Arc`
//! - Two distinct markers: `undefined` (an optional argument that was not
//!   supplied) and `unspecified` (the result of a procedure with no value)
//!
//! Native code never owns the underlying storage; cloning a handle only
//! bumps a reference count.

mod convert;
mod list;
mod number;

pub use convert::{FromDyn, ToDyn};
pub use list::ListIter;
pub use number::Complex;

use crate::runtime::Procedure;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Handle to one runtime value
#[derive(Clone)]
pub struct DynValue(Datum);

#[derive(Clone)]
enum Datum {
    Undefined,
    Unspecified,
    Nil,
    Bool(bool),
    Char(char),
    Int(i128),
    Real(f64),
    Complex(Complex),
    Str(Arc<str>),
    Symbol(Arc<str>),
    Pair(Arc<Pair>),
    Procedure(Arc<Procedure>),
}

struct Pair {
    car: DynValue,
    cdr: DynValue,
}

/// Value categories, used for dispatch and error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Undefined,
    Unspecified,
    Nil,
    Bool,
    Char,
    Integer,
    Real,
    Complex,
    String,
    Symbol,
    Pair,
    Procedure,
}

impl ValueKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Unspecified => "unspecified",
            Self::Nil => "empty list",
            Self::Bool => "boolean",
            Self::Char => "character",
            Self::Integer => "exact integer",
            Self::Real => "real",
            Self::Complex => "complex",
            Self::String => "string",
            Self::Symbol => "symbol",
            Self::Pair => "pair",
            Self::Procedure => "procedure",
        }
    }

    #[inline]
    pub const fn is_number(self) -> bool {
        matches!(self, Self::Integer | Self::Real | Self::Complex)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DynValue {
    #[inline]
    fn from_datum(datum: Datum) -> Self {
        Self(datum)
    }

    /// Sentinel for an optional argument that was not supplied
    #[inline]
    pub const fn undefined() -> Self {
        Self(Datum::Undefined)
    }

    /// Result marker of a procedure that returns no value
    #[inline]
    pub const fn unspecified() -> Self {
        Self(Datum::Unspecified)
    }

    #[inline]
    pub const fn boolean(value: bool) -> Self {
        Self(Datum::Bool(value))
    }

    pub fn string(value: &str) -> Self {
        Self(Datum::Str(Arc::from(value)))
    }

    pub fn symbol(name: &str) -> Self {
        Self(Datum::Symbol(Arc::from(name)))
    }

    pub(crate) fn procedure(procedure: Arc<Procedure>) -> Self {
        Self(Datum::Procedure(procedure))
    }

    pub fn kind(&self) -> ValueKind {
        match &self.0 {
            Datum::Undefined => ValueKind::Undefined,
            Datum::Unspecified => ValueKind::Unspecified,
            Datum::Nil => ValueKind::Nil,
            Datum::Bool(_) => ValueKind::Bool,
            Datum::Char(_) => ValueKind::Char,
            Datum::Int(_) => ValueKind::Integer,
            Datum::Real(_) => ValueKind::Real,
            Datum::Complex(_) => ValueKind::Complex,
            Datum::Str(_) => ValueKind::String,
            Datum::Symbol(_) => ValueKind::Symbol,
            Datum::Pair(_) => ValueKind::Pair,
            Datum::Procedure(_) => ValueKind::Procedure,
        }
    }

    /// Presence test: false only for the absent-optional sentinel
    #[inline]
    pub fn is_present(&self) -> bool {
        !matches!(self.0, Datum::Undefined)
    }

    /// Presence-tagged view of this value
    #[inline]
    pub fn to_opt(&self) -> Option<&DynValue> {
        if self.is_present() {
            Some(self)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_unspecified(&self) -> bool {
        matches!(self.0, Datum::Unspecified)
    }

    /// Scheme truthiness: everything except `#f` is true
    #[inline]
    pub fn is_true(&self) -> bool {
        !matches!(self.0, Datum::Bool(false))
    }

    #[inline]
    pub fn is_procedure(&self) -> bool {
        matches!(self.0, Datum::Procedure(_))
    }

    pub fn as_procedure(&self) -> Option<&Arc<Procedure>> {
        match &self.0 {
            Datum::Procedure(procedure) => Some(procedure),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.0 {
            Datum::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.0 {
            Datum::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce to a native type
    #[inline]
    pub fn to<T: FromDyn>(&self) -> crate::BridgeResult<T> {
        T::from_dyn(self)
    }

    /// Hash bucket in `0..size`
    pub fn hash_value(&self, size: u64) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish() % size.max(1)
    }
}

impl Default for DynValue {
    fn default() -> Self {
        Self::unspecified()
    }
}

impl PartialEq for DynValue {
    /// Structural equality; exact and inexact numbers never compare equal
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            match (&left.0, &right.0) {
                (Datum::Pair(a), Datum::Pair(b)) => {
                    if Arc::ptr_eq(a, b) {
                        return true;
                    }
                    if a.car != b.car {
                        return false;
                    }
                    left = &a.cdr;
                    right = &b.cdr;
                }
                _ => return left.atom_eq(right),
            }
        }
    }
}

impl DynValue {
    fn atom_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Datum::Undefined, Datum::Undefined)
            | (Datum::Unspecified, Datum::Unspecified)
            | (Datum::Nil, Datum::Nil) => true,
            (Datum::Bool(a), Datum::Bool(b)) => a == b,
            (Datum::Char(a), Datum::Char(b)) => a == b,
            (Datum::Int(a), Datum::Int(b)) => a == b,
            (Datum::Real(a), Datum::Real(b)) => a == b,
            (Datum::Complex(a), Datum::Complex(b)) => a == b,
            (Datum::Str(a), Datum::Str(b)) => a == b,
            (Datum::Symbol(a), Datum::Symbol(b)) => a == b,
            (Datum::Procedure(a), Datum::Procedure(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Hash for DynValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut cursor = self;
        while let Datum::Pair(pair) = &cursor.0 {
            ValueKind::Pair.hash(state);
            pair.car.hash(state);
            cursor = &pair.cdr;
        }

        cursor.kind().hash(state);
        match &cursor.0 {
            Datum::Undefined | Datum::Unspecified | Datum::Nil | Datum::Pair(_) => {}
            Datum::Bool(b) => b.hash(state),
            Datum::Char(c) => c.hash(state),
            Datum::Int(i) => i.hash(state),
            Datum::Real(r) => normalize_zero(*r).to_bits().hash(state),
            Datum::Complex(c) => {
                normalize_zero(c.re).to_bits().hash(state);
                normalize_zero(c.im).to_bits().hash(state);
            }
            Datum::Str(s) | Datum::Symbol(s) => s.hash(state),
            Datum::Procedure(procedure) => (Arc::as_ptr(procedure) as usize).hash(state),
        }
    }
}

#[inline]
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

fn write_real(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        f.write_str("+nan.0")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "+inf.0" } else { "-inf.0" })
    } else {
        write!(f, "{:?}", value)
    }
}

impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Datum::Undefined => f.write_str("#<undefined>"),
            Datum::Unspecified => f.write_str("#<unspecified>"),
            Datum::Nil => f.write_str("()"),
            Datum::Bool(true) => f.write_str("#t"),
            Datum::Bool(false) => f.write_str("#f"),
            Datum::Char(' ') => f.write_str("#\\space"),
            Datum::Char('\n') => f.write_str("#\\newline"),
            Datum::Char(c) => write!(f, "#\\{}", c),
            Datum::Int(i) => write!(f, "{}", i),
            Datum::Real(r) => write_real(f, *r),
            Datum::Complex(c) => {
                write_real(f, c.re)?;
                if c.im.is_finite() && !c.im.is_sign_negative() {
                    f.write_str("+")?;
                }
                write_real(f, c.im)?;
                f.write_str("i")
            }
            Datum::Str(s) => write!(f, "{:?}", s),
            Datum::Symbol(s) => f.write_str(s),
            Datum::Pair(_) => list::write_list(self, f),
            Datum::Procedure(procedure) => write!(f, "{}", procedure),
        }
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynValue({})", self)
    }
}
