//! Lists - pairs chained through their `cdr`, terminated by the empty list

use super::{Datum, DynValue, Pair};
use crate::error::{BridgeError, BridgeResult};
use std::fmt;
use std::sync::Arc;

impl DynValue {
    /// The empty list
    #[inline]
    pub const fn nil() -> Self {
        Self(Datum::Nil)
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self.0, Datum::Nil)
    }

    #[inline]
    pub fn is_pair(&self) -> bool {
        matches!(self.0, Datum::Pair(_))
    }

    pub fn cons(car: DynValue, cdr: DynValue) -> Self {
        Self(Datum::Pair(Arc::new(Pair { car, cdr })))
    }

    pub fn car(&self) -> Option<&DynValue> {
        match &self.0 {
            Datum::Pair(pair) => Some(&pair.car),
            _ => None,
        }
    }

    pub fn cdr(&self) -> Option<&DynValue> {
        match &self.0 {
            Datum::Pair(pair) => Some(&pair.cdr),
            _ => None,
        }
    }

    /// Build a proper list from any sequence of values
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = DynValue>,
    {
        let items: Vec<DynValue> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(DynValue::nil(), |tail, item| DynValue::cons(item, tail))
    }

    /// True for the empty list and pair chains ending in it
    pub fn is_list(&self) -> bool {
        let mut cursor = self;
        loop {
            match &cursor.0 {
                Datum::Nil => return true,
                Datum::Pair(pair) => cursor = &pair.cdr,
                _ => return false,
            }
        }
    }

    /// Iterate the elements of a proper list
    pub fn iter_list(&self) -> BridgeResult<ListIter<'_>> {
        if !self.is_list() {
            return Err(BridgeError::NotAList { found: self.kind() });
        }
        Ok(ListIter { cursor: self })
    }

    pub fn list_len(&self) -> BridgeResult<usize> {
        Ok(self.iter_list()?.count())
    }

    pub fn to_vec(&self) -> BridgeResult<Vec<DynValue>> {
        Ok(self.iter_list()?.cloned().collect())
    }
}

impl Drop for Pair {
    /// Unlink the `cdr` chain iteratively so long lists drop in constant stack
    fn drop(&mut self) {
        let mut tail = std::mem::replace(&mut self.cdr, DynValue::nil());
        while let Datum::Pair(pair) = tail.0 {
            match Arc::try_unwrap(pair) {
                Ok(mut next) => tail = std::mem::replace(&mut next.cdr, DynValue::nil()),
                // still shared, the other owner drops the rest
                Err(_) => break,
            }
        }
    }
}

impl FromIterator<DynValue> for DynValue {
    fn from_iter<I: IntoIterator<Item = DynValue>>(iter: I) -> Self {
        DynValue::list(iter)
    }
}

/// Borrowing iterator over list elements
pub struct ListIter<'a> {
    cursor: &'a DynValue,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a DynValue;

    fn next(&mut self) -> Option<&'a DynValue> {
        match &self.cursor.0 {
            Datum::Pair(pair) => {
                self.cursor = &pair.cdr;
                Some(&pair.car)
            }
            _ => None,
        }
    }
}

pub(super) fn write_list(value: &DynValue, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("(")?;
    let mut cursor = value;
    let mut first = true;
    loop {
        match &cursor.0 {
            Datum::Pair(pair) => {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{}", pair.car)?;
                first = false;
                cursor = &pair.cdr;
            }
            Datum::Nil => break,
            _ => {
                write!(f, " . {}", cursor)?;
                break;
            }
        }
    }
    f.write_str(")")
}

/// Build a runtime list from native values
///
/// ```
/// use gsubr::{list, DynValue};
///
/// let point = list![1.5, 2.5];
/// assert_eq!(point.list_len().unwrap(), 2);
/// assert_eq!(list![], DynValue::nil());
/// ```
#[macro_export]
macro_rules! list {
    () => {
        $crate::DynValue::nil()
    };
    ($($item:expr),+ $(,)?) => {
        $crate::DynValue::list([$($crate::ToDyn::to_dyn($item)),+])
    };
}
