//! Arity triples and argument partitioning
//!
//! Design: one pure function, [`Arity::partition`], computes the three
//! half-open ranges (required, optional, rest) for a given argument count.
//! Both adapters and the runtime's dispatch split arguments through it, so
//! their group boundaries cannot drift apart.

use std::fmt;
use std::ops::Range;

/// Parameter-list shape of a callable: `(required, optional, rest)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    pub required: usize,
    pub optional: usize,
    pub rest: bool,
}

impl Arity {
    /// Takes no arguments at all
    pub const NULLARY: Arity = Arity::new(0, 0, false);

    #[inline]
    pub const fn new(required: usize, optional: usize, rest: bool) -> Self {
        Self {
            required,
            optional,
            rest,
        }
    }

    /// 1 if the callable collects a rest list, else 0
    #[inline]
    pub const fn rest_count(self) -> usize {
        self.rest as usize
    }

    /// Width of the flat entry point: `required + optional + rest`
    #[inline]
    pub const fn flat_len(self) -> usize {
        self.required + self.optional + self.rest_count()
    }

    #[inline]
    pub const fn min_args(self) -> usize {
        self.required
    }

    /// `None` when a rest list makes the count unbounded
    #[inline]
    pub const fn max_args(self) -> Option<usize> {
        if self.rest {
            None
        } else {
            Some(self.required + self.optional)
        }
    }

    /// Whether a call supplying `supplied` arguments is well-formed
    #[inline]
    pub const fn accepts(self, supplied: usize) -> bool {
        supplied >= self.required && (self.rest || supplied <= self.required + self.optional)
    }

    /// Split `supplied` positional arguments into their groups
    ///
    /// Returns `None` when the count is not accepted by this arity.
    pub fn partition(self, supplied: usize) -> Option<Partition> {
        if !self.accepts(supplied) {
            return None;
        }

        let optional_start = self.required;
        let optional_end = supplied.min(self.required + self.optional);

        Some(Partition {
            required: 0..optional_start,
            optional: optional_start..optional_end,
            rest: optional_end..supplied,
            declared_optional: self.optional,
        })
    }

    /// Human-readable accepted counts, e.g. `2`, `2 to 3`, `at least 2`
    pub fn describe_counts(self) -> String {
        match self.max_args() {
            None => format!("at least {}", self.required),
            Some(max) if max == self.required => format!("{}", max),
            Some(max) => format!("{} to {}", self.required, max),
        }
    }
}

impl Default for Arity {
    fn default() -> Self {
        Self::NULLARY
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.required, self.optional, self.rest_count())
    }
}

/// Contiguous argument groups produced by [`Arity::partition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub required: Range<usize>,
    pub optional: Range<usize>,
    pub rest: Range<usize>,
    declared_optional: usize,
}

impl Partition {
    /// Optional parameters the caller left out
    #[inline]
    pub fn missing_optional(&self) -> usize {
        self.declared_optional - self.optional.len()
    }

    /// Total arguments covered by the partition
    #[inline]
    pub fn len(&self) -> usize {
        self.rest.end
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the three groups out of `args`
    pub fn split<'a, T>(&self, args: &'a [T]) -> (&'a [T], &'a [T], &'a [T]) {
        (
            &args[self.required.clone()],
            &args[self.optional.clone()],
            &args[self.rest.clone()],
        )
    }
}
