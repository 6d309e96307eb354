//! Registered procedures

use crate::arity::Arity;
use crate::marshal::Subr;
use std::fmt;
use std::sync::Arc;

/// A named entry point bound in a runtime's global namespace
pub struct Procedure {
    name: Arc<str>,
    subr: Subr,
}

impl Procedure {
    pub(crate) fn new(name: Arc<str>, subr: Subr) -> Self {
        Self { name, subr }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn arity(&self) -> Arity {
        self.subr.arity()
    }

    #[inline]
    pub fn subr(&self) -> &Subr {
        &self.subr
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<procedure {} {}>", self.name, self.arity())
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish()
    }
}
