//! Conversion of native results into runtime values

use crate::error::{BridgeError, BridgeResult};
use crate::value::{DynValue, ToDyn};

/// Result of a wrapped native function
///
/// Plain values convert directly (`()` becomes the unspecified marker);
/// `Result<T, E>` propagates `E` unmodified.
pub trait IntoDynResult {
    fn into_dyn_result(self) -> BridgeResult<DynValue>;
}

impl<T: ToDyn> IntoDynResult for T {
    #[inline]
    fn into_dyn_result(self) -> BridgeResult<DynValue> {
        Ok(self.to_dyn())
    }
}

impl<T, E> IntoDynResult for Result<T, E>
where
    T: ToDyn,
    E: Into<BridgeError>,
{
    #[inline]
    fn into_dyn_result(self) -> BridgeResult<DynValue> {
        self.map(ToDyn::to_dyn).map_err(Into::into)
    }
}
