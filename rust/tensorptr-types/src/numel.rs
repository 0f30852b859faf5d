use tensorptr_common::{Result, error::Error};

use crate::{ScalarType, SizesType};

/// Computes the number of elements described by `sizes`.
///
/// An empty `sizes` (a rank-0 tensor) describes exactly one element. Negative
/// sizes and products that do not fit in `usize` are rejected.
pub fn compute_numel(sizes: &[SizesType]) -> Result<usize> {
    sizes.iter().enumerate().try_fold(1usize, |acc, (dim, &size)| {
        let size = usize::try_from(size).map_err(|_| {
            Error::invalid_arg("sizes", format!("size {size} of dimension {dim} is negative"))
        })?;
        acc.checked_mul(size)
            .ok_or_else(|| Error::invalid_arg("sizes", "element count overflows usize"))
    })
}

/// Computes the number of bytes needed to hold a dense tensor of the given
/// `sizes` and element type.
pub fn compute_nbytes(sizes: &[SizesType], scalar_type: ScalarType) -> Result<usize> {
    compute_numel(sizes)?
        .checked_mul(scalar_type.element_size())
        .ok_or_else(|| Error::invalid_arg("sizes", "byte size overflows usize"))
}
