//! Dimension order and stride synthesis.
//!
//! A tensor's memory layout is described twice: once as a *dim order* (the
//! permutation of logical dimensions from outermost to innermost in memory),
//! and once as *strides* (the element step along each logical dimension).
//! For dense, non-overlapping tensors each one determines the other. This
//! module derives the missing half from whatever the caller supplied and
//! verifies that both halves agree.

use tensorptr_common::{Result, error::Error, result::try_reserve_exact, verify_arg};
use tensorptr_types::{DimOrderType, SizesType, StridesType};

/// Largest rank whose dimension indices all fit in `DimOrderType`.
pub const MAX_RANK: usize = DimOrderType::MAX as usize + 1;

/// Produces a complete, validated `(dim_order, strides)` pair for `sizes`.
///
/// An empty `dim_order` or `strides` means "not supplied":
/// - with neither supplied, the layout is contiguous (identity dim order);
/// - with only `strides` supplied, the dim order is recovered by sorting the
///   dimensions by descending stride. The sort is stable, so dimensions with
///   equal strides keep their logical order;
/// - with `dim_order` supplied, it must be a permutation of `0..rank`.
///
/// Strides are always re-derived from `sizes` and the dim order. Supplied
/// strides must match the derived ones exactly.
pub fn synthesize(
    sizes: &[SizesType],
    dim_order: Vec<DimOrderType>,
    strides: Vec<StridesType>,
) -> Result<(Vec<DimOrderType>, Vec<StridesType>)> {
    let rank = sizes.len();
    if !dim_order.is_empty() && dim_order.len() != rank {
        return Err(Error::dim_order_length_mismatch(rank, dim_order.len()));
    }
    if !strides.is_empty() && strides.len() != rank {
        return Err(Error::strides_length_mismatch(rank, strides.len()));
    }

    let dim_order = if !dim_order.is_empty() {
        dim_order
    } else if !strides.is_empty() {
        strides_to_dim_order(&strides)?
    } else {
        identity_dim_order(rank)?
    };

    let derived = dim_order_to_strides(sizes, &dim_order)?;
    if strides.is_empty() {
        log::trace!("synthesized layout: sizes {sizes:?}, dim_order {dim_order:?}, strides {derived:?}");
        Ok((dim_order, derived))
    } else if derived == strides {
        Ok((dim_order, strides))
    } else {
        Err(Error::inconsistent_strides(&strides, &derived))
    }
}

/// Computes the dense strides for `sizes` laid out in `dim_order`.
///
/// The innermost dimension (the last entry of `dim_order`) gets stride 1, and
/// every other dimension gets the stride of the next inner dimension times
/// that dimension's size. Zero-sized dimensions are not special-cased.
pub fn dim_order_to_strides(
    sizes: &[SizesType],
    dim_order: &[DimOrderType],
) -> Result<Vec<StridesType>> {
    let rank = sizes.len();
    if dim_order.len() != rank {
        return Err(Error::dim_order_length_mismatch(rank, dim_order.len()));
    }
    verify_sizes(sizes)?;
    if !is_valid_dim_order(dim_order) {
        return Err(Error::invalid_dim_order(dim_order));
    }

    let mut strides = Vec::new();
    try_reserve_exact(&mut strides, rank, "strides")?;
    strides.resize(rank, 0);

    let mut stride: StridesType = 1;
    for (pos, &dim) in dim_order.iter().enumerate().rev() {
        let dim = dim as usize;
        strides[dim] = stride;
        if pos > 0 {
            stride = stride.checked_mul(sizes[dim]).ok_or_else(|| {
                Error::invalid_arg("sizes", format!("stride overflows for sizes {sizes:?}"))
            })?;
        }
    }
    Ok(strides)
}

/// Recovers the dim order implied by `strides`: dimensions sorted by
/// descending stride, ties broken by the original dimension index.
pub fn strides_to_dim_order(strides: &[StridesType]) -> Result<Vec<DimOrderType>> {
    let mut dim_order = identity_dim_order(strides.len())?;
    dim_order.sort_by(|&a, &b| strides[b as usize].cmp(&strides[a as usize]));
    Ok(dim_order)
}

/// Returns `true` if `dim_order` is a permutation of `0..dim_order.len()`.
pub fn is_valid_dim_order(dim_order: &[DimOrderType]) -> bool {
    if dim_order.len() > MAX_RANK {
        return false;
    }
    let mut seen = [false; MAX_RANK];
    dim_order.iter().all(|&dim| {
        let dim = dim as usize;
        dim < dim_order.len() && !std::mem::replace(&mut seen[dim], true)
    })
}

/// Returns `true` for the identity order, i.e. a row-major contiguous layout.
pub fn is_contiguous_dim_order(dim_order: &[DimOrderType]) -> bool {
    dim_order
        .iter()
        .enumerate()
        .all(|(i, &dim)| dim as usize == i)
}

/// Returns `true` for the channels-last order of a 4-D (`[0, 2, 3, 1]`) or
/// 5-D (`[0, 2, 3, 4, 1]`) tensor.
pub fn is_channels_last_dim_order(dim_order: &[DimOrderType]) -> bool {
    let rank = dim_order.len();
    if rank != 4 && rank != 5 {
        return false;
    }
    dim_order[0] == 0
        && dim_order[rank - 1] == 1
        && dim_order[1..rank - 1]
            .iter()
            .enumerate()
            .all(|(i, &dim)| dim as usize == i + 2)
}

fn identity_dim_order(rank: usize) -> Result<Vec<DimOrderType>> {
    verify_arg!(rank, rank <= MAX_RANK);
    let mut dim_order = Vec::new();
    try_reserve_exact(&mut dim_order, rank, "dim_order")?;
    dim_order.extend((0..rank).map(|dim| dim as DimOrderType));
    Ok(dim_order)
}

fn verify_sizes(sizes: &[SizesType]) -> Result<()> {
    verify_arg!(sizes, sizes.len() <= MAX_RANK);
    match sizes.iter().position(|&size| size < 0) {
        Some(dim) => Err(Error::invalid_arg(
            "sizes",
            format!("size {} of dimension {dim} is negative", sizes[dim]),
        )),
        None => Ok(()),
    }
}
