//! The non-owning tensor metadata struct.

use std::ffi::c_void;
use std::fmt;
use std::sync::atomic::{AtomicPtr, Ordering};

use tensorptr_common::Result;
use tensorptr_types::{
    DimOrderType, ScalarType, SizesType, StridesType, TensorShapeDynamism, compute_numel,
};

use crate::dim_order::is_contiguous_dim_order;

/// Metadata of a tensor: element type, shape, layout and data pointer.
///
/// A `TensorImpl` does not own any of the memory it points to: neither the
/// sizes, dim order and strides arrays, nor the data buffer. Whoever creates
/// it must keep all of them alive, and the arrays unchanged, for as long as
/// the `TensorImpl` is in use. [`make_tensor_impl_ptr`](crate::make_tensor_impl_ptr)
/// does this bookkeeping and is the usual way to obtain one.
///
/// The data pointer is stored atomically, so it can be replaced through a
/// shared reference with [`set_data`](Self::set_data). The `TensorImpl` never
/// reads or writes through the data pointer itself.
pub struct TensorImpl {
    scalar_type: ScalarType,
    dim: usize,
    numel: usize,
    sizes: *const SizesType,
    dim_order: *const DimOrderType,
    strides: *const StridesType,
    data: AtomicPtr<c_void>,
    shape_dynamism: TensorShapeDynamism,
}

impl TensorImpl {
    /// Creates a new `TensorImpl` over the given arrays and data.
    ///
    /// # Safety
    ///
    /// `sizes`, `dim_order` and `strides` must each point to `dim` initialized
    /// elements that stay valid and unmodified for the entire lifetime of the
    /// returned value. `dim_order` must be a permutation of `0..dim`.
    ///
    /// # Errors
    ///
    /// Fails if a size is negative or the element count overflows `usize`.
    pub unsafe fn new(
        scalar_type: ScalarType,
        dim: usize,
        sizes: *const SizesType,
        data: *mut c_void,
        dim_order: *const DimOrderType,
        strides: *const StridesType,
        shape_dynamism: TensorShapeDynamism,
    ) -> Result<TensorImpl> {
        debug_assert!(!sizes.is_null());
        debug_assert!(!dim_order.is_null());
        debug_assert!(!strides.is_null());
        let numel = compute_numel(unsafe { std::slice::from_raw_parts(sizes, dim) })?;
        Ok(TensorImpl {
            scalar_type,
            dim,
            numel,
            sizes,
            dim_order,
            strides,
            data: AtomicPtr::new(data),
            shape_dynamism,
        })
    }

    #[inline]
    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    /// Returns the size in bytes of one element.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.scalar_type.element_size()
    }

    /// Returns the number of dimensions (the rank).
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.numel
    }

    /// Returns the number of bytes a dense copy of the elements occupies.
    #[inline]
    pub fn nbytes(&self) -> usize {
        self.numel * self.element_size()
    }

    #[inline]
    pub fn sizes(&self) -> &[SizesType] {
        // SAFETY: guaranteed by the contract of `TensorImpl::new`.
        unsafe { std::slice::from_raw_parts(self.sizes, self.dim) }
    }

    /// Returns the size of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is out of range.
    #[inline]
    pub fn size(&self, dim: usize) -> SizesType {
        self.sizes()[dim]
    }

    #[inline]
    pub fn dim_order(&self) -> &[DimOrderType] {
        // SAFETY: guaranteed by the contract of `TensorImpl::new`.
        unsafe { std::slice::from_raw_parts(self.dim_order, self.dim) }
    }

    #[inline]
    pub fn strides(&self) -> &[StridesType] {
        // SAFETY: guaranteed by the contract of `TensorImpl::new`.
        unsafe { std::slice::from_raw_parts(self.strides, self.dim) }
    }

    #[inline]
    pub fn shape_dynamism(&self) -> TensorShapeDynamism {
        self.shape_dynamism
    }

    /// Returns `true` if the layout is row-major contiguous.
    pub fn is_contiguous(&self) -> bool {
        is_contiguous_dim_order(self.dim_order())
    }

    #[inline]
    pub fn data(&self) -> *const c_void {
        self.mutable_data().cast_const()
    }

    #[inline]
    pub fn mutable_data(&self) -> *mut c_void {
        self.data.load(Ordering::Acquire)
    }

    /// Replaces the data pointer.
    ///
    /// The new buffer must be large enough for the tensor's shape and type. If
    /// this `TensorImpl` came from a factory with a cleanup action, that action
    /// later receives whatever pointer is stored at teardown.
    pub fn set_data(&self, data: *mut c_void) {
        self.data.store(data, Ordering::Release);
    }
}

impl fmt::Debug for TensorImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensorImpl")
            .field("scalar_type", &self.scalar_type)
            .field("sizes", &self.sizes())
            .field("dim_order", &self.dim_order())
            .field("strides", &self.strides())
            .field("data", &self.data())
            .field("shape_dynamism", &self.shape_dynamism)
            .finish()
    }
}

// SAFETY: the metadata arrays are immutable for the lifetime of the
// `TensorImpl` (see `TensorImpl::new`), and the data pointer is only ever
// loaded and stored atomically, never dereferenced.
unsafe impl Send for TensorImpl {}
unsafe impl Sync for TensorImpl {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_impl_accessors() {
        let sizes: [SizesType; 2] = [2, 3];
        let dim_order: [DimOrderType; 2] = [1, 0];
        let strides: [StridesType; 2] = [1, 2];
        let mut data = [0f32; 6];

        let tensor = unsafe {
            TensorImpl::new(
                ScalarType::Float,
                2,
                sizes.as_ptr(),
                data.as_mut_ptr().cast(),
                dim_order.as_ptr(),
                strides.as_ptr(),
                TensorShapeDynamism::DynamicBound,
            )
        }
        .unwrap();

        assert_eq!(tensor.scalar_type(), ScalarType::Float);
        assert_eq!(tensor.dim(), 2);
        assert_eq!(tensor.sizes(), &[2, 3]);
        assert_eq!(tensor.size(1), 3);
        assert_eq!(tensor.dim_order(), &[1, 0]);
        assert_eq!(tensor.strides(), &[1, 2]);
        assert_eq!(tensor.numel(), 6);
        assert_eq!(tensor.nbytes(), 24);
        assert!(!tensor.is_contiguous());
        assert_eq!(tensor.shape_dynamism(), TensorShapeDynamism::DynamicBound);
        assert_eq!(tensor.data(), data.as_ptr().cast::<c_void>());
    }

    #[test]
    fn test_set_data() {
        let sizes: [SizesType; 1] = [4];
        let dim_order: [DimOrderType; 1] = [0];
        let strides: [StridesType; 1] = [1];
        let mut first = [0u8; 4];
        let mut second = [0u8; 4];

        let tensor = unsafe {
            TensorImpl::new(
                ScalarType::Byte,
                1,
                sizes.as_ptr(),
                first.as_mut_ptr().cast(),
                dim_order.as_ptr(),
                strides.as_ptr(),
                TensorShapeDynamism::Static,
            )
        }
        .unwrap();
        assert!(tensor.is_contiguous());

        tensor.set_data(second.as_mut_ptr().cast());
        assert_eq!(tensor.mutable_data(), second.as_mut_ptr().cast::<c_void>());
        assert_ne!(tensor.data(), first.as_ptr().cast::<c_void>());
    }

    #[test]
    fn test_negative_size_rejected() {
        let sizes: [SizesType; 1] = [-1];
        let dim_order: [DimOrderType; 1] = [0];
        let strides: [StridesType; 1] = [1];
        let result = unsafe {
            TensorImpl::new(
                ScalarType::Byte,
                1,
                sizes.as_ptr(),
                std::ptr::null_mut(),
                dim_order.as_ptr(),
                strides.as_ptr(),
                TensorShapeDynamism::Static,
            )
        };
        assert!(result.is_err());
    }
}
