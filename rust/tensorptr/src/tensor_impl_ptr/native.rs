use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicPtr, Ordering};

use tensorptr_common::{Result, error::Error};
use tensorptr_types::{
    DimOrderType, ScalarType, SizesType, StridesType, TensorShapeDynamism, compute_numel,
};

use super::{Deleter, DeleterSlot};
use crate::dim_order;

/// A shared handle to a [`NativeTensorImpl`].
pub type TensorImplPtr = Arc<NativeTensorImpl>;

/// A reference-counted data buffer with an optional cleanup action.
///
/// The cleanup action runs when the last reference to the storage is
/// dropped, whichever tensor held it.
pub struct Storage {
    data: AtomicPtr<c_void>,
    nbytes: usize,
    deleter: DeleterSlot,
}

impl Storage {
    /// Wraps externally owned memory of `nbytes` bytes.
    pub fn from_raw(data: *mut c_void, nbytes: usize, deleter: Option<Deleter>) -> Storage {
        Storage {
            data: AtomicPtr::new(data),
            nbytes,
            deleter: DeleterSlot::new(deleter),
        }
    }

    #[inline]
    pub fn data(&self) -> *mut c_void {
        self.data.load(Ordering::Acquire)
    }

    pub fn set_data(&self, data: *mut c_void) {
        self.data.store(data, Ordering::Release);
    }

    #[inline]
    pub fn nbytes(&self) -> usize {
        self.nbytes
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        log::trace!("releasing native storage of {} bytes", self.nbytes);
        let data = *self.data.get_mut();
        self.deleter.run(data);
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("data", &self.data())
            .field("nbytes", &self.nbytes)
            .finish()
    }
}

// SAFETY: the data pointer is accessed atomically and never dereferenced
// here; the deleter slot is `Send + Sync`.
unsafe impl Send for Storage {}
unsafe impl Sync for Storage {}

/// A tensor that owns its shape and shares its data through a [`Storage`].
#[derive(Debug)]
pub struct NativeTensorImpl {
    storage: Arc<Storage>,
    scalar_type: ScalarType,
    sizes: Vec<SizesType>,
    strides: Vec<StridesType>,
    numel: usize,
}

impl NativeTensorImpl {
    /// Creates a tensor over `storage` with the default shape: one dimension
    /// of size zero.
    pub fn new(storage: Arc<Storage>, scalar_type: ScalarType) -> NativeTensorImpl {
        NativeTensorImpl {
            storage,
            scalar_type,
            sizes: vec![0],
            strides: vec![1],
            numel: 0,
        }
    }

    /// Replaces the shape of the tensor.
    ///
    /// # Panics
    ///
    /// Panics if `sizes` and `strides` differ in length or a size is
    /// negative.
    pub fn set_sizes_and_strides(&mut self, sizes: &[SizesType], strides: &[StridesType]) {
        assert_eq!(
            sizes.len(),
            strides.len(),
            "sizes and strides must have the same length"
        );
        assert!(
            sizes.iter().all(|&size| size >= 0),
            "sizes must be non-negative: {sizes:?}"
        );
        self.sizes.clear();
        self.sizes.extend_from_slice(sizes);
        self.strides.clear();
        self.strides.extend_from_slice(strides);
        self.numel = sizes.iter().map(|&size| size as usize).product();
    }

    #[inline]
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    #[inline]
    pub fn scalar_type(&self) -> ScalarType {
        self.scalar_type
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.scalar_type.element_size()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn numel(&self) -> usize {
        self.numel
    }

    #[inline]
    pub fn nbytes(&self) -> usize {
        self.numel * self.element_size()
    }

    #[inline]
    pub fn sizes(&self) -> &[SizesType] {
        &self.sizes
    }

    #[inline]
    pub fn size(&self, dim: usize) -> SizesType {
        self.sizes[dim]
    }

    #[inline]
    pub fn strides(&self) -> &[StridesType] {
        &self.strides
    }

    /// Returns `true` if the strides are the row-major contiguous ones.
    pub fn is_contiguous(&self) -> bool {
        let mut expected: StridesType = 1;
        for (&size, &stride) in self.sizes.iter().zip(&self.strides).rev() {
            if size != 1 && stride != expected {
                return false;
            }
            expected = expected.saturating_mul(size);
        }
        true
    }

    #[inline]
    pub fn data(&self) -> *const c_void {
        self.storage.data().cast_const()
    }

    #[inline]
    pub fn mutable_data(&self) -> *mut c_void {
        self.storage.data()
    }

    pub fn set_data(&self, data: *mut c_void) {
        self.storage.set_data(data);
    }
}

/// Computes the number of bytes spanned by a strided tensor: zero if any
/// dimension is empty, otherwise the offset of the last element plus one,
/// times the element size.
pub fn compute_storage_nbytes(
    sizes: &[SizesType],
    strides: &[StridesType],
    itemsize: usize,
) -> Result<usize> {
    if sizes.iter().any(|&size| size == 0) {
        return Ok(0);
    }
    let overflow = || Error::invalid_arg("sizes", "storage size overflows usize");
    let mut extent = 1usize;
    for (&size, &stride) in sizes.iter().zip(strides) {
        let size = usize::try_from(size)
            .map_err(|_| Error::invalid_arg("sizes", format!("negative size {size}")))?;
        let stride = usize::try_from(stride)
            .map_err(|_| Error::invalid_arg("strides", format!("negative stride {stride}")))?;
        extent = (size - 1)
            .checked_mul(stride)
            .and_then(|offset| extent.checked_add(offset))
            .ok_or_else(overflow)?;
    }
    extent.checked_mul(itemsize).ok_or_else(overflow)
}

/// Creates a [`TensorImplPtr`] over externally owned `data`.
///
/// The layout is synthesized and validated exactly as in the default backend.
/// The data and `deleter` go into a [`Storage`], and the tensor takes the
/// final sizes and strides. `dynamism` has no native counterpart and is
/// ignored. On error the deleter is dropped without being called.
pub fn make_tensor_impl_ptr(
    sizes: Vec<SizesType>,
    data: *mut c_void,
    dim_order: Vec<DimOrderType>,
    strides: Vec<StridesType>,
    scalar_type: ScalarType,
    _dynamism: TensorShapeDynamism,
    deleter: Option<Deleter>,
) -> Result<TensorImplPtr> {
    let (_, strides) = dim_order::synthesize(&sizes, dim_order, strides)?;
    compute_numel(&sizes)?;
    let nbytes = compute_storage_nbytes(&sizes, &strides, scalar_type.element_size())?;

    log::debug!(
        "creating native tensor: type {scalar_type}, sizes {sizes:?}, strides {strides:?}, {nbytes} bytes"
    );
    let storage = Arc::new(Storage::from_raw(data, nbytes, deleter));
    let mut tensor_impl = NativeTensorImpl::new(storage, scalar_type);
    tensor_impl.set_sizes_and_strides(&sizes, &strides);
    Ok(Arc::new(tensor_impl))
}

#[cfg(test)]
mod tests {
    use tensorptr_testkit::probe::CleanupProbe;

    use super::*;

    #[test]
    fn test_storage_nbytes() {
        assert_eq!(compute_storage_nbytes(&[2, 3], &[3, 1], 4).unwrap(), 24);
        assert_eq!(compute_storage_nbytes(&[3, 4], &[1, 3], 2).unwrap(), 24);
        assert_eq!(compute_storage_nbytes(&[], &[], 8).unwrap(), 8);
        assert_eq!(compute_storage_nbytes(&[2, 0], &[1, 1], 4).unwrap(), 0);
    }

    #[test]
    fn test_storage_outlives_tensor() {
        let probe = CleanupProbe::new();
        let mut data = vec![0f32; 6];
        let tensor = make_tensor_impl_ptr(
            vec![2, 3],
            data.as_mut_ptr().cast(),
            vec![],
            vec![],
            ScalarType::Float,
            TensorShapeDynamism::Static,
            Some(probe.deleter()),
        )
        .unwrap();
        assert_eq!(tensor.storage().nbytes(), 24);
        assert!(tensor.is_contiguous());

        let storage = tensor.storage().clone();
        drop(tensor);
        assert_eq!(probe.calls(), 0);
        drop(storage);
        assert_eq!(probe.calls(), 1);
    }

    #[test]
    fn test_default_shape() {
        let storage = Arc::new(Storage::from_raw(std::ptr::null_mut(), 0, None));
        let tensor = NativeTensorImpl::new(storage, ScalarType::Byte);
        assert_eq!(tensor.sizes(), &[0]);
        assert_eq!(tensor.numel(), 0);
    }

    #[test]
    fn test_transposed_is_not_contiguous() {
        let mut data = [0u8; 12];
        let tensor = make_tensor_impl_ptr(
            vec![3, 4],
            data.as_mut_ptr().cast(),
            vec![1, 0],
            vec![],
            ScalarType::Byte,
            TensorShapeDynamism::Static,
            None,
        )
        .unwrap();
        assert_eq!(tensor.strides(), &[1, 3]);
        assert!(!tensor.is_contiguous());
    }
}
