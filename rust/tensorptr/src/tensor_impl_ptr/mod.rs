//! Factories for self-owning, shareable tensor metadata handles.
//!
//! A [`TensorImplPtr`] bundles a tensor's metadata with everything that
//! metadata points to: the sizes, dim order and strides arrays, and
//! (optionally) the data buffer. All of them share the handle's lifetime, so
//! callers only ever track one reference-counted object.
//!
//! The representation is chosen at build time:
//! - by default (`portable.rs`), one allocation holds the
//!   [`TensorImpl`](crate::tensor_impl::TensorImpl) together with its arrays
//!   and the cleanup action, and the handle aliases into it;
//! - with the `native-storage` feature (`native.rs`), the data lives in a
//!   separately reference-counted [`Storage`] that carries the cleanup action,
//!   and the handle is a plain `Arc` to a tensor that owns its shape.
//!
//! Both expose the same factory functions with the same guarantees: all
//! validation happens before anything is allocated, and the cleanup action
//! runs exactly once, when the last handle is dropped.

use std::ffi::c_void;

use tensorptr_common::{Result, error::Error};
use tensorptr_common_traits::data_owner::DataOwner;
use tensorptr_types::{
    DimOrderType, Scalar, ScalarType, SizesType, StridesType, TensorShapeDynamism, compute_nbytes,
};

#[cfg_attr(not(feature = "native-storage"), path = "portable.rs")]
#[cfg_attr(feature = "native-storage", path = "native.rs")]
mod backend;

#[cfg(feature = "native-storage")]
pub use backend::{NativeTensorImpl, Storage, compute_storage_nbytes};
pub use backend::{TensorImplPtr, make_tensor_impl_ptr};

#[cfg(test)]
mod tests;

/// A cleanup action for a tensor's data buffer.
///
/// It is called once, with the data pointer stored in the tensor at the time
/// the last handle is dropped.
pub type Deleter = Box<dyn FnOnce(*mut c_void) + Send + 'static>;

/// Holds the optional [`Deleter`] of a tensor until teardown.
pub(crate) struct DeleterSlot(Option<Deleter>);

impl DeleterSlot {
    pub(crate) fn new(deleter: Option<Deleter>) -> DeleterSlot {
        DeleterSlot(deleter)
    }

    /// Runs the deleter, if there is one and it has not run yet.
    pub(crate) fn run(&mut self, data: *mut c_void) {
        if let Some(deleter) = self.0.take() {
            log::trace!("running tensor data deleter for {data:p}");
            deleter(data);
        }
    }
}

// SAFETY: the deleter is only reachable through `&mut DeleterSlot`, so a
// shared `&DeleterSlot` exposes nothing that could be used concurrently.
unsafe impl Sync for DeleterSlot {}

/// Creates a [`TensorImplPtr`] that owns `data`.
///
/// `data` is moved into the returned handle without being copied, and is
/// dropped together with the last handle. The buffer must hold at least
/// `numel(sizes) * scalar_type.element_size()` bytes; this is checked before
/// anything else is done. See [`make_tensor_impl_ptr`] for the meaning of
/// `dim_order` and `strides`.
pub fn make_tensor_impl_ptr_owned<O>(
    sizes: Vec<SizesType>,
    mut data: O,
    dim_order: Vec<DimOrderType>,
    strides: Vec<StridesType>,
    scalar_type: ScalarType,
    dynamism: TensorShapeDynamism,
) -> Result<TensorImplPtr>
where
    O: DataOwner + Send + 'static,
{
    let allocation = data.allocation();
    let required = compute_nbytes(&sizes, scalar_type)?;
    if allocation.len < required {
        return Err(Error::buffer_too_small(required, allocation.len));
    }
    make_tensor_impl_ptr(
        sizes,
        allocation.ptr.cast(),
        dim_order,
        strides,
        scalar_type,
        dynamism,
        // The buffer lives in the deleter and goes away with it.
        Some(Box::new(move |_: *mut c_void| drop(data))),
    )
}

/// Creates a [`TensorImplPtr`] that owns a typed vector, deducing the scalar
/// type from `T`.
pub fn make_tensor_impl_ptr_from_vec<T: Scalar>(
    sizes: Vec<SizesType>,
    data: Vec<T>,
    dim_order: Vec<DimOrderType>,
    strides: Vec<StridesType>,
    dynamism: TensorShapeDynamism,
) -> Result<TensorImplPtr> {
    make_tensor_impl_ptr_owned(sizes, data, dim_order, strides, T::TYPE, dynamism)
}

/// Creates a contiguous one-dimensional [`TensorImplPtr`] that owns `data`.
pub fn from_vec<T: Scalar>(data: Vec<T>) -> Result<TensorImplPtr> {
    let len = SizesType::try_from(data.len()).map_err(|_| {
        Error::invalid_arg(
            "data",
            format!("{} elements do not fit in a tensor dimension", data.len()),
        )
    })?;
    make_tensor_impl_ptr_from_vec(
        vec![len],
        data,
        vec![],
        vec![],
        TensorShapeDynamism::DynamicBound,
    )
}
