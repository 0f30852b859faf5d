use std::ffi::c_void;
use std::sync::Arc;

use tensorptr_common::Result;
use tensorptr_types::{DimOrderType, ScalarType, SizesType, StridesType, TensorShapeDynamism};

use super::{Deleter, DeleterSlot};
use crate::dim_order;
use crate::shared::Shared;
use crate::tensor_impl::TensorImpl;

/// A shared handle to a [`TensorImpl`] that keeps its metadata arrays, and
/// optionally its data, alive.
pub type TensorImplPtr = Shared<TensorImpl>;

/// Single allocation that owns a `TensorImpl` and everything it points to.
///
/// The vectors are never touched after construction: `tensor_impl` holds raw
/// pointers into their heap buffers.
struct Envelope {
    tensor_impl: TensorImpl,
    _sizes: Vec<SizesType>,
    _dim_order: Vec<DimOrderType>,
    _strides: Vec<StridesType>,
    deleter: DeleterSlot,
}

impl Drop for Envelope {
    fn drop(&mut self) {
        log::trace!(
            "releasing tensor impl envelope: sizes {:?}, type {}",
            self.tensor_impl.sizes(),
            self.tensor_impl.scalar_type()
        );
        self.deleter.run(self.tensor_impl.mutable_data());
    }
}

/// Creates a [`TensorImplPtr`] over externally owned `data`.
///
/// `dim_order` and `strides` may each be empty, in which case they are
/// derived (see [`dim_order::synthesize`]). If both are given they must
/// agree. `deleter`, if any, is called exactly once with the tensor's data
/// pointer when the last handle is dropped. On error the deleter is dropped
/// without being called.
///
/// At rank 0 the shape dynamism is always `Static`.
pub fn make_tensor_impl_ptr(
    sizes: Vec<SizesType>,
    data: *mut c_void,
    dim_order: Vec<DimOrderType>,
    strides: Vec<StridesType>,
    scalar_type: ScalarType,
    dynamism: TensorShapeDynamism,
    deleter: Option<Deleter>,
) -> Result<TensorImplPtr> {
    let (dim_order, strides) = dim_order::synthesize(&sizes, dim_order, strides)?;
    let dim = sizes.len();

    // SAFETY: the three vectors move into the envelope below together with
    // the `TensorImpl`; moving a `Vec` does not move its heap buffer, and the
    // envelope never modifies them.
    let tensor_impl = unsafe {
        TensorImpl::new(
            scalar_type,
            dim,
            sizes.as_ptr(),
            data,
            dim_order.as_ptr(),
            strides.as_ptr(),
            dynamism.for_rank(dim),
        )
    }?;

    log::debug!(
        "creating tensor impl ptr: type {scalar_type}, sizes {sizes:?}, dim_order {dim_order:?}, strides {strides:?}"
    );
    let envelope = Arc::new(Envelope {
        tensor_impl,
        _sizes: sizes,
        _dim_order: dim_order,
        _strides: strides,
        deleter: DeleterSlot::new(deleter),
    });
    Ok(Shared::project(envelope, |envelope| &envelope.tensor_impl))
}
