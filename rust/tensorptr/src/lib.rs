//! Shared, self-owning tensor metadata handles.
//!
//! A [`TensorImpl`] describes a tensor (element type, sizes, dim order,
//! strides, data pointer) without owning any of the memory it refers to. This
//! crate builds [`TensorImplPtr`] handles that do own it: the metadata arrays
//! always, and the data buffer when a cleanup action or an owned buffer is
//! supplied. Cloning a handle is cheap and every clone sees the same tensor.
//!
//! # Example
//!
//! ```
//! use tensorptr::{ScalarType, TensorShapeDynamism, make_tensor_impl_ptr_from_vec};
//!
//! let tensor = make_tensor_impl_ptr_from_vec(
//!     vec![2, 3],
//!     vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0],
//!     vec![],
//!     vec![],
//!     TensorShapeDynamism::Static,
//! )
//! .unwrap();
//! assert_eq!(tensor.scalar_type(), ScalarType::Float);
//! assert_eq!(tensor.strides(), &[3, 1]);
//! ```

pub mod dim_order;
pub mod shared;
pub mod tensor_impl;
pub mod tensor_impl_ptr;

pub use shared::Shared;
pub use tensor_impl::TensorImpl;
pub use tensor_impl_ptr::{
    Deleter, TensorImplPtr, from_vec, make_tensor_impl_ptr, make_tensor_impl_ptr_from_vec,
    make_tensor_impl_ptr_owned,
};

pub use tensorptr_common::{Result, error::Error, error::ErrorKind};
pub use tensorptr_common_traits::data_owner::{DataAllocation, DataOwner};
pub use tensorptr_types::{
    DimOrderType, Scalar, ScalarType, SizesType, StridesType, TensorShapeDynamism,
};
