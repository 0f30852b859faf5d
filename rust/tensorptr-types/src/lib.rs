//! Element types, shape dynamism tags and the index types that tensor metadata
//! is expressed in.

pub mod dynamism;
pub mod numel;
pub mod scalar;

pub use dynamism::TensorShapeDynamism;
pub use numel::{compute_nbytes, compute_numel};
pub use scalar::{Scalar, ScalarType};

/// Element type of a tensor's sizes array.
pub type SizesType = i32;

/// Element type of a tensor's dim order array.
pub type DimOrderType = u8;

/// Element type of a tensor's strides array.
pub type StridesType = i32;
