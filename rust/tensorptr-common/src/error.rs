use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns `true` for caller-facing validation failures, i.e. every error
    /// that is detected before anything is allocated on the caller's behalf.
    pub fn is_validation(&self) -> bool {
        !matches!(self.kind(), ErrorKind::AllocationFailed { .. })
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn dim_order_length_mismatch(rank: usize, len: usize) -> Error {
        ErrorKind::DimOrderLengthMismatch { rank, len }.into()
    }

    pub fn strides_length_mismatch(rank: usize, len: usize) -> Error {
        ErrorKind::StridesLengthMismatch { rank, len }.into()
    }

    pub fn invalid_dim_order(dim_order: &[u8]) -> Error {
        ErrorKind::InvalidDimOrder {
            dim_order: dim_order.to_vec(),
        }
        .into()
    }

    pub fn inconsistent_strides(supplied: &[i32], derived: &[i32]) -> Error {
        ErrorKind::InconsistentStrides {
            supplied: supplied.to_vec(),
            derived: derived.to_vec(),
        }
        .into()
    }

    pub fn buffer_too_small(required: usize, actual: usize) -> Error {
        ErrorKind::BufferTooSmall { required, actual }.into()
    }

    pub fn allocation_failed(
        context: impl Into<String>,
        source: std::collections::TryReserveError,
    ) -> Error {
        Error(
            ErrorKind::AllocationFailed {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("dim_order/sizes length mismatch: rank {rank}, dim_order length {len}")]
    DimOrderLengthMismatch { rank: usize, len: usize },

    #[error("strides/sizes length mismatch: rank {rank}, strides length {len}")]
    StridesLengthMismatch { rank: usize, len: usize },

    #[error("dim_order {dim_order:?} is not a permutation of the tensor dimensions")]
    InvalidDimOrder { dim_order: Vec<u8> },

    #[error(
        "supplied strides inconsistent with sizes/dim_order: supplied {supplied:?}, derived {derived:?}"
    )]
    InconsistentStrides {
        supplied: Vec<i32>,
        derived: Vec<i32>,
    },

    #[error(
        "buffer smaller than required by sizes and type: required {required} bytes, got {actual}"
    )]
    BufferTooSmall { required: usize, actual: usize },

    #[error("allocation failed for '{context}': {source}")]
    AllocationFailed {
        context: String,
        source: std::collections::TryReserveError,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
