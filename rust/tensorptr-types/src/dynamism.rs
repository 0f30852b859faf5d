/// Describes how a tensor's shape may change after it has been created.
#[repr(u8)]
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TensorShapeDynamism {
    /// The shape never changes.
    #[default]
    Static = 0,
    /// The shape may shrink, but never past the upper bound given at creation.
    DynamicBound = 1,
    /// The shape may change freely; the backing memory may need to be replaced.
    DynamicUnbound = 2,
}

impl TensorShapeDynamism {
    /// Returns the dynamism a tensor of the given rank actually gets.
    ///
    /// A rank-0 tensor has no shape to change, so it is always `Static`.
    #[inline]
    pub fn for_rank(self, rank: usize) -> TensorShapeDynamism {
        if rank > 0 {
            self
        } else {
            TensorShapeDynamism::Static
        }
    }

    pub fn is_static(self) -> bool {
        self == TensorShapeDynamism::Static
    }
}
