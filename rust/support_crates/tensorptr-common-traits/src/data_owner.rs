//! `DataOwner`: A trait for types that own a tensor's data buffer.

/// A trait for types that own a contiguous data buffer which can back a tensor.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - The pointer returned by `allocation()` stays valid, and keeps the same
///   address, for the entire lifetime of the owner, including after the owner
///   itself is moved. Heap-backed containers (`Vec`, `Box<[T]>`) satisfy this;
///   inline arrays do not.
/// - The reported length is accurate, and every byte in it is initialized.
/// - The memory is exclusively owned by the `DataOwner` instance.
pub unsafe trait DataOwner {
    /// Returns the location and size of the owned buffer.
    fn allocation(&mut self) -> DataAllocation;
}

/// Represents a block of owned memory with its size information.
#[derive(Debug, Clone, Copy)]
pub struct DataAllocation {
    /// Pointer to the start of the owned memory.
    pub ptr: *mut u8,
    /// Length of the owned memory in bytes.
    pub len: usize,
}

unsafe impl<T> DataOwner for Vec<T>
where
    T: bytemuck::NoUninit,
{
    fn allocation(&mut self) -> DataAllocation {
        DataAllocation {
            ptr: self.as_mut_ptr().cast(),
            len: std::mem::size_of_val(self.as_slice()),
        }
    }
}

unsafe impl<T> DataOwner for Box<[T]>
where
    T: bytemuck::NoUninit,
{
    fn allocation(&mut self) -> DataAllocation {
        DataAllocation {
            ptr: self.as_mut_ptr().cast(),
            len: std::mem::size_of_val(&**self),
        }
    }
}
