//! Owned data buffers with drop tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tensorptr_common_traits::data_owner::{DataAllocation, DataOwner};

/// A shared count of how many times a [`TrackedBuffer`] was dropped.
#[derive(Clone, Debug, Default)]
pub struct DropCounter(Arc<AtomicUsize>);

impl DropCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A heap byte buffer that bumps its [`DropCounter`] when dropped.
#[derive(Debug)]
pub struct TrackedBuffer {
    data: Box<[u8]>,
    drops: DropCounter,
}

impl TrackedBuffer {
    /// Allocates `len` zero bytes.
    pub fn zeroed(len: usize) -> TrackedBuffer {
        TrackedBuffer {
            data: vec![0u8; len].into_boxed_slice(),
            drops: DropCounter::default(),
        }
    }

    pub fn drop_counter(&self) -> DropCounter {
        self.drops.clone()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Drop for TrackedBuffer {
    fn drop(&mut self) {
        self.drops.0.fetch_add(1, Ordering::SeqCst);
    }
}

// SAFETY: the boxed slice is heap allocated, fully initialized and owned
// exclusively by the buffer.
unsafe impl DataOwner for TrackedBuffer {
    fn allocation(&mut self) -> DataAllocation {
        self.data.allocation()
    }
}
