//! Observing tensor data deleters.

use std::ffi::c_void;
use std::sync::Arc;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

/// Hands out deleters and records what happens to them.
///
/// Clones share the same record, so a probe can be moved into another thread
/// while the test keeps a handle to inspect it.
#[derive(Clone, Default)]
pub struct CleanupProbe {
    state: Arc<ProbeState>,
}

#[derive(Default)]
struct ProbeState {
    calls: AtomicUsize,
    issued: AtomicUsize,
    released: AtomicUsize,
    last_ptr: AtomicPtr<c_void>,
}

/// Dropped together with the deleter closure that owns it, called or not.
struct ReleaseGuard(Arc<ProbeState>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl CleanupProbe {
    pub fn new() -> CleanupProbe {
        CleanupProbe::default()
    }

    /// Returns a new deleter that records its invocation in this probe.
    pub fn deleter(&self) -> Box<dyn FnOnce(*mut c_void) + Send + 'static> {
        self.state.issued.fetch_add(1, Ordering::SeqCst);
        let guard = ReleaseGuard(self.state.clone());
        Box::new(move |data: *mut c_void| {
            let state = &guard.0;
            state.last_ptr.store(data, Ordering::SeqCst);
            state.calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Number of times any deleter of this probe was invoked.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// The pointer passed to the most recent invocation, null if none.
    pub fn last_ptr(&self) -> *mut c_void {
        self.state.last_ptr.load(Ordering::SeqCst)
    }

    /// Number of deleters handed out that have not been dropped yet.
    pub fn live_deleters(&self) -> usize {
        self.state.issued.load(Ordering::SeqCst) - self.state.released.load(Ordering::SeqCst)
    }
}
