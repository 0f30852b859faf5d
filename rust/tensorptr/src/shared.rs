//! An aliasing shared pointer.
//!
//! [`Shared<T>`] dereferences to a `T` that lives *inside* some larger
//! reference-counted owner, and keeps that whole owner alive. It is the Rust
//! counterpart of an aliasing `shared_ptr`: the count is shared with the owner,
//! while the pointee is a sub-object of it.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::Arc;

/// A reference-counted handle to a `T` that is owned by an arbitrary
/// `Arc`-managed owner.
///
/// Cloning a `Shared` bumps the owner's strong count; the owner, and with it
/// the `T`, is dropped when the last handle (and any other `Arc` to the owner)
/// goes away.
pub struct Shared<T: ?Sized> {
    ptr: NonNull<T>,
    owner: Arc<dyn Any + Send + Sync>,
}

impl<T: Send + Sync + 'static> Shared<T> {
    /// Moves `value` into a new allocation and returns a handle to it.
    pub fn new(value: T) -> Shared<T> {
        Shared::project(Arc::new(value), |value| value)
    }
}

impl<T: ?Sized> Shared<T> {
    /// Creates a handle to a part of `owner`, selected by `project`.
    ///
    /// The returned handle shares ownership of `owner`. Since the contents of
    /// an `Arc` never move, the projected reference stays valid for as long as
    /// any handle exists.
    pub fn project<O>(owner: Arc<O>, project: impl FnOnce(&O) -> &T) -> Shared<T>
    where
        O: Send + Sync + 'static,
    {
        let ptr = NonNull::from(project(&owner));
        Shared { ptr, owner }
    }

    /// Narrows this handle to a part of the current pointee, sharing the same
    /// owner.
    pub fn map<U: ?Sized>(this: &Self, project: impl FnOnce(&T) -> &U) -> Shared<U> {
        Shared {
            ptr: NonNull::from(project(&**this)),
            owner: this.owner.clone(),
        }
    }

    /// Returns the number of strong references to the owner.
    pub fn strong_count(this: &Self) -> usize {
        Arc::strong_count(&this.owner)
    }

    /// Returns `true` if both handles share the same owner and point to the
    /// same object.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        std::ptr::addr_eq(this.ptr.as_ptr(), other.ptr.as_ptr())
            && Arc::ptr_eq(&this.owner, &other.owner)
    }

    /// Returns a raw pointer to the pointee.
    pub fn as_ptr(this: &Self) -> *const T {
        this.ptr.as_ptr()
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared {
            ptr: self.ptr,
            owner: self.owner.clone(),
        }
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: `ptr` was derived from a reference into `owner`, which is
        // kept alive by `self` and whose contents never move.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized> AsRef<T> for Shared<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

// SAFETY: a `Shared<T>` only ever hands out `&T`, and the owner itself is
// `Send + Sync`. Sending or sharing the handle therefore amounts to sharing
// `&T` across threads, which is sound for `T: Sync`.
unsafe impl<T: ?Sized + Sync> Send for Shared<T> {}
unsafe impl<T: ?Sized + Sync> Sync for Shared<T> {}
