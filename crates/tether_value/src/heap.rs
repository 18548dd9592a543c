//! Reference-counted immutable payloads.
//!
//! `Heap<T>` is how immutable script data is shared: strings, bytes, tuples
//! and host-backed objects. Cloning a `Heap` bumps a count, it never copies
//! the payload.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Shared immutable allocation behind a script value.
///
/// Construction is crate-private: values are built through the `Value::`
/// factory methods so every allocation goes through one place.
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T: ?Sized> Heap<T> {
    pub(crate) fn from_arc(inner: Arc<T>) -> Self {
        Heap(inner)
    }

    /// Address identity, ignoring any trait-object metadata.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::as_ptr(&a.0).cast::<()>() == Arc::as_ptr(&b.0).cast::<()>()
    }

    /// Stable address of the payload, used for identity hashing.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        Heap::ptr_eq(self, other) || *self.0 == *other.0
    }
}

impl<T: ?Sized + Eq> Eq for Heap<T> {}

impl<T: ?Sized + Hash> Hash for Heap<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests;
