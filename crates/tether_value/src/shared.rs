//! Shared mutable handles with allocation identity.
//!
//! Every mutable aggregate on either side of the bridge (script lists, dicts
//! and sets, host slices, maps and pointer cells) lives in a `Shared<T>`. Two
//! handles to the same allocation observe each other's writes, and both report
//! the same [`AggregateId`].

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashSet;

static NEXT_AGGREGATE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a shared allocation, assigned once when it is created.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregateId(u64);

impl AggregateId {
    fn next() -> Self {
        AggregateId(NEXT_AGGREGATE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct SharedInner<T> {
    id: AggregateId,
    data: RwLock<T>,
}

/// Reference-counted, lock-protected, identity-carrying cell.
pub struct Shared<T>(Arc<SharedInner<T>>);

impl<T> Shared<T> {
    pub fn new(data: T) -> Self {
        Shared(Arc::new(SharedInner {
            id: AggregateId::next(),
            data: RwLock::new(data),
        }))
    }

    #[inline]
    pub fn id(&self) -> AggregateId {
        self.0.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.data.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.data.write()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

// Contents are not printed: a shared aggregate may contain itself.
impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({})", self.0.id)
    }
}

thread_local! {
    static RENDERING: RefCell<FxHashSet<AggregateId>> = RefCell::new(FxHashSet::default());
}

/// Run `render` unless `id` is already being rendered further up this thread's
/// stack, in which case `None` is returned and the caller prints a marker.
///
/// Used by every `Display` impl that can reach itself through shared handles.
pub fn display_guard<R>(id: AggregateId, render: impl FnOnce() -> R) -> Option<R> {
    let entered = RENDERING.with(|set| set.borrow_mut().insert(id));
    if !entered {
        return None;
    }
    let _exit = RenderExit(id);
    Some(render())
}

struct RenderExit(AggregateId);

impl Drop for RenderExit {
    fn drop(&mut self) {
        RENDERING.with(|set| {
            set.borrow_mut().remove(&self.0);
        });
    }
}

#[cfg(test)]
mod tests;
