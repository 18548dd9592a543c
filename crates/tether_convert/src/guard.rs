//! Cycle detection for script-to-host conversion.
//!
//! Script containers can contain themselves (`l.append(l)`). Walking them
//! back into host values marks each container's [`AggregateId`] on entry and
//! unmarks it on exit; meeting a marked id means the walk has come back
//! around, and the caller substitutes nil instead of recursing.
//!
//! Entries are keyed by `(scope, id)`, so two conversions of the same
//! container running on different threads never see each other's marks even
//! though they share one lock-protected set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tether_value::AggregateId;

static GLOBAL_GUARD: LazyLock<RecursionGuard> = LazyLock::new(RecursionGuard::new);

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct ScopeId(u64);

/// Shared visited set.
#[derive(Debug, Default)]
pub struct RecursionGuard {
    visited: Mutex<FxHashSet<(ScopeId, AggregateId)>>,
}

impl RecursionGuard {
    pub fn new() -> Self {
        RecursionGuard::default()
    }

    /// Process-wide guard used by `from_value`.
    pub fn global() -> &'static RecursionGuard {
        &GLOBAL_GUARD
    }

    /// Start one conversion.
    pub fn scope(&self) -> VisitScope<'_> {
        VisitScope {
            guard: self,
            id: ScopeId(NEXT_SCOPE.fetch_add(1, Ordering::Relaxed)),
        }
    }

    /// Marks currently held across all scopes.
    pub fn active_marks(&self) -> usize {
        self.visited.lock().len()
    }
}

/// The marks of a single conversion. Leftover marks are cleared on drop.
#[derive(Debug)]
pub struct VisitScope<'g> {
    guard: &'g RecursionGuard,
    id: ScopeId,
}

impl VisitScope<'_> {
    pub fn visited(&self, id: AggregateId) -> bool {
        self.guard.visited.lock().contains(&(self.id, id))
    }

    /// Returns `false` if `id` was already marked.
    pub fn mark_visited(&self, id: AggregateId) -> bool {
        self.guard.visited.lock().insert((self.id, id))
    }

    pub fn unmark(&self, id: AggregateId) {
        self.guard.visited.lock().remove(&(self.id, id));
    }

    /// Mark `id` for as long as the returned token lives, or `None` if it is
    /// already marked in this scope.
    pub fn enter(&self, id: AggregateId) -> Option<Visit<'_>> {
        self.mark_visited(id).then_some(Visit { scope: self, id })
    }
}

impl Drop for VisitScope<'_> {
    fn drop(&mut self) {
        let scope = self.id;
        self.guard.visited.lock().retain(|(owner, _)| *owner != scope);
    }
}

/// Token for one marked container; unmarks on drop.
#[derive(Debug)]
pub struct Visit<'s> {
    scope: &'s VisitScope<'s>,
    id: AggregateId,
}

impl Drop for Visit<'_> {
    fn drop(&mut self) {
        self.scope.unmark(self.id);
    }
}
