//! Stack growth for recursive conversions.
//!
//! Converting deeply nested host data (or deeply nested script containers on
//! the way back) recurses once per level. Each recursive entry point runs
//! inside [`ensure_sufficient_stack`], which grows the stack on native targets
//! when less than the red zone remains.

#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 100 * 1024;

#[cfg(not(target_arch = "wasm32"))]
const GROWTH: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

// wasm manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
