#![allow(
    clippy::result_large_err,
    reason = "EvalError is the one error type of the bridge; boxing it would spread through every signature"
)]
//! Tether Value - the script side of the tether bridge.
//!
//! This crate provides:
//! - Runtime script values (`Value`, `Int`, `List`, `Dict`, `Set`)
//! - Shared handles with identity (`Heap`, `Shared`, `AggregateId`)
//! - Capability traits through which a script runtime drives host-backed
//!   objects (`ScriptObject`, `HasAttrs`, `Indexable`, `Iterable`, `Mapping`,
//!   `Callable`)
//! - Evaluation errors (`EvalError`, `EvalErrorKind`, `EvalResult`)
//!
//! # Value Types
//!
//! Immutable payloads (strings, bytes, tuples, objects) live behind `Heap<T>`.
//! Mutable containers live behind `Shared<T>`, which pairs a
//! `parking_lot::RwLock` with an [`AggregateId`] assigned at allocation. The id
//! is what cycle detection and cycle-safe rendering key on.

mod errors;
mod heap;
mod object;
mod shared;
pub mod suggest;
mod value;

pub use errors::{
    arity_mismatch, arity_range_mismatch, attribute_not_found, element_not_found,
    fixed_length_violation, frozen_violation, host_error, index_out_of_range,
    invalid_index_type, key_not_found, mixed_elements, mutation_during_iteration, nested_container,
    no_such_method, not_assignable, not_callable, not_hashable, not_iterable, not_nullable,
    numeric_overflow, stale_reference, type_mismatch, unexpected_keywords, unsupported_type,
    value_not_found, variadic_arity_mismatch, EvalError, EvalErrorKind, EvalResult,
};
pub use heap::Heap;
pub use object::{Callable, HasAttrs, Indexable, Iterable, Mapping, ScriptObject, ValueIter};
pub use shared::{display_guard, AggregateId, Shared};
pub use value::{Dict, Int, List, Set, Value};
