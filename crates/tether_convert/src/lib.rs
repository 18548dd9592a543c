#![allow(
    clippy::result_large_err,
    reason = "EvalError is the one error type of the bridge; boxing it would spread through every signature"
)]
//! Tether Convert - the conversion engine between host and script values.
//!
//! # Architecture
//!
//! - `dispatch`: host-to-script conversion (`to_value`) and untyped
//!   script-to-host conversion (`from_value`)
//! - `coerce`: script-to-host conversion against a target `NativeType`
//!   (`from_value_as`), used for arguments, element writes and field writes
//! - `primitive`: the bool/number/string/bytes codec, with range checks
//! - Wrappers exposing host aggregates to scripts without copying them:
//!   `SliceWrapper`, `MapWrapper`, `StructWrapper`, `FunctionWrapper`
//! - `guard`: cycle detection for script containers that contain themselves
//! - `namespace`: building and reading the globals of a script run
//!
//! # Tags
//!
//! The struct tag key a [`Converter`] is created with is copied into every
//! wrapper it creates, so struct fields reached at any depth are named under
//! the same tag.

mod coerce;
mod config;
mod dispatch;
mod function;
mod guard;
mod map;
mod method;
mod namespace;
mod primitive;
mod slice;
mod stack;
mod structs;

pub use coerce::from_value_as;
pub use config::{Converter, Tag, DEFAULT_TAG};
pub use dispatch::{from_value, to_value, to_value_with_tag};
pub use function::{make_callable, FunctionWrapper};
pub use guard::{RecursionGuard, Visit, VisitScope};
pub use map::MapWrapper;
pub use method::BuiltinMethod;
pub use namespace::{
    from_kwargs, from_namespace, from_string_dict, make_namespace, Kwarg, Namespace,
};
pub use slice::SliceWrapper;
pub use structs::StructWrapper;
