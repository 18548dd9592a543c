#![allow(
    clippy::result_large_err,
    reason = "EvalError is the one error type of the bridge; boxing it would spread through every signature"
)]
//! Tether - host values in an embedded script runtime.
//!
//! Host data is described with the [`tether_native`] model, converted by
//! [`tether_convert`] into the script values of [`tether_value`], and handed
//! to a [`ScriptRuntime`] as predeclared globals. Aggregates are wrapped, not
//! copied: a script appending to a host slice or assigning a field of a host
//! struct behind a pointer is seen by the host afterwards.
//!
//! ```text
//! let greet = NativeFunc::new(
//!     FuncSig::new(vec![NativeType::Str], vec![NativeType::Str]),
//!     |args| vec![format!("hello {}", args[0].as_str().unwrap_or("")).into()],
//! );
//! let globals = tether::eval(&runtime, "msg = greet('world')", [("greet", greet.into())], "")?;
//! ```

mod runtime;

use std::sync::Once;

pub use runtime::{eval, ScriptRuntime};
pub use tether_convert::{
    from_kwargs, from_namespace, from_string_dict, from_value, from_value_as, make_callable,
    make_namespace, to_value, to_value_with_tag, BuiltinMethod, Converter, FunctionWrapper, Kwarg,
    MapWrapper, Namespace, RecursionGuard, SliceWrapper, StructWrapper, Tag, Visit, VisitScope,
    DEFAULT_TAG,
};
pub use tether_native::{
    FieldDef, FloatKind, FuncSig, IntKind, MapData, MapRef, MethodDef, NativeError, NativeFunc,
    NativePtr, NativeType, NativeValue, OpaqueHandle, Receiver, SeqData, SeqRef, StructDef,
    StructDefBuilder, StructObj, TagEntry, UintKind,
};
pub use tether_value::{
    AggregateId, Callable, Dict, EvalError, EvalErrorKind, EvalResult, HasAttrs, Heap, Indexable,
    Int, Iterable, List, Mapping, ScriptObject, Set, Shared, Value, ValueIter,
};

static TRACING_INIT: Once = Once::new();

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "TETHER_LOG";

/// Filter used when the variable is set but empty.
const DEFAULT_FILTER: &str = "tether=debug,tether_convert=debug";

/// Install a `tracing` subscriber for conversion and eval events.
///
/// Nothing is installed unless `TETHER_LOG` or `RUST_LOG` is set, e.g.
/// `TETHER_LOG=tether_convert=trace`. Later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Some(directives) = [LOG_ENV, "RUST_LOG"]
            .into_iter()
            .find_map(|var| std::env::var(var).ok())
        else {
            return;
        };
        let filter = if directives.trim().is_empty() {
            EnvFilter::new(DEFAULT_FILTER)
        } else {
            EnvFilter::new(directives)
        };
        // Another subscriber may already be installed by the host.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init();
    });
}
