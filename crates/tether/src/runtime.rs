//! Boundary to the script runtime.

use rustc_hash::FxHashMap;
use tether_convert::{from_namespace, Converter, Namespace};
use tether_native::NativeValue;
use tether_value::EvalError;

/// A script interpreter that runs source against predeclared globals.
///
/// The bridge never parses or evaluates scripts itself. Implementations
/// receive the converted host values as `namespace` and hand back the
/// script's globals after execution.
pub trait ScriptRuntime {
    fn exec(&self, source: &str, namespace: Namespace) -> Result<Namespace, EvalError>;
}

impl<F> ScriptRuntime for F
where
    F: Fn(&str, Namespace) -> Result<Namespace, EvalError>,
{
    fn exec(&self, source: &str, namespace: Namespace) -> Result<Namespace, EvalError> {
        self(source, namespace)
    }
}

/// Run `source` with `natives` predeclared and return its globals as host
/// values. Struct fields are named under `tag`; an empty tag means the
/// default.
#[tracing::instrument(level = "debug", skip_all, fields(source_len = source.len()))]
pub fn eval<R, K>(
    runtime: &R,
    source: &str,
    natives: impl IntoIterator<Item = (K, NativeValue)>,
    tag: &str,
) -> Result<FxHashMap<String, NativeValue>, EvalError>
where
    R: ScriptRuntime + ?Sized,
    K: Into<String>,
{
    let namespace = Converter::with_tag(tag).make_namespace(natives)?;
    let globals = runtime.exec(source, namespace)?;
    tracing::debug!(globals = globals.len(), "script finished");
    Ok(from_namespace(&globals))
}
