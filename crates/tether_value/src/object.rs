//! Capability traits for host-backed script objects.
//!
//! A script runtime sees every host wrapper as a `Value::Object` holding a
//! `dyn ScriptObject`. The base trait covers what every value supports
//! (display, type name, freezing, truthiness, hashing); the optional
//! capabilities are reached through the `as_*` accessors, which return `None`
//! when the object does not support them.

use std::any::Any;
use std::fmt;

use crate::errors::{not_hashable, EvalError, EvalResult};
use crate::value::Value;

/// Lazily produced elements of an iteration.
pub type ValueIter = Box<dyn Iterator<Item = EvalResult> + Send>;

/// Base capability set of every host-backed value.
pub trait ScriptObject: fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Script-visible type name, e.g. `tether_slice<Vec<i64>>`.
    fn type_name(&self) -> String;

    /// Make the object immutable. Idempotent and one-way.
    fn freeze(&self);

    fn truth(&self) -> bool {
        true
    }

    /// Mutable objects are not hashable.
    fn hash(&self) -> Result<u32, EvalError> {
        Err(not_hashable(&self.type_name()))
    }

    fn as_any(&self) -> &dyn Any;

    fn as_attrs(&self) -> Option<&dyn HasAttrs> {
        None
    }

    fn as_indexable(&self) -> Option<&dyn Indexable> {
        None
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        None
    }

    fn as_mapping(&self) -> Option<&dyn Mapping> {
        None
    }

    fn as_callable(&self) -> Option<&dyn Callable> {
        None
    }
}

/// `x.name` and `x.name = v`.
pub trait HasAttrs {
    /// `Ok(None)` means the attribute does not exist; the runtime turns that
    /// into its own "no such attribute" report.
    fn attr(&self, name: &str) -> Result<Option<Value>, EvalError>;

    fn attr_names(&self) -> Vec<String>;

    fn set_attr(&self, name: &str, value: Value) -> Result<(), EvalError>;
}

/// `x[i]`, `x[i] = v` and `len(x)`.
pub trait Indexable {
    fn len(&self) -> usize;

    fn get_index(&self, index: &Value) -> EvalResult;

    fn set_index(&self, index: &Value, value: Value) -> Result<(), EvalError>;
}

/// `for x in obj`.
pub trait Iterable {
    fn iterate(&self) -> ValueIter;
}

/// `m[k]`, `m[k] = v` and `len(m)`.
pub trait Mapping {
    /// `Ok(None)` when the key is absent.
    fn get(&self, key: &Value) -> Result<Option<Value>, EvalError>;

    fn set_key(&self, key: &Value, value: Value) -> Result<(), EvalError>;

    fn len(&self) -> usize;
}

/// `f(args, name=value)`.
pub trait Callable {
    fn name(&self) -> &str;

    fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> EvalResult;
}
