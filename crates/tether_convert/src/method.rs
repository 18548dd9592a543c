//! Built-in methods of host containers.
//!
//! `s.append` on a slice wrapper evaluates to a `BuiltinMethod`: the receiver
//! plus a method name, callable like any other script function. Calling it
//! dispatches by name to the receiver's method table.

use std::fmt;

use tether_value::{
    arity_mismatch, arity_range_mismatch, type_mismatch, unexpected_keywords, Callable,
    EvalError, EvalResult, ScriptObject, Value,
};

use crate::map::{self, MapWrapper};
use crate::slice::{self, SliceWrapper};

#[derive(Clone, Debug)]
pub(crate) enum MethodRecv {
    Slice(SliceWrapper),
    Map(MapWrapper),
}

/// A container method bound to its receiver.
#[derive(Clone, Debug)]
pub struct BuiltinMethod {
    name: &'static str,
    recv: MethodRecv,
}

impl BuiltinMethod {
    pub(crate) fn new(name: &'static str, recv: MethodRecv) -> Self {
        BuiltinMethod { name, recv }
    }

    fn receiver_type(&self) -> String {
        match &self.recv {
            MethodRecv::Slice(s) => s.type_name(),
            MethodRecv::Map(m) => m.type_name(),
        }
    }
}

impl fmt::Display for BuiltinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<built-in method {} of {} value>",
            self.name,
            self.receiver_type()
        )
    }
}

impl ScriptObject for BuiltinMethod {
    fn type_name(&self) -> String {
        "builtin_function_or_method".to_string()
    }

    // Mutability is governed by the receiver.
    fn freeze(&self) {}

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_callable(&self) -> Option<&dyn Callable> {
        Some(self)
    }
}

impl Callable for BuiltinMethod {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> EvalResult {
        if !kwargs.is_empty() {
            return Err(unexpected_keywords(self.name));
        }
        match &self.recv {
            MethodRecv::Slice(s) => slice::call_method(s, self.name, args),
            MethodRecv::Map(m) => map::call_method(m, self.name, args),
        }
    }
}

// Argument helpers

#[inline]
pub(crate) fn require_args(method: &str, expected: usize, args: &[Value]) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(arity_mismatch(method, expected, args.len()))
    }
}

#[inline]
pub(crate) fn require_args_between(
    method: &str,
    min: usize,
    max: usize,
    args: &[Value],
) -> Result<(), EvalError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(arity_range_mismatch(method, min, max, args.len()))
    }
}

/// Integer argument, saturated to the `i64` range.
pub(crate) fn require_int_arg(method: &str, arg: &Value) -> Result<i64, EvalError> {
    match arg {
        Value::Int(n) => Ok(n
            .to_i64()
            .unwrap_or(if n.raw() < 0 { i64::MIN } else { i64::MAX })),
        other => Err(type_mismatch(&other.type_name(), "int").with_context(method)),
    }
}

/// Optional integer argument; `None` counts as absent.
pub(crate) fn optional_int_arg(method: &str, arg: Option<&Value>) -> Result<Option<i64>, EvalError> {
    match arg {
        None | Some(Value::None) => Ok(None),
        Some(value) => require_int_arg(method, value).map(Some),
    }
}
