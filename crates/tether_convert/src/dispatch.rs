//! Top-level conversion in both directions.
//!
//! Host to script ([`to_value`]) dispatches on the host value's kind:
//! primitives are copied, aggregates are wrapped without copying, nil (and
//! nil pointers) become `None`, errors become their message string, and
//! channels and opaque handles are rejected.
//!
//! Script to host ([`from_value`]) works without a target type: containers
//! become `Vec<dyn Any>` and `HashMap<dyn Any, dyn Any>`, host wrappers give
//! back the handle they wrap, and any other object is passed through as
//! `NativeValue::Script`. A container met again while it is still being
//! converted is replaced by nil.

use rustc_hash::FxHashSet;
use tether_native::{NativePtr, NativeType, NativeValue};
use tether_value::{unsupported_type, AggregateId, EvalResult, ScriptObject, Value};

use crate::config::{Converter, WrapCtx};
use crate::function::{FunctionWrapper, ANONYMOUS};
use crate::guard::{RecursionGuard, VisitScope};
use crate::map::MapWrapper;
use crate::primitive;
use crate::slice::SliceWrapper;
use crate::stack::ensure_sufficient_stack;
use crate::structs::StructWrapper;

impl Converter {
    /// Script value for `native`.
    pub fn to_value(&self, native: &NativeValue) -> EvalResult {
        to_value_in(native, None, &self.ctx())
    }

    /// Like [`Converter::to_value`], naming a function value `name`.
    pub fn to_value_named(&self, name: &str, native: &NativeValue) -> EvalResult {
        to_value_in(native, Some(name), &self.ctx())
    }
}

/// [`Converter::to_value`] with the default tag.
pub fn to_value(native: &NativeValue) -> EvalResult {
    Converter::new().to_value(native)
}

pub fn to_value_with_tag(native: &NativeValue, tag: &str) -> EvalResult {
    Converter::with_tag(tag).to_value(native)
}

/// Host value for `value`, with no target type.
pub fn from_value(value: &Value) -> NativeValue {
    let scope = RecursionGuard::global().scope();
    from_value_in(value, &scope)
}

pub(crate) fn to_value_in(native: &NativeValue, name: Option<&str>, ctx: &WrapCtx) -> EvalResult {
    ensure_sufficient_stack(|| match native {
        NativeValue::Nil => Ok(Value::None),
        NativeValue::Bool(_)
        | NativeValue::Int(..)
        | NativeValue::Uint(..)
        | NativeValue::Float(..)
        | NativeValue::Str(_)
        | NativeValue::Bytes(_) => primitive::encode(native)
            .ok_or_else(|| unsupported_type(&native.native_type().to_string())),
        NativeValue::Script(value) => Ok(value.clone()),
        NativeValue::Ptr(ptr) => deref_pointer(ptr, name, ctx),
        NativeValue::Slice(seq) => Ok(Value::object(SliceWrapper::new(seq.clone(), false, ctx))),
        NativeValue::Array(seq) => Ok(Value::object(SliceWrapper::new(seq.clone(), true, ctx))),
        NativeValue::Map(map) => Ok(Value::object(MapWrapper::new(map.clone(), ctx))),
        NativeValue::Struct(obj) => Ok(Value::object(StructWrapper::detached(obj.clone(), ctx))),
        NativeValue::Func(func) => Ok(Value::object(FunctionWrapper::new(
            name.unwrap_or(ANONYMOUS),
            func.clone(),
            ctx,
        ))),
        NativeValue::Error(err) => Ok(Value::string(err.message())),
        NativeValue::Chan(_) | NativeValue::Opaque(_) => {
            let ty = native.native_type();
            tracing::debug!(%ty, "no script representation");
            Err(unsupported_type(&ty.to_string()))
        }
    })
}

/// Nil pointers become `None`. A pointer to a struct becomes an addressable
/// wrapper over the pointer's cell; any other pointee is converted by value.
fn deref_pointer(ptr: &NativePtr, name: Option<&str>, ctx: &WrapCtx) -> EvalResult {
    let Some(cell) = ptr.cell() else {
        return Ok(Value::None);
    };
    let target = cell.read().clone();
    match target {
        NativeValue::Struct(obj) => Ok(Value::object(StructWrapper::pointer(
            obj.def().clone(),
            cell.clone(),
            ctx,
        ))),
        other => to_value_in(&other, name, ctx),
    }
}

pub(crate) fn from_value_in(value: &Value, scope: &VisitScope<'_>) -> NativeValue {
    ensure_sufficient_stack(|| match value {
        Value::None => NativeValue::Nil,
        Value::List(list) => guarded(scope, list.id(), || {
            let items = list.items().iter().map(|v| from_value_in(v, scope)).collect();
            NativeValue::slice(NativeType::Any, items)
        }),
        Value::Tuple(items) => NativeValue::slice(
            NativeType::Any,
            items.iter().map(|v| from_value_in(v, scope)).collect(),
        ),
        Value::Dict(dict) => guarded(scope, dict.id(), || {
            let entries = dict
                .entries()
                .iter()
                .map(|(k, v)| (from_value_in(k, scope), from_value_in(v, scope)))
                .collect::<Vec<_>>();
            NativeValue::map(NativeType::Any, NativeType::Any, entries)
        }),
        Value::Set(set) => guarded(scope, set.id(), || {
            let entries = set
                .items()
                .iter()
                .map(|v| (from_value_in(v, scope), NativeValue::Bool(true)))
                .collect::<Vec<_>>();
            NativeValue::map(NativeType::Any, NativeType::Bool, entries)
        }),
        Value::Object(obj) => unwrap_object(&**obj).unwrap_or_else(|| NativeValue::Script(value.clone())),
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Bytes(_) => {
            primitive::decode(value).unwrap_or(NativeValue::Nil)
        }
    })
}

fn guarded(
    scope: &VisitScope<'_>,
    id: AggregateId,
    build: impl FnOnce() -> NativeValue,
) -> NativeValue {
    match scope.enter(id) {
        Some(_visit) => build(),
        None => {
            tracing::debug!(container = %id, "cycle detected, substituting nil");
            NativeValue::Nil
        }
    }
}

/// Handle behind one of this crate's wrappers.
pub(crate) fn unwrap_object(obj: &dyn ScriptObject) -> Option<NativeValue> {
    let any = obj.as_any();
    if let Some(wrapper) = any.downcast_ref::<SliceWrapper>() {
        return Some(wrapper.to_native());
    }
    if let Some(wrapper) = any.downcast_ref::<MapWrapper>() {
        return Some(wrapper.to_native());
    }
    if let Some(wrapper) = any.downcast_ref::<StructWrapper>() {
        return wrapper.to_native().ok();
    }
    if let Some(wrapper) = any.downcast_ref::<FunctionWrapper>() {
        return Some(NativeValue::Func(wrapper.func().clone()));
    }
    None
}

/// Freeze every script value reachable from `native`.
pub(crate) fn freeze_reachable(native: &NativeValue) {
    let mut seen = FxHashSet::default();
    freeze_walk(native, &mut seen);
}

fn freeze_walk(native: &NativeValue, seen: &mut FxHashSet<AggregateId>) {
    ensure_sufficient_stack(|| match native {
        NativeValue::Script(value) => value.freeze(),
        NativeValue::Slice(seq) | NativeValue::Array(seq) => {
            if seen.insert(seq.id()) {
                let items = seq.read().items.clone();
                for item in &items {
                    freeze_walk(item, seen);
                }
            }
        }
        NativeValue::Map(map) => {
            if seen.insert(map.id()) {
                let entries: Vec<_> = map
                    .read()
                    .entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                for (k, v) in &entries {
                    freeze_walk(k, seen);
                    freeze_walk(v, seen);
                }
            }
        }
        NativeValue::Struct(obj) => {
            for field in obj.fields() {
                freeze_walk(field, seen);
            }
        }
        NativeValue::Ptr(ptr) => {
            if let Some(cell) = ptr.cell() {
                if seen.insert(cell.id()) {
                    let inner = cell.read().clone();
                    freeze_walk(&inner, seen);
                }
            }
        }
        _ => {}
    });
}

#[cfg(test)]
mod tests;
