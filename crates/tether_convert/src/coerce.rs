//! Script-to-host coercion against a known target type.
//!
//! Resolution order for a target type `T`:
//!
//! 1. `Value` slots take the script value as-is, `Any` slots take whatever
//!    [`from_value`](crate::from_value) produces.
//! 2. `None` becomes the nil of a nullable `T` and is an error otherwise.
//! 3. A host wrapper whose dynamic type is `T` unwraps to its handle.
//! 4. Primitives are range-checked against their declared width.
//! 5. Lists and tuples fill slices and arrays, dicts fill maps, a set fills a
//!    map to `bool`, a value fills a fresh pointer cell, and a script callable
//!    becomes a host function if the signature can report its errors.
//!
//! Anything else is a type mismatch.

use std::sync::Arc;

use tether_native::{
    FuncSig, NativeError, NativeFunc, NativePtr, NativeType, NativeValue,
};
use tether_value::{
    mixed_elements, nested_container, not_callable, not_hashable, not_nullable, type_mismatch,
    EvalError, Heap, ScriptObject, Value,
};

use crate::config::{Converter, Tag, WrapCtx};
use crate::dispatch::{from_value, to_value_in};
use crate::function::FunctionWrapper;
use crate::map::MapWrapper;
use crate::primitive;
use crate::slice::SliceWrapper;
use crate::stack::ensure_sufficient_stack;
use crate::structs::StructWrapper;

impl Converter {
    /// Coerce `value` into a host value of type `ty`.
    pub fn from_value_as(&self, value: &Value, ty: &NativeType) -> Result<NativeValue, EvalError> {
        coerce(value, ty, &self.tag)
    }
}

/// [`Converter::from_value_as`] with the default tag.
pub fn from_value_as(value: &Value, ty: &NativeType) -> Result<NativeValue, EvalError> {
    Converter::new().from_value_as(value, ty)
}

pub(crate) fn coerce(value: &Value, ty: &NativeType, tag: &Tag) -> Result<NativeValue, EvalError> {
    ensure_sufficient_stack(|| coerce_inner(value, ty, tag))
}

fn coerce_inner(value: &Value, ty: &NativeType, tag: &Tag) -> Result<NativeValue, EvalError> {
    match ty {
        NativeType::Value => return Ok(NativeValue::Script(value.clone())),
        NativeType::Any => return Ok(from_value(value)),
        _ => {}
    }

    if let Value::None = value {
        return if ty.is_nullable() {
            Ok(ty.zero_value())
        } else {
            Err(not_nullable(&ty.to_string()))
        };
    }

    if let Value::Object(obj) = value {
        if let Some(native) = unwrap_matching(&**obj, ty)? {
            return Ok(native);
        }
    }

    if let Some(result) = primitive::coerce(value, ty) {
        return result;
    }

    match ty {
        NativeType::Slice(elem) => coerce_seq(value, ty, elem, None, tag),
        NativeType::Array(elem, len) => coerce_seq(value, ty, elem, Some(*len), tag),
        NativeType::Map(key, val) => coerce_map(value, ty, key, val, tag),
        NativeType::Ptr(elem) => {
            let inner = coerce(value, elem, tag)?;
            Ok(NativeValue::Ptr(NativePtr::new((**elem).clone(), inner)))
        }
        NativeType::Func(sig) => adapt_callable(value, ty, sig, tag),
        _ => Err(mismatch(value, ty)),
    }
}

#[cold]
fn mismatch(value: &Value, ty: &NativeType) -> EvalError {
    type_mismatch(&value.type_name(), &ty.to_string())
}

/// Handle behind a host wrapper, if the wrapper's dynamic type is `ty`.
fn unwrap_matching(
    obj: &dyn ScriptObject,
    ty: &NativeType,
) -> Result<Option<NativeValue>, EvalError> {
    let any = obj.as_any();
    if let Some(wrapper) = any.downcast_ref::<StructWrapper>() {
        return match ty {
            NativeType::Struct(def) if Arc::ptr_eq(def, wrapper.def()) => {
                wrapper.struct_value().map(|obj| Some(NativeValue::Struct(obj)))
            }
            NativeType::Ptr(elem) if wrapper.is_pointer() => match &**elem {
                NativeType::Struct(def) if Arc::ptr_eq(def, wrapper.def()) => {
                    wrapper.to_native().map(Some)
                }
                _ => Ok(None),
            },
            _ => Ok(None),
        };
    }
    if let Some(wrapper) = any.downcast_ref::<SliceWrapper>() {
        let native = wrapper.to_native();
        return Ok((native.native_type() == *ty).then_some(native));
    }
    if let Some(wrapper) = any.downcast_ref::<MapWrapper>() {
        let native = wrapper.to_native();
        return Ok((native.native_type() == *ty).then_some(native));
    }
    if let Some(wrapper) = any.downcast_ref::<FunctionWrapper>() {
        let native = NativeValue::Func(wrapper.func().clone());
        return Ok((native.native_type() == *ty).then_some(native));
    }
    Ok(None)
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Bytes(_)
    )
}

fn coerce_seq(
    value: &Value,
    ty: &NativeType,
    elem: &NativeType,
    fixed: Option<usize>,
    tag: &Tag,
) -> Result<NativeValue, EvalError> {
    let items = match value {
        Value::List(list) => list.items(),
        Value::Tuple(items) => items.to_vec(),
        // A lone scalar fills a one-element slice.
        scalar if fixed.is_none() && is_scalar(scalar) => vec![scalar.clone()],
        _ => return Err(mismatch(value, ty)),
    };
    if let Some(len) = fixed {
        if items.len() != len {
            return Err(mismatch(value, ty)
                .with_note(format!("expected {len} elements, got {}", items.len())));
        }
    }
    check_elements(value, ty, elem, &items)?;

    let natives = items
        .iter()
        .map(|item| coerce(item, elem, tag))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match fixed {
        Some(_) => NativeValue::array(elem.clone(), natives),
        None => NativeValue::slice(elem.clone(), natives),
    })
}

/// Nested script containers only go into `Value` elements, and an `Any`
/// element type takes elements of a single script type.
fn check_elements(
    value: &Value,
    ty: &NativeType,
    elem: &NativeType,
    items: &[Value],
) -> Result<(), EvalError> {
    if matches!(elem, NativeType::Value) {
        return Ok(());
    }
    if items.iter().any(Value::is_container) {
        return Err(nested_container(&value.type_name(), &ty.to_string()));
    }
    if matches!(elem, NativeType::Any) {
        if let Some(first) = items.first() {
            let kind = first.type_name();
            if items.iter().any(|item| item.type_name() != kind) {
                return Err(mixed_elements(&value.type_name(), &ty.to_string()));
            }
        }
    }
    Ok(())
}

fn coerce_map(
    value: &Value,
    ty: &NativeType,
    key_ty: &NativeType,
    val_ty: &NativeType,
    tag: &Tag,
) -> Result<NativeValue, EvalError> {
    let entries: Vec<(Value, Value)> = match value {
        Value::Dict(dict) => dict.entries(),
        Value::Set(set) if matches!(val_ty, NativeType::Bool) => set
            .items()
            .into_iter()
            .map(|item| (item, Value::Bool(true)))
            .collect(),
        _ => return Err(mismatch(value, ty)),
    };
    if !matches!(val_ty, NativeType::Value) && entries.iter().any(|(_, v)| v.is_container()) {
        return Err(nested_container(&value.type_name(), &ty.to_string()));
    }

    let mut out = Vec::with_capacity(entries.len());
    for (key, val) in &entries {
        let native_key = coerce(key, key_ty, tag)?;
        if !native_key.is_hashable() {
            return Err(not_hashable(&key.type_name()));
        }
        out.push((native_key, coerce(val, val_ty, tag)?));
    }
    Ok(NativeValue::map(key_ty.clone(), val_ty.clone(), out))
}

/// Host function that calls back into a script callable.
///
/// The signature must end in `Error`: a script failure inside the callback
/// comes back to the host as that error, with every other result zeroed.
fn adapt_callable(
    value: &Value,
    ty: &NativeType,
    sig: &Arc<FuncSig>,
    tag: &Tag,
) -> Result<NativeValue, EvalError> {
    let Value::Object(callee) = value else {
        return Err(mismatch(value, ty));
    };
    if callee.as_callable().is_none() {
        return Err(mismatch(value, ty));
    }
    if !sig.returns_error() {
        return Err(mismatch(value, ty).with_note("callbacks must return Error as their last result"));
    }

    let callee = callee.clone();
    let sig_for_call = Arc::clone(sig);
    let tag = tag.clone();
    let func = NativeFunc::new((**sig).clone(), move |args| {
        call_script(&callee, &sig_for_call, &tag, &args)
    });
    Ok(NativeValue::Func(func))
}

fn call_script(
    callee: &Heap<dyn ScriptObject>,
    sig: &FuncSig,
    tag: &Tag,
    args: &[NativeValue],
) -> Vec<NativeValue> {
    let plain = &sig.results[..sig.results.len().saturating_sub(1)];
    match run_callback(callee, plain, tag, args) {
        Ok(mut results) => {
            results.push(NativeValue::Nil);
            results
        }
        Err(err) => {
            tracing::debug!(error = %err, "script callback failed");
            let mut results: Vec<NativeValue> = plain.iter().map(NativeType::zero_value).collect();
            results.push(NativeValue::Error(NativeError::msg(err.message)));
            results
        }
    }
}

fn run_callback(
    callee: &Heap<dyn ScriptObject>,
    results: &[NativeType],
    tag: &Tag,
    args: &[NativeValue],
) -> Result<Vec<NativeValue>, EvalError> {
    let ctx = WrapCtx {
        tag: tag.clone(),
        frozen: false,
    };
    let args = args
        .iter()
        .map(|arg| to_value_in(arg, None, &ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let callable = callee
        .as_callable()
        .ok_or_else(|| not_callable(&callee.type_name()))?;
    let result = callable.call(&args, &[])?;

    match results {
        [] => Ok(Vec::new()),
        [one] => Ok(vec![coerce(&result, one, tag)?]),
        many => {
            let Value::Tuple(items) = &result else {
                return Err(type_mismatch(&result.type_name(), "tuple"));
            };
            if items.len() != many.len() {
                return Err(EvalError::new(format!(
                    "callback returned {} values, want {}",
                    items.len(),
                    many.len()
                )));
            }
            items
                .iter()
                .zip(many)
                .map(|(item, ty)| coerce(item, ty, tag))
                .collect()
        }
    }
}
