//! Script view of host maps.
//!
//! Keys and values are coerced to the map's declared types on the way in and
//! converted on the way out. Iteration yields the keys of a snapshot, in the
//! host map's own (unspecified) order.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tether_native::{MapRef, NativeType, NativeValue};
use tether_value::{
    frozen_violation, key_not_found, no_such_method, not_assignable, not_hashable, EvalError,
    EvalResult, HasAttrs, Iterable, Mapping, ScriptObject, Value, ValueIter,
};

use crate::coerce::coerce;
use crate::config::WrapCtx;
use crate::dispatch::{freeze_reachable, to_value_in};
use crate::method::{require_args, require_args_between, BuiltinMethod, MethodRecv};

/// Method names, sorted.
pub(crate) const MAP_METHODS: &[&str] = &["clear", "get", "items", "keys", "pop", "values"];

#[derive(Debug)]
struct MapState {
    map: MapRef,
    ctx: WrapCtx,
    frozen: AtomicBool,
}

/// Host map seen from a script.
#[derive(Clone, Debug)]
pub struct MapWrapper(Arc<MapState>);

impl MapWrapper {
    pub(crate) fn new(map: MapRef, ctx: &WrapCtx) -> Self {
        MapWrapper(Arc::new(MapState {
            map,
            ctx: ctx.child(false),
            frozen: AtomicBool::new(ctx.frozen),
        }))
    }

    pub fn map(&self) -> &MapRef {
        &self.0.map
    }

    pub fn to_native(&self) -> NativeValue {
        NativeValue::Map(self.0.map.clone())
    }

    pub fn len(&self) -> usize {
        self.0.map.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    fn types(&self) -> (NativeType, NativeType) {
        let data = self.0.map.read();
        (data.key.clone(), data.value.clone())
    }

    fn child_ctx(&self) -> WrapCtx {
        self.0.ctx.child(self.is_frozen())
    }

    fn convert(&self, native: &NativeValue) -> EvalResult {
        to_value_in(native, None, &self.child_ctx())
    }

    fn check_mutable(&self, action: &str) -> Result<(), EvalError> {
        if self.is_frozen() {
            return Err(frozen_violation(action, "map"));
        }
        Ok(())
    }

    fn coerce_key(&self, key: &Value) -> Result<NativeValue, EvalError> {
        let (key_ty, _) = self.types();
        let native = coerce(key, &key_ty, &self.0.ctx.tag).map_err(|e| e.with_context("key"))?;
        if !native.is_hashable() {
            return Err(not_hashable(&key.type_name()));
        }
        Ok(native)
    }

    /// Value under `key`, `None` if absent.
    pub fn get(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        let key = self.coerce_key(key)?;
        let found = self.0.map.read().entries.get(&key).cloned();
        found.map(|v| self.convert(&v)).transpose()
    }

    pub fn set(&self, key: &Value, value: &Value) -> Result<(), EvalError> {
        self.check_mutable("insert into")?;
        let native_key = self.coerce_key(key)?;
        let (_, val_ty) = self.types();
        let native = coerce(value, &val_ty, &self.0.ctx.tag).map_err(|e| e.with_context("value"))?;
        self.0.map.write().entries.insert(native_key, native);
        Ok(())
    }

    /// Remove `key` and return its value, or `default` when absent.
    pub fn pop(&self, key: &Value, default: Option<&Value>) -> EvalResult {
        self.check_mutable("pop from")?;
        let native_key = self.coerce_key(key)?;
        let removed = self.0.map.write().entries.remove(&native_key);
        match (removed, default) {
            (Some(v), _) => self.convert(&v),
            (None, Some(default)) => Ok(default.clone()),
            (None, None) => Err(key_not_found(&key.to_string()).with_context("pop")),
        }
    }

    pub fn clear(&self) -> Result<(), EvalError> {
        self.check_mutable("clear")?;
        self.0.map.write().entries.clear();
        Ok(())
    }

    fn snapshot(&self) -> Vec<(NativeValue, NativeValue)> {
        self.0
            .map
            .read()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn keys(&self) -> Result<Vec<Value>, EvalError> {
        self.snapshot().iter().map(|(k, _)| self.convert(k)).collect()
    }

    pub fn values(&self) -> Result<Vec<Value>, EvalError> {
        self.snapshot().iter().map(|(_, v)| self.convert(v)).collect()
    }

    /// `(key, value)` tuples.
    pub fn items(&self) -> Result<Vec<Value>, EvalError> {
        self.snapshot()
            .iter()
            .map(|(k, v)| Ok(Value::tuple(vec![self.convert(k)?, self.convert(v)?])))
            .collect()
    }
}

pub(crate) fn call_method(map: &MapWrapper, method: &str, args: &[Value]) -> EvalResult {
    match method {
        "clear" => {
            require_args(method, 0, args)?;
            map.clear()?;
            Ok(Value::None)
        }
        "get" => {
            require_args_between(method, 1, 2, args)?;
            Ok(map
                .get(&args[0])?
                .unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::None)))
        }
        "items" => {
            require_args(method, 0, args)?;
            Ok(Value::list(map.items()?))
        }
        "keys" => {
            require_args(method, 0, args)?;
            Ok(Value::list(map.keys()?))
        }
        "pop" => {
            require_args_between(method, 1, 2, args)?;
            map.pop(&args[0], args.get(1))
        }
        "values" => {
            require_args(method, 0, args)?;
            Ok(Value::list(map.values()?))
        }
        _ => Err(no_such_method(&map.type_name(), method)),
    }
}

impl fmt::Display for MapWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_native())
    }
}

impl ScriptObject for MapWrapper {
    fn type_name(&self) -> String {
        format!("tether_map<{}>", self.to_native().native_type())
    }

    fn freeze(&self) {
        if !self.0.frozen.swap(true, Ordering::AcqRel) {
            freeze_reachable(&self.to_native());
        }
    }

    fn truth(&self) -> bool {
        !self.is_empty()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_attrs(&self) -> Option<&dyn HasAttrs> {
        Some(self)
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }

    fn as_mapping(&self) -> Option<&dyn Mapping> {
        Some(self)
    }
}

impl HasAttrs for MapWrapper {
    fn attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        Ok(MAP_METHODS
            .iter()
            .copied()
            .find(|m| *m == name)
            .map(|m| Value::object(BuiltinMethod::new(m, MethodRecv::Map(self.clone())))))
    }

    fn attr_names(&self) -> Vec<String> {
        MAP_METHODS.iter().map(|m| (*m).to_string()).collect()
    }

    fn set_attr(&self, name: &str, _value: Value) -> Result<(), EvalError> {
        Err(not_assignable(name))
    }
}

impl Mapping for MapWrapper {
    fn get(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        MapWrapper::get(self, key)
    }

    fn set_key(&self, key: &Value, value: Value) -> Result<(), EvalError> {
        self.set(key, &value)
    }

    fn len(&self) -> usize {
        MapWrapper::len(self)
    }
}

impl Iterable for MapWrapper {
    fn iterate(&self) -> ValueIter {
        let keys: Vec<NativeValue> = self.0.map.read().entries.keys().cloned().collect();
        let map = self.clone();
        Box::new(keys.into_iter().map(move |k| map.convert(&k)))
    }
}

#[cfg(test)]
mod tests;
