//! Script view of host structs.
//!
//! A `StructWrapper` names a place: a root cell plus a path of field indexes
//! leading to the struct. Structs reached through a pointer are addressable,
//! so field assignment writes through to the host, and so are their nested
//! struct fields, which share the root and extend the path. A struct passed
//! by value is a detached copy whose fields can be read but not assigned.
//!
//! Attribute lookup tries methods first, then fields exposed under the
//! wrapper's tag.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tether_native::{
    MethodDef, NativePtr, NativeType, NativeValue, Receiver, StructDef, StructObj,
};
use tether_value::{
    attribute_not_found, frozen_violation, not_assignable, stale_reference, EvalError,
    EvalResult, HasAttrs, ScriptObject, Shared, Value,
};

use crate::coerce::coerce;
use crate::config::WrapCtx;
use crate::dispatch::{freeze_reachable, to_value_in};
use crate::function::FunctionWrapper;

#[derive(Clone, Debug)]
struct Place {
    root: Shared<NativeValue>,
    path: Vec<usize>,
    addressable: bool,
    /// Root reached directly through a pointer (`path` is empty).
    pointer: bool,
}

#[derive(Debug)]
struct StructState {
    def: Arc<StructDef>,
    place: Place,
    ctx: WrapCtx,
    frozen: AtomicBool,
}

/// Host struct seen from a script.
#[derive(Clone, Debug)]
pub struct StructWrapper(Arc<StructState>);

impl StructWrapper {
    /// Detached copy of a struct passed by value.
    pub(crate) fn detached(obj: StructObj, ctx: &WrapCtx) -> Self {
        let def = Arc::clone(obj.def());
        let place = Place {
            root: Shared::new(NativeValue::Struct(obj)),
            path: Vec::new(),
            addressable: false,
            pointer: false,
        };
        StructWrapper::with_place(def, place, ctx)
    }

    /// The struct stored in a pointer's cell.
    pub(crate) fn pointer(def: Arc<StructDef>, cell: Shared<NativeValue>, ctx: &WrapCtx) -> Self {
        let place = Place {
            root: cell,
            path: Vec::new(),
            addressable: true,
            pointer: true,
        };
        StructWrapper::with_place(def, place, ctx)
    }

    fn with_place(def: Arc<StructDef>, place: Place, ctx: &WrapCtx) -> Self {
        StructWrapper(Arc::new(StructState {
            def,
            place,
            ctx: ctx.child(false),
            frozen: AtomicBool::new(ctx.frozen),
        }))
    }

    /// Nested struct field sharing this wrapper's root.
    fn field_child(&self, index: usize, def: Arc<StructDef>) -> Self {
        let parent = &self.0.place;
        let mut path = parent.path.clone();
        path.push(index);
        let place = Place {
            root: parent.root.clone(),
            path,
            addressable: parent.addressable,
            pointer: false,
        };
        StructWrapper::with_place(def, place, &self.child_ctx())
    }

    pub fn def(&self) -> &Arc<StructDef> {
        &self.0.def
    }

    pub fn is_addressable(&self) -> bool {
        self.0.place.addressable
    }

    pub fn is_pointer(&self) -> bool {
        self.0.place.pointer
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen.load(Ordering::Acquire)
    }

    fn child_ctx(&self) -> WrapCtx {
        self.0.ctx.child(self.is_frozen())
    }

    /// Copy of the struct as it is now.
    pub fn struct_value(&self) -> Result<StructObj, EvalError> {
        self.with_struct(StructObj::clone)
    }

    /// The host value: a pointer to the root cell for pointer wrappers, a
    /// copy otherwise.
    pub fn to_native(&self) -> Result<NativeValue, EvalError> {
        if self.is_pointer() {
            Ok(NativeValue::Ptr(self.root_ptr()))
        } else {
            self.struct_value().map(NativeValue::Struct)
        }
    }

    fn root_ptr(&self) -> NativePtr {
        NativePtr::from_cell(NativeType::strukt(&self.0.def), self.0.place.root.clone())
    }

    fn with_struct<R>(&self, f: impl FnOnce(&StructObj) -> R) -> Result<R, EvalError> {
        let root = self.0.place.root.read();
        match resolve(&root, &self.0.place.path) {
            Some(obj) => Ok(f(obj)),
            None => Err(stale_reference(&self.type_name())),
        }
    }

    fn with_struct_mut<R>(&self, f: impl FnOnce(&mut StructObj) -> R) -> Result<R, EvalError> {
        let mut root = self.0.place.root.write();
        match resolve_mut(&mut root, &self.0.place.path) {
            Some(obj) => Ok(f(obj)),
            None => Err(stale_reference(&self.type_name())),
        }
    }

    fn method_value(&self, method: &MethodDef) -> EvalResult {
        let receiver = match method.receiver() {
            Receiver::Pointer => NativeValue::Ptr(self.root_ptr()),
            Receiver::Value => NativeValue::Struct(self.struct_value()?),
        };
        let func = method.bind(receiver);
        Ok(Value::object(FunctionWrapper::new(
            method.name(),
            func,
            &self.child_ctx(),
        )))
    }

    fn field_value(&self, index: usize) -> EvalResult {
        let field = self.with_struct(|obj| obj.fields().get(index).cloned())?;
        match field {
            Some(NativeValue::Struct(inner)) => Ok(Value::object(
                self.field_child(index, Arc::clone(inner.def())),
            )),
            Some(other) => to_value_in(&other, None, &self.child_ctx()),
            None => Err(stale_reference(&self.type_name())),
        }
    }

    /// Field `name` as exposed under this wrapper's tag, `None` if hidden or
    /// absent.
    pub fn field(&self, name: &str) -> Result<Option<Value>, EvalError> {
        match self.0.def.exposed_field(name, self.0.ctx.tag.as_str()) {
            Some(index) => self.field_value(index).map(Some),
            None => Ok(None),
        }
    }
}

fn resolve<'a>(mut cur: &'a NativeValue, path: &[usize]) -> Option<&'a StructObj> {
    for &i in path {
        let NativeValue::Struct(obj) = cur else {
            return None;
        };
        cur = obj.fields().get(i)?;
    }
    cur.as_struct()
}

fn resolve_mut<'a>(mut cur: &'a mut NativeValue, path: &[usize]) -> Option<&'a mut StructObj> {
    for &i in path {
        let NativeValue::Struct(obj) = cur else {
            return None;
        };
        cur = obj.fields_mut().get_mut(i)?;
    }
    match cur {
        NativeValue::Struct(obj) => Some(obj),
        _ => None,
    }
}

impl fmt::Display for StructWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_native() {
            Ok(native) => write!(f, "{native}"),
            Err(_) => write!(f, "<stale {}>", self.type_name()),
        }
    }
}

impl ScriptObject for StructWrapper {
    fn type_name(&self) -> String {
        if self.is_pointer() {
            format!("tether_struct<Ref<{}>>", self.0.def.name())
        } else {
            format!("tether_struct<{}>", self.0.def.name())
        }
    }

    fn freeze(&self) {
        if !self.0.frozen.swap(true, Ordering::AcqRel) {
            if let Ok(native) = self.to_native() {
                freeze_reachable(&native);
            }
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_attrs(&self) -> Option<&dyn HasAttrs> {
        Some(self)
    }
}

impl HasAttrs for StructWrapper {
    fn attr(&self, name: &str) -> Result<Option<Value>, EvalError> {
        if let Some(method) = self.0.def.find_method(name, self.is_pointer()) {
            return self.method_value(method).map(Some);
        }
        self.field(name)
    }

    /// Methods, then fields, without duplicates.
    fn attr_names(&self) -> Vec<String> {
        let def = &self.0.def;
        let mut seen = FxHashSet::default();
        def.method_set(self.is_pointer())
            .map(MethodDef::name)
            .chain(def.exposed_fields(self.0.ctx.tag.as_str()).map(|(_, name)| name))
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect()
    }

    fn set_attr(&self, name: &str, value: Value) -> Result<(), EvalError> {
        if self.is_frozen() {
            return Err(frozen_violation("assign to field of", "struct"));
        }
        let Some(index) = self.0.def.exposed_field(name, self.0.ctx.tag.as_str()) else {
            return Err(attribute_not_found(
                &self.type_name(),
                name,
                &self.attr_names(),
            ));
        };
        if !self.is_addressable() {
            return Err(not_assignable(name));
        }
        let ty = self.0.def.fields()[index].ty().clone();
        let native = coerce(&value, &ty, &self.0.ctx.tag).map_err(|e| e.with_context(name))?;
        self.with_struct_mut(|obj| obj.fields_mut()[index] = native)
    }
}

#[cfg(test)]
mod tests;
