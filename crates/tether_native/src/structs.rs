//! Struct registration.
//!
//! A `StructDef` is the declarative description of a host record type: its
//! fields in declaration order, the per-field tag table that decides how a
//! field is named on the script side, and its methods. Tags are parsed once,
//! when the definition is built.
//!
//! # Tags
//!
//! A tag value is a comma-separated list whose first segment names the field
//! for that tag key. An empty first segment keeps the field's own name, and
//! `-` hides the field. The remaining segments are options.
//!
//! ```text
//! StructDef::builder("Contact")
//!     .field_with_tags("Phone", NativeType::Str, &[("script", "phone,omitempty")])
//!     .field_with_tags("Secret", NativeType::Str, &[("script", "-")])
//!     .build();
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::func::{FuncSig, NativeFunc};
use crate::types::NativeType;
use crate::value::NativeValue;

/// One parsed `key:"value"` entry of a field's tag table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagEntry {
    key: String,
    alias: Option<String>,
    omit: bool,
    options: Vec<String>,
}

impl TagEntry {
    pub fn parse(key: &str, raw: &str) -> Self {
        let mut segments = raw.split(',');
        let first = segments.next().unwrap_or_default();
        let omit = first == "-";
        TagEntry {
            key: key.to_string(),
            alias: (!omit && !first.is_empty()).then(|| first.to_string()),
            omit,
            options: segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn is_omitted(&self) -> bool {
        self.omit
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

#[derive(Clone, Debug)]
pub struct FieldDef {
    name: String,
    ty: NativeType,
    exported: bool,
    tags: Vec<TagEntry>,
}

impl FieldDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &NativeType {
        &self.ty
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn tag(&self, key: &str) -> Option<&TagEntry> {
        self.tags.iter().find(|t| t.key == key)
    }

    /// Script-side name under `tag`, or `None` if the field is hidden.
    pub fn exposed_name(&self, tag: &str) -> Option<&str> {
        if !self.exported {
            return None;
        }
        match self.tag(tag) {
            Some(entry) if entry.omit => None,
            Some(entry) => Some(entry.alias().unwrap_or(&self.name)),
            None => Some(&self.name),
        }
    }
}

/// Whether a method needs the struct's address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Receiver {
    Value,
    Pointer,
}

type MethodBody = dyn Fn(&NativeValue, Vec<NativeValue>) -> Vec<NativeValue> + Send + Sync;

/// A method. Its signature excludes the receiver.
#[derive(Clone)]
pub struct MethodDef {
    name: String,
    receiver: Receiver,
    exported: bool,
    sig: FuncSig,
    body: Arc<MethodBody>,
}

impl MethodDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn sig(&self) -> &FuncSig {
        &self.sig
    }

    /// A function value with `receiver` fixed.
    ///
    /// `receiver` is a `Ptr` for pointer methods and the struct itself for
    /// value methods.
    pub fn bind(&self, receiver: NativeValue) -> NativeFunc {
        let body = Arc::clone(&self.body);
        NativeFunc::new(self.sig.clone(), move |args| body(&receiver, args))
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("receiver", &self.receiver)
            .field("exported", &self.exported)
            .field("sig", &self.sig)
            .finish_non_exhaustive()
    }
}

/// Registered host record type.
#[derive(Debug)]
pub struct StructDef {
    name: String,
    fields: Vec<FieldDef>,
    /// Sorted by name.
    methods: Vec<MethodDef>,
}

impl StructDef {
    pub fn builder(name: impl Into<String>) -> StructDefBuilder {
        StructDefBuilder {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    /// Index of the field declared as `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Fields visible under `tag`, as `(index, exposed name)` in declaration order.
    pub fn exposed_fields<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = (usize, &'a str)> {
        self.fields
            .iter()
            .enumerate()
            .filter_map(move |(i, f)| f.exposed_name(tag).map(|name| (i, name)))
    }

    /// Index of the field exposed as `exposed` under `tag`.
    pub fn exposed_field(&self, exposed: &str, tag: &str) -> Option<usize> {
        self.exposed_fields(tag)
            .find(|(_, name)| *name == exposed)
            .map(|(i, _)| i)
    }

    /// Exported methods callable through a value (`pointer == false`) or
    /// through a pointer, which also reaches pointer-receiver methods.
    pub fn method_set(&self, pointer: bool) -> impl Iterator<Item = &MethodDef> {
        self.methods
            .iter()
            .filter(move |m| m.exported && (pointer || m.receiver == Receiver::Value))
    }

    pub fn find_method(&self, name: &str, pointer: bool) -> Option<&MethodDef> {
        self.method_set(pointer).find(|m| m.name == name)
    }
}

pub struct StructDefBuilder {
    name: String,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
}

impl StructDefBuilder {
    #[must_use]
    pub fn field(self, name: &str, ty: NativeType) -> Self {
        self.field_with_tags(name, ty, &[])
    }

    /// Exported field with tag entries given as `(key, value)` pairs.
    #[must_use]
    pub fn field_with_tags(mut self, name: &str, ty: NativeType, tags: &[(&str, &str)]) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            exported: true,
            tags: tags
                .iter()
                .map(|(key, raw)| TagEntry::parse(key, raw))
                .collect(),
        });
        self
    }

    /// Field that is never visible to scripts.
    #[must_use]
    pub fn private_field(mut self, name: &str, ty: NativeType) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            exported: false,
            tags: Vec::new(),
        });
        self
    }

    #[must_use]
    pub fn method(
        self,
        name: &str,
        sig: FuncSig,
        body: impl Fn(&NativeValue, Vec<NativeValue>) -> Vec<NativeValue> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(name, Receiver::Value, true, sig, Arc::new(body))
    }

    /// Method that receives a `NativeValue::Ptr` to the struct.
    #[must_use]
    pub fn ptr_method(
        self,
        name: &str,
        sig: FuncSig,
        body: impl Fn(&NativeValue, Vec<NativeValue>) -> Vec<NativeValue> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(name, Receiver::Pointer, true, sig, Arc::new(body))
    }

    #[must_use]
    pub fn private_method(
        self,
        name: &str,
        sig: FuncSig,
        body: impl Fn(&NativeValue, Vec<NativeValue>) -> Vec<NativeValue> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(name, Receiver::Value, false, sig, Arc::new(body))
    }

    fn push_method(
        mut self,
        name: &str,
        receiver: Receiver,
        exported: bool,
        sig: FuncSig,
        body: Arc<MethodBody>,
    ) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            receiver,
            exported,
            sig,
            body,
        });
        self
    }

    pub fn build(mut self) -> Arc<StructDef> {
        self.methods.sort_by(|a, b| a.name.cmp(&b.name));
        Arc::new(StructDef {
            name: self.name,
            fields: self.fields,
            methods: self.methods,
        })
    }
}

/// A struct value: a definition plus one value per declared field.
#[derive(Clone, Debug)]
pub struct StructObj {
    def: Arc<StructDef>,
    fields: Vec<NativeValue>,
}

impl StructObj {
    /// Panics if `fields` does not have one entry per declared field.
    #[track_caller]
    pub fn new(def: &Arc<StructDef>, fields: Vec<NativeValue>) -> Self {
        assert_eq!(
            fields.len(),
            def.fields.len(),
            "struct {} has {} fields",
            def.name,
            def.fields.len()
        );
        StructObj {
            def: Arc::clone(def),
            fields,
        }
    }

    pub fn zeroed(def: &Arc<StructDef>) -> Self {
        StructObj {
            def: Arc::clone(def),
            fields: def.fields.iter().map(|f| f.ty.zero_value()).collect(),
        }
    }

    /// Builder-style setter by declared field name. Panics on unknown names.
    #[must_use]
    #[track_caller]
    pub fn with(mut self, name: &str, value: impl Into<NativeValue>) -> Self {
        let Some(index) = self.def.field_index(name) else {
            panic!("struct {} has no field {name}", self.def.name);
        };
        self.fields[index] = value.into();
        self
    }

    pub fn def(&self) -> &Arc<StructDef> {
        &self.def
    }

    pub fn fields(&self) -> &[NativeValue] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [NativeValue] {
        &mut self.fields
    }

    /// Field by declared name.
    pub fn get(&self, name: &str) -> Option<&NativeValue> {
        self.fields.get(self.def.field_index(name)?)
    }
}

impl PartialEq for StructObj {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.def, &other.def) && self.fields == other.fields
    }
}

impl Eq for StructObj {}

impl Hash for StructObj {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.def.name.hash(state);
        self.fields.hash(state);
    }
}

#[cfg(test)]
mod tests;
