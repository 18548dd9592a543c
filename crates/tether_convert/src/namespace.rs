//! Namespaces and script-side container construction.
//!
//! A namespace is the string-keyed mapping handed to a script runtime as its
//! predeclared globals, and returned by it as the script's globals after
//! execution. Building one is all-or-nothing: the first entry that fails to
//! convert fails the whole call, with the entry's name as context.

use rustc_hash::FxHashMap;
use tether_native::NativeValue;
use tether_value::{type_mismatch, Dict, EvalError, EvalResult, Value};

use crate::config::Converter;
use crate::dispatch::{from_value, to_value_in};

/// Script globals by name.
pub type Namespace = FxHashMap<String, Value>;

/// One keyword argument of a script call, converted to a host value.
#[derive(Clone, Debug, PartialEq)]
pub struct Kwarg {
    pub name: String,
    pub value: NativeValue,
}

impl Converter {
    /// Convert every `(name, value)` pair. Function values are named after
    /// their entry.
    #[tracing::instrument(level = "debug", skip_all, fields(tag = %self.tag))]
    pub fn make_namespace<K: Into<String>>(
        &self,
        natives: impl IntoIterator<Item = (K, NativeValue)>,
    ) -> Result<Namespace, EvalError> {
        let ctx = self.ctx();
        let mut namespace = Namespace::default();
        for (name, native) in natives {
            let name = name.into();
            let value = to_value_in(&native, Some(&name), &ctx).map_err(|e| e.with_context(&name))?;
            namespace.insert(name, value);
        }
        tracing::debug!(entries = namespace.len(), "namespace built");
        Ok(namespace)
    }

    /// Script list holding converted copies of `items`' handles.
    pub fn make_list(&self, items: &[NativeValue]) -> EvalResult {
        self.convert_all(items).map(Value::list)
    }

    pub fn make_tuple(&self, items: &[NativeValue]) -> EvalResult {
        self.convert_all(items).map(Value::tuple)
    }

    pub fn make_dict(
        &self,
        entries: impl IntoIterator<Item = (NativeValue, NativeValue)>,
    ) -> EvalResult {
        let ctx = self.ctx();
        let entries = entries
            .into_iter()
            .map(|(k, v)| Ok((to_value_in(&k, None, &ctx)?, to_value_in(&v, None, &ctx)?)))
            .collect::<Result<Vec<_>, EvalError>>()?;
        Value::dict(entries)
    }

    /// Fails if an element is unhashable.
    pub fn make_set(&self, items: &[NativeValue]) -> EvalResult {
        Value::set(self.convert_all(items)?)
    }

    fn convert_all(&self, items: &[NativeValue]) -> Result<Vec<Value>, EvalError> {
        let ctx = self.ctx();
        items.iter().map(|item| to_value_in(item, None, &ctx)).collect()
    }
}

/// [`Converter::make_namespace`] under `tag`; an empty tag means the default.
pub fn make_namespace<K: Into<String>>(
    natives: impl IntoIterator<Item = (K, NativeValue)>,
    tag: &str,
) -> Result<Namespace, EvalError> {
    Converter::with_tag(tag).make_namespace(natives)
}

/// Host values for every global of a namespace.
pub fn from_namespace(namespace: &Namespace) -> FxHashMap<String, NativeValue> {
    namespace
        .iter()
        .map(|(name, value)| (name.clone(), from_value(value)))
        .collect()
}

/// Host values for a string-keyed script dict. Fails on a non-string key.
pub fn from_string_dict(dict: &Dict) -> Result<FxHashMap<String, NativeValue>, EvalError> {
    dict.entries()
        .into_iter()
        .map(|(key, value)| match key.as_str() {
            Some(name) => Ok((name.to_string(), from_value(&value))),
            None => Err(type_mismatch(&key.type_name(), "string").with_context("dict key")),
        })
        .collect()
}

/// Keyword arguments as host values, in call order.
pub fn from_kwargs(kwargs: &[(String, Value)]) -> Vec<Kwarg> {
    kwargs
        .iter()
        .map(|(name, value)| Kwarg {
            name: name.clone(),
            value: from_value(value),
        })
        .collect()
}
