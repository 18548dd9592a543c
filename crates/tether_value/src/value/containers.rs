//! Mutable script containers: list, dict and set.
//!
//! Each container is a `Shared` handle, so copies of a `Value` alias the same
//! storage and report the same `AggregateId`. Dicts and sets keep insertion
//! order and look keys up by script equality after checking hashability.

use std::fmt;

use crate::errors::{frozen_violation, EvalError};
use crate::shared::{AggregateId, Shared};

use super::Value;

#[derive(Default)]
struct ListData {
    items: Vec<Value>,
    frozen: bool,
}

/// Script list.
#[derive(Clone)]
pub struct List(Shared<ListData>);

impl List {
    pub fn new(items: Vec<Value>) -> Self {
        List(Shared::new(ListData {
            items,
            frozen: false,
        }))
    }

    #[inline]
    pub fn id(&self) -> AggregateId {
        self.0.id()
    }

    pub fn len(&self) -> usize {
        self.0.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().items.get(index).cloned()
    }

    /// Snapshot of the current elements.
    pub fn items(&self) -> Vec<Value> {
        self.0.read().items.clone()
    }

    pub fn append(&self, value: Value) -> Result<(), EvalError> {
        let mut data = self.0.write();
        if data.frozen {
            return Err(frozen_violation("append to", "list"));
        }
        data.items.push(value);
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.0.read().frozen
    }

    pub fn freeze(&self) {
        let items = {
            let mut data = self.0.write();
            if data.frozen {
                return;
            }
            data.frozen = true;
            data.items.clone()
        };
        for item in &items {
            item.freeze();
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "List({})", self.id())
    }
}

#[derive(Default)]
struct DictData {
    entries: Vec<(Value, Value)>,
    frozen: bool,
}

/// Script dict. Iteration order is insertion order.
#[derive(Clone)]
pub struct Dict(Shared<DictData>);

impl Dict {
    pub fn new() -> Self {
        Dict(Shared::new(DictData::default()))
    }

    /// Build a dict, later duplicates overwriting earlier ones.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<Self, EvalError> {
        let dict = Dict::new();
        for (key, value) in entries {
            dict.insert(key, value)?;
        }
        Ok(dict)
    }

    #[inline]
    pub fn id(&self) -> AggregateId {
        self.0.id()
    }

    pub fn len(&self) -> usize {
        self.0.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &Value) -> Result<Option<Value>, EvalError> {
        key.hash()?;
        let data = self.0.read();
        Ok(data
            .entries
            .iter()
            .find(|(k, _)| k.equals(key))
            .map(|(_, v)| v.clone()))
    }

    pub fn insert(&self, key: Value, value: Value) -> Result<(), EvalError> {
        key.hash()?;
        let mut data = self.0.write();
        if data.frozen {
            return Err(frozen_violation("insert into", "dict"));
        }
        match data.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            Some(slot) => slot.1 = value,
            None => data.entries.push((key, value)),
        }
        Ok(())
    }

    /// Snapshot of the current entries in insertion order.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0.read().entries.clone()
    }

    pub fn keys(&self) -> Vec<Value> {
        self.0.read().entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn is_frozen(&self) -> bool {
        self.0.read().frozen
    }

    pub fn freeze(&self) {
        let entries = {
            let mut data = self.0.write();
            if data.frozen {
                return;
            }
            data.frozen = true;
            data.entries.clone()
        };
        for (key, value) in &entries {
            key.freeze();
            value.freeze();
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Default for Dict {
    fn default() -> Self {
        Dict::new()
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dict({})", self.id())
    }
}

#[derive(Default)]
struct SetData {
    items: Vec<Value>,
    frozen: bool,
}

/// Script set. Iteration order is insertion order.
#[derive(Clone)]
pub struct Set(Shared<SetData>);

impl Set {
    pub fn new() -> Self {
        Set(Shared::new(SetData::default()))
    }

    pub fn from_items(items: impl IntoIterator<Item = Value>) -> Result<Self, EvalError> {
        let set = Set::new();
        for item in items {
            set.insert(item)?;
        }
        Ok(set)
    }

    #[inline]
    pub fn id(&self) -> AggregateId {
        self.0.id()
    }

    pub fn len(&self) -> usize {
        self.0.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: &Value) -> Result<bool, EvalError> {
        value.hash()?;
        Ok(self.0.read().items.iter().any(|item| item.equals(value)))
    }

    pub fn insert(&self, value: Value) -> Result<(), EvalError> {
        value.hash()?;
        let mut data = self.0.write();
        if data.frozen {
            return Err(frozen_violation("insert into", "set"));
        }
        if !data.items.iter().any(|item| item.equals(&value)) {
            data.items.push(value);
        }
        Ok(())
    }

    pub fn items(&self) -> Vec<Value> {
        self.0.read().items.clone()
    }

    pub fn is_frozen(&self) -> bool {
        self.0.read().frozen
    }

    pub fn freeze(&self) {
        let mut data = self.0.write();
        // Elements are hashable, hence already immutable.
        data.frozen = true;
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Default for Set {
    fn default() -> Self {
        Set::new()
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Set({})", self.id())
    }
}
