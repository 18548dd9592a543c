//! Script values.
//!
//! `Value` is the model a script runtime evaluates over. Scalars are stored
//! inline, immutable payloads behind `Heap<T>`, mutable containers behind
//! `Shared` handles, and everything backed by host data as a
//! `Value::Object` holding a `dyn ScriptObject`.
//!
//! Heap payloads are only constructed through the factory methods on
//! `Value`; `Heap::new` is crate-private.

mod containers;
mod int;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::errors::{not_hashable, not_iterable, EvalError};
use crate::heap::Heap;
use crate::object::{ScriptObject, ValueIter};
use crate::shared::display_guard;

pub use containers::{Dict, List, Set};
pub use int::Int;

/// Runtime value of a script.
#[derive(Clone, Debug)]
pub enum Value {
    None,
    Bool(bool),
    Int(Int),
    Float(f64),
    Str(Heap<String>),
    Bytes(Heap<Vec<u8>>),
    List(List),
    Tuple(Heap<Vec<Value>>),
    Dict(Dict),
    Set(Set),
    /// Host-backed value driven through capability traits.
    Object(Heap<dyn ScriptObject>),
}

impl Value {
    #[inline]
    pub fn int(n: impl Into<Int>) -> Self {
        Value::Int(n.into())
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(Heap::new(b.into()))
    }

    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(List::new(items))
    }

    #[inline]
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Heap::new(items))
    }

    /// Dict from entries. Fails if a key is unhashable.
    pub fn dict(entries: impl IntoIterator<Item = (Value, Value)>) -> Result<Self, EvalError> {
        Dict::from_entries(entries).map(Value::Dict)
    }

    /// Set from items. Fails if an item is unhashable.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Result<Self, EvalError> {
        Set::from_items(items).map(Value::Set)
    }

    pub fn object<T: ScriptObject>(obj: T) -> Self {
        let obj: Arc<dyn ScriptObject> = Arc::new(obj);
        Value::Object(Heap::from_arc(obj))
    }

    /// Script-visible type name.
    pub fn type_name(&self) -> Cow<'static, str> {
        match self {
            Value::None => Cow::Borrowed("NoneType"),
            Value::Bool(_) => Cow::Borrowed("bool"),
            Value::Int(_) => Cow::Borrowed("int"),
            Value::Float(_) => Cow::Borrowed("float"),
            Value::Str(_) => Cow::Borrowed("string"),
            Value::Bytes(_) => Cow::Borrowed("bytes"),
            Value::List(_) => Cow::Borrowed("list"),
            Value::Tuple(_) => Cow::Borrowed("tuple"),
            Value::Dict(_) => Cow::Borrowed("dict"),
            Value::Set(_) => Cow::Borrowed("set"),
            Value::Object(obj) => Cow::Owned(obj.type_name()),
        }
    }

    pub fn truth(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => !n.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(d) => !d.is_empty(),
            Value::Set(s) => !s.is_empty(),
            Value::Object(obj) => obj.truth(),
        }
    }

    /// Make this value and everything it owns immutable.
    pub fn freeze(&self) {
        match self {
            Value::List(l) => l.freeze(),
            Value::Dict(d) => d.freeze(),
            Value::Set(s) => s.freeze(),
            Value::Tuple(items) => items.iter().for_each(Value::freeze),
            Value::Object(obj) => obj.freeze(),
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Bytes(_) => {}
        }
    }

    /// Script hash. Mutable containers are unhashable.
    pub fn hash(&self) -> Result<u32, EvalError> {
        let mut hasher = FxHasher::default();
        match self {
            Value::None => 0u8.hash(&mut hasher),
            Value::Bool(b) => b.hash(&mut hasher),
            Value::Int(n) => n.hash(&mut hasher),
            // Integral floats hash like the equal int.
            Value::Float(f) => match float_as_int(*f) {
                Some(n) => n.hash(&mut hasher),
                None => f.to_bits().hash(&mut hasher),
            },
            Value::Str(s) => s.hash(&mut hasher),
            Value::Bytes(b) => b.hash(&mut hasher),
            Value::Tuple(items) => {
                for item in items.iter() {
                    item.hash()?.hash(&mut hasher);
                }
            }
            Value::List(_) | Value::Dict(_) | Value::Set(_) => {
                return Err(not_hashable(&self.type_name()));
            }
            Value::Object(obj) => return ScriptObject::hash(&**obj),
        }
        #[allow(clippy::cast_possible_truncation, reason = "script hashes are 32-bit")]
        let hash = hasher.finish() as u32;
        Ok(hash)
    }

    /// Script equality: structural for data, identity for host objects.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                float_as_int(*b) == Some(*a)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::List(a), Value::List(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.items(), b.items());
                a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.equals(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                a.len() == b.len()
                    && a.entries()
                        .iter()
                        .all(|(k, v)| matches!(b.get(k), Ok(Some(other)) if other.equals(v)))
            }
            (Value::Set(a), Value::Set(b)) => {
                a.ptr_eq(b)
                    || (a.len() == b.len()
                        && a.items().iter().all(|item| b.contains(item).unwrap_or(false)))
            }
            (Value::Object(a), Value::Object(b)) => Heap::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Element sequence for `for x in value`. Dicts iterate their keys.
    pub fn iterate(&self) -> Result<ValueIter, EvalError> {
        let items = match self {
            Value::List(l) => l.items(),
            Value::Tuple(items) => items.to_vec(),
            Value::Dict(d) => d.keys(),
            Value::Set(s) => s.items(),
            Value::Object(obj) => {
                return obj
                    .as_iterable()
                    .map(|it| it.iterate())
                    .ok_or_else(|| not_iterable(self));
            }
            _ => return Err(not_iterable(self)),
        };
        Ok(Box::new(items.into_iter().map(Ok)))
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.len()),
            Value::Bytes(b) => Some(b.len()),
            Value::List(l) => Some(l.len()),
            Value::Tuple(items) => Some(items.len()),
            Value::Dict(d) => Some(d.len()),
            Value::Set(s) => Some(s.len()),
            Value::Object(obj) => obj
                .as_indexable()
                .map(|ix| ix.len())
                .or_else(|| obj.as_mapping().map(|m| m.len())),
            _ => None,
        }
    }

    /// Script containers, as opposed to scalars and host objects.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Tuple(_) | Value::Dict(_) | Value::Set(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<Int> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn ScriptObject> {
        match self {
            Value::Object(obj) => Some(&**obj),
            _ => None,
        }
    }

    /// Concrete host object behind a `Value::Object`, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object()?.as_any().downcast_ref::<T>()
    }
}

fn float_as_int(f: f64) -> Option<Int> {
    #[allow(clippy::cast_possible_truncation, reason = "checked by the round trip")]
    let n = f as i128;
    #[allow(clippy::cast_precision_loss, reason = "checked by the round trip")]
    let exact = f.is_finite() && n as f64 == f;
    exact.then(|| Int::new(n))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{:?}", s.as_str()),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(l) => display_guard(l.id(), || {
                write!(f, "[")?;
                write_seq(f, &l.items())?;
                write!(f, "]")
            })
            .unwrap_or_else(|| write!(f, "[...]")),
            Value::Dict(d) => display_guard(d.id(), || {
                write!(f, "{{")?;
                for (i, (k, v)) in d.entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            })
            .unwrap_or_else(|| write!(f, "{{...}}")),
            Value::Set(s) => {
                write!(f, "set([")?;
                write_seq(f, &s.items())?;
                write!(f, "])")
            }
            Value::Object(obj) => write!(f, "{}", &**obj),
        }
    }
}
