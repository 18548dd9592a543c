//! Dynamic host values.
//!
//! Slices, arrays and maps are always held through `Shared` handles, and so
//! are the cells behind pointers: cloning a `NativeValue` never copies an
//! aggregate's storage. Struct values are plain copies; only a struct behind
//! a pointer can be changed in place.
//!
//! Equality and hashing are strict: aggregates and functions compare by
//! identity, floats by bit pattern. [`NativeValue::same_value`] is the looser
//! comparison search operations use.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tether_value::{display_guard, Shared, Value};

use crate::func::NativeFunc;
use crate::structs::StructObj;
use crate::types::{FloatKind, IntKind, NativeType, UintKind};

/// Backing storage of a slice or array.
#[derive(Debug)]
pub struct SeqData {
    pub elem: NativeType,
    pub items: Vec<NativeValue>,
}

pub type SeqRef = Shared<SeqData>;

/// Backing storage of a map.
#[derive(Debug)]
pub struct MapData {
    pub key: NativeType,
    pub value: NativeType,
    pub entries: FxHashMap<NativeValue, NativeValue>,
}

pub type MapRef = Shared<MapData>;

/// Pointer: a typed, possibly nil, shared cell.
#[derive(Clone, Debug)]
pub struct NativePtr {
    elem: NativeType,
    cell: Option<Shared<NativeValue>>,
}

impl NativePtr {
    pub fn new(elem: NativeType, value: NativeValue) -> Self {
        NativePtr {
            elem,
            cell: Some(Shared::new(value)),
        }
    }

    pub fn nil(elem: NativeType) -> Self {
        NativePtr { elem, cell: None }
    }

    /// Pointer to an existing cell.
    pub fn from_cell(elem: NativeType, cell: Shared<NativeValue>) -> Self {
        NativePtr {
            elem,
            cell: Some(cell),
        }
    }

    pub fn elem(&self) -> &NativeType {
        &self.elem
    }

    pub fn cell(&self) -> Option<&Shared<NativeValue>> {
        self.cell.as_ref()
    }

    pub fn is_nil(&self) -> bool {
        self.cell.is_none()
    }

    /// Copy of the pointee.
    pub fn load(&self) -> Option<NativeValue> {
        self.cell.as_ref().map(|cell| cell.read().clone())
    }

    /// Replace the pointee, returning the previous value. No-op on nil.
    pub fn store(&self, value: NativeValue) -> Option<NativeValue> {
        self.cell
            .as_ref()
            .map(|cell| mem::replace(&mut *cell.write(), value))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);

/// Host error value.
#[derive(Clone)]
pub struct NativeError(Arc<dyn std::error::Error + Send + Sync>);

impl NativeError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        NativeError(Arc::new(err))
    }

    pub fn msg(message: impl Into<String>) -> Self {
        NativeError::new(MessageError(message.into()))
    }

    pub fn message(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeError({:?})", self.message())
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host resource with no script representation.
#[derive(Clone)]
pub struct OpaqueHandle {
    name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueHandle {
    pub fn new(name: &'static str, inner: impl Any + Send + Sync) -> Self {
        OpaqueHandle {
            name,
            inner: Arc::new(inner),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner).cast::<()>() as usize
    }
}

impl fmt::Debug for OpaqueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueHandle({})", self.name)
    }
}

/// Dynamic host value.
#[derive(Clone, Debug)]
pub enum NativeValue {
    Nil,
    Bool(bool),
    Int(IntKind, i64),
    Uint(UintKind, u64),
    Float(FloatKind, f64),
    Str(String),
    Bytes(Vec<u8>),
    Slice(SeqRef),
    /// Fixed-length sequence. Elements are writable, the length is not.
    Array(SeqRef),
    Map(MapRef),
    Struct(StructObj),
    Ptr(NativePtr),
    Func(NativeFunc),
    Error(NativeError),
    /// Channel of the given element type. Never convertible.
    Chan(NativeType),
    Opaque(OpaqueHandle),
    /// A script value held by host code.
    Script(Value),
}

impl NativeValue {
    pub fn slice(elem: NativeType, items: Vec<NativeValue>) -> Self {
        NativeValue::Slice(Shared::new(SeqData { elem, items }))
    }

    pub fn array(elem: NativeType, items: Vec<NativeValue>) -> Self {
        NativeValue::Array(Shared::new(SeqData { elem, items }))
    }

    pub fn map(
        key: NativeType,
        value: NativeType,
        entries: impl IntoIterator<Item = (NativeValue, NativeValue)>,
    ) -> Self {
        NativeValue::Map(Shared::new(MapData {
            key,
            value,
            entries: entries.into_iter().collect(),
        }))
    }

    /// Pointer to a fresh cell holding `value`.
    pub fn ptr_to(value: NativeValue) -> Self {
        NativeValue::Ptr(NativePtr::new(value.native_type(), value))
    }

    pub fn nil_ptr(elem: NativeType) -> Self {
        NativeValue::Ptr(NativePtr::nil(elem))
    }

    pub fn error(message: impl Into<String>) -> Self {
        NativeValue::Error(NativeError::msg(message))
    }

    /// Dynamic type. `Nil` reports `Any`.
    pub fn native_type(&self) -> NativeType {
        match self {
            NativeValue::Nil => NativeType::Any,
            NativeValue::Bool(_) => NativeType::Bool,
            NativeValue::Int(kind, _) => NativeType::Int(*kind),
            NativeValue::Uint(kind, _) => NativeType::Uint(*kind),
            NativeValue::Float(kind, _) => NativeType::Float(*kind),
            NativeValue::Str(_) => NativeType::Str,
            NativeValue::Bytes(_) => NativeType::Bytes,
            NativeValue::Slice(seq) => NativeType::slice(seq.read().elem.clone()),
            NativeValue::Array(seq) => {
                let data = seq.read();
                NativeType::array(data.elem.clone(), data.items.len())
            }
            NativeValue::Map(map) => {
                let data = map.read();
                NativeType::map(data.key.clone(), data.value.clone())
            }
            NativeValue::Struct(obj) => NativeType::Struct(Arc::clone(obj.def())),
            NativeValue::Ptr(ptr) => NativeType::ptr(ptr.elem().clone()),
            NativeValue::Func(func) => NativeType::Func(Arc::clone(func.sig_arc())),
            NativeValue::Error(_) => NativeType::Error,
            NativeValue::Chan(elem) => NativeType::chan(elem.clone()),
            NativeValue::Opaque(handle) => NativeType::Opaque(handle.name()),
            NativeValue::Script(_) => NativeType::Value,
        }
    }

    pub fn is_nil(&self) -> bool {
        match self {
            NativeValue::Nil => true,
            NativeValue::Ptr(ptr) => ptr.is_nil(),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NativeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer kind that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::Int(_, n) => Some(*n),
            NativeValue::Uint(_, n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            NativeValue::Int(_, n) => u64::try_from(*n).ok(),
            NativeValue::Uint(_, n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NativeValue::Float(_, f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&SeqRef> {
        match self {
            NativeValue::Slice(seq) | NativeValue::Array(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            NativeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructObj> {
        match self {
            NativeValue::Struct(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_ptr(&self) -> Option<&NativePtr> {
        match self {
            NativeValue::Ptr(ptr) => Some(ptr),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&NativeFunc> {
        match self {
            NativeValue::Func(func) => Some(func),
            _ => None,
        }
    }

    /// Snapshot of a slice's or array's elements.
    pub fn seq_items(&self) -> Option<Vec<NativeValue>> {
        self.as_seq().map(|seq| seq.read().items.clone())
    }

    /// Whether the value may be used as a map key.
    pub fn is_hashable(&self) -> bool {
        match self {
            NativeValue::Slice(_)
            | NativeValue::Array(_)
            | NativeValue::Map(_)
            | NativeValue::Func(_) => false,
            NativeValue::Struct(obj) => obj.fields().iter().all(NativeValue::is_hashable),
            NativeValue::Script(value) => value.hash().is_ok(),
            _ => true,
        }
    }

    /// Loose equality: numbers compare by value across kinds, script values
    /// by script equality, everything else strictly.
    pub fn same_value(&self, other: &NativeValue) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a == b,
            _ => match (self, other) {
                (NativeValue::Script(a), NativeValue::Script(b)) => a.equals(b),
                _ => self == other,
            },
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            NativeValue::Int(_, n) => Some(Numeric::Int(i128::from(*n))),
            NativeValue::Uint(_, n) => Some(Numeric::Int(i128::from(*n))),
            NativeValue::Float(_, f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }
}

enum Numeric {
    Int(i128),
    Float(f64),
}

impl PartialEq for Numeric {
    #[allow(clippy::cast_precision_loss, reason = "mixed comparisons go through f64")]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => a == b,
            (Numeric::Float(a), Numeric::Float(b)) => a == b,
            (Numeric::Int(i), Numeric::Float(f)) | (Numeric::Float(f), Numeric::Int(i)) => {
                *i as f64 == *f
            }
        }
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeValue::Nil, NativeValue::Nil) => true,
            (NativeValue::Bool(a), NativeValue::Bool(b)) => a == b,
            (NativeValue::Int(ka, a), NativeValue::Int(kb, b)) => ka == kb && a == b,
            (NativeValue::Uint(ka, a), NativeValue::Uint(kb, b)) => ka == kb && a == b,
            (NativeValue::Float(ka, a), NativeValue::Float(kb, b)) => {
                ka == kb && a.to_bits() == b.to_bits()
            }
            (NativeValue::Str(a), NativeValue::Str(b)) => a == b,
            (NativeValue::Bytes(a), NativeValue::Bytes(b)) => a == b,
            (NativeValue::Slice(a), NativeValue::Slice(b))
            | (NativeValue::Array(a), NativeValue::Array(b)) => a.ptr_eq(b),
            (NativeValue::Map(a), NativeValue::Map(b)) => a.ptr_eq(b),
            (NativeValue::Struct(a), NativeValue::Struct(b)) => a == b,
            (NativeValue::Ptr(a), NativeValue::Ptr(b)) => match (a.cell(), b.cell()) {
                (Some(x), Some(y)) => x.ptr_eq(y),
                (None, None) => a.elem() == b.elem(),
                _ => false,
            },
            (NativeValue::Func(a), NativeValue::Func(b)) => a.ptr_eq(b),
            (NativeValue::Error(a), NativeValue::Error(b)) => a.message() == b.message(),
            (NativeValue::Chan(a), NativeValue::Chan(b)) => a == b,
            (NativeValue::Opaque(a), NativeValue::Opaque(b)) => a.addr() == b.addr(),
            (NativeValue::Script(a), NativeValue::Script(b)) => a.equals(b),
            _ => false,
        }
    }
}

impl Eq for NativeValue {}

impl Hash for NativeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            NativeValue::Nil => {}
            NativeValue::Bool(b) => b.hash(state),
            NativeValue::Int(kind, n) => (kind, n).hash(state),
            NativeValue::Uint(kind, n) => (kind, n).hash(state),
            NativeValue::Float(kind, f) => (kind, f.to_bits()).hash(state),
            NativeValue::Str(s) => s.hash(state),
            NativeValue::Bytes(b) => b.hash(state),
            NativeValue::Slice(seq) | NativeValue::Array(seq) => seq.id().hash(state),
            NativeValue::Map(map) => map.id().hash(state),
            NativeValue::Struct(obj) => obj.hash(state),
            NativeValue::Ptr(ptr) => ptr.cell().map(Shared::id).hash(state),
            NativeValue::Func(func) => func.addr().hash(state),
            NativeValue::Error(err) => err.message().hash(state),
            NativeValue::Chan(_) => {}
            NativeValue::Opaque(handle) => handle.addr().hash(state),
            // Unhashable script values all land in one bucket; equality still
            // tells them apart.
            NativeValue::Script(value) => value.hash().unwrap_or(0).hash(state),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty => $variant:ident($kind:expr)),* $(,)?) => {
        $(
            impl From<$t> for NativeValue {
                fn from(n: $t) -> Self {
                    NativeValue::$variant($kind, n.into())
                }
            }
        )*
    };
}

impl_from_int! {
    i8 => Int(IntKind::I8),
    i16 => Int(IntKind::I16),
    i32 => Int(IntKind::I32),
    i64 => Int(IntKind::I64),
    u8 => Uint(UintKind::U8),
    u16 => Uint(UintKind::U16),
    u32 => Uint(UintKind::U32),
    u64 => Uint(UintKind::U64),
}

impl From<isize> for NativeValue {
    fn from(n: isize) -> Self {
        NativeValue::Int(IntKind::Isize, n as i64)
    }
}

impl From<usize> for NativeValue {
    fn from(n: usize) -> Self {
        NativeValue::Uint(UintKind::Usize, n as u64)
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        NativeValue::Bool(b)
    }
}

impl From<f32> for NativeValue {
    fn from(f: f32) -> Self {
        NativeValue::Float(FloatKind::F32, f64::from(f))
    }
}

impl From<f64> for NativeValue {
    fn from(f: f64) -> Self {
        NativeValue::Float(FloatKind::F64, f)
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::Str(s.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::Str(s)
    }
}

impl From<Vec<u8>> for NativeValue {
    fn from(b: Vec<u8>) -> Self {
        NativeValue::Bytes(b)
    }
}

impl From<StructObj> for NativeValue {
    fn from(obj: StructObj) -> Self {
        NativeValue::Struct(obj)
    }
}

impl From<NativeFunc> for NativeValue {
    fn from(func: NativeFunc) -> Self {
        NativeValue::Func(func)
    }
}

impl From<NativeError> for NativeValue {
    fn from(err: NativeError) -> Self {
        NativeValue::Error(err)
    }
}

impl From<Value> for NativeValue {
    fn from(value: Value) -> Self {
        NativeValue::Script(value)
    }
}

fn write_list<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = &'a NativeValue>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Nil => write!(f, "nil"),
            NativeValue::Bool(b) => write!(f, "{b}"),
            NativeValue::Int(_, n) => write!(f, "{n}"),
            NativeValue::Uint(_, n) => write!(f, "{n}"),
            NativeValue::Float(_, x) => write!(f, "{x:?}"),
            NativeValue::Str(s) => write!(f, "{s:?}"),
            NativeValue::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            NativeValue::Slice(seq) | NativeValue::Array(seq) => display_guard(seq.id(), || {
                write!(f, "[")?;
                write_list(f, seq.read().items.iter())?;
                write!(f, "]")
            })
            .unwrap_or_else(|| write!(f, "[...]")),
            NativeValue::Map(map) => display_guard(map.id(), || {
                // Host map order is unspecified; render sorted for stable output.
                let data = map.read();
                let mut entries: Vec<(String, String)> = data
                    .entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                entries.sort();
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            })
            .unwrap_or_else(|| write!(f, "{{...}}")),
            NativeValue::Struct(obj) if obj.fields().is_empty() => {
                write!(f, "{} {{}}", obj.def().name())
            }
            NativeValue::Struct(obj) => {
                write!(f, "{} {{", obj.def().name())?;
                for (i, (def, value)) in obj.def().fields().iter().zip(obj.fields()).enumerate() {
                    write!(f, "{} {}: {value}", if i == 0 { "" } else { "," }, def.name())?;
                }
                write!(f, " }}")
            }
            NativeValue::Ptr(ptr) => match ptr.cell() {
                None => write!(f, "nil"),
                Some(cell) => display_guard(cell.id(), || write!(f, "&{}", *cell.read()))
                    .unwrap_or_else(|| write!(f, "&...")),
            },
            NativeValue::Func(func) => write!(f, "{}", func.sig()),
            NativeValue::Error(err) => write!(f, "{err}"),
            NativeValue::Chan(elem) => write!(f, "Chan<{elem}>"),
            NativeValue::Opaque(handle) => write!(f, "<{}>", handle.name()),
            NativeValue::Script(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests;
