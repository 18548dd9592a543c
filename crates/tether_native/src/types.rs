//! Static types of host values.
//!
//! `NativeType` is what the bridge coerces script values *into*: a function
//! parameter, a slice element, a struct field. It plays the role runtime type
//! information plays in reflective languages.

use std::fmt;
use std::sync::Arc;

use crate::func::FuncSig;
use crate::structs::{StructDef, StructObj};
use crate::value::NativeValue;

/// Signed integer widths.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Isize,
}

impl IntKind {
    pub const fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::Isize => "isize",
        }
    }

    /// Whether `n` is representable in this width.
    pub fn fits(self, n: i128) -> bool {
        let (min, max) = match self {
            IntKind::I8 => (i128::from(i8::MIN), i128::from(i8::MAX)),
            IntKind::I16 => (i128::from(i16::MIN), i128::from(i16::MAX)),
            IntKind::I32 => (i128::from(i32::MIN), i128::from(i32::MAX)),
            IntKind::I64 => (i128::from(i64::MIN), i128::from(i64::MAX)),
            IntKind::Isize => (isize::MIN as i128, isize::MAX as i128),
        };
        (min..=max).contains(&n)
    }
}

/// Unsigned integer widths.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UintKind {
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl UintKind {
    pub const fn name(self) -> &'static str {
        match self {
            UintKind::U8 => "u8",
            UintKind::U16 => "u16",
            UintKind::U32 => "u32",
            UintKind::U64 => "u64",
            UintKind::Usize => "usize",
        }
    }

    pub fn fits(self, n: i128) -> bool {
        let max = match self {
            UintKind::U8 => i128::from(u8::MAX),
            UintKind::U16 => i128::from(u16::MAX),
            UintKind::U32 => i128::from(u32::MAX),
            UintKind::U64 => i128::from(u64::MAX),
            UintKind::Usize => usize::MAX as i128,
        };
        (0..=max).contains(&n)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

impl FloatKind {
    pub const fn name(self) -> &'static str {
        match self {
            FloatKind::F32 => "f32",
            FloatKind::F64 => "f64",
        }
    }
}

/// Static type of a host value.
#[derive(Clone, Debug)]
pub enum NativeType {
    /// Dynamically typed slot: accepts any value.
    Any,
    /// Slot that holds a script value as-is.
    Value,
    Bool,
    Int(IntKind),
    Uint(UintKind),
    Float(FloatKind),
    Str,
    Bytes,
    Slice(Box<NativeType>),
    Array(Box<NativeType>, usize),
    Map(Box<NativeType>, Box<NativeType>),
    /// Nominal: two struct types are equal only if they share a definition.
    Struct(Arc<StructDef>),
    Ptr(Box<NativeType>),
    Func(Arc<FuncSig>),
    Error,
    Chan(Box<NativeType>),
    Opaque(&'static str),
}

impl NativeType {
    pub fn slice(elem: NativeType) -> Self {
        NativeType::Slice(Box::new(elem))
    }

    pub fn array(elem: NativeType, len: usize) -> Self {
        NativeType::Array(Box::new(elem), len)
    }

    pub fn map(key: NativeType, value: NativeType) -> Self {
        NativeType::Map(Box::new(key), Box::new(value))
    }

    pub fn ptr(elem: NativeType) -> Self {
        NativeType::Ptr(Box::new(elem))
    }

    pub fn chan(elem: NativeType) -> Self {
        NativeType::Chan(Box::new(elem))
    }

    pub fn func(sig: FuncSig) -> Self {
        NativeType::Func(Arc::new(sig))
    }

    pub fn strukt(def: &Arc<StructDef>) -> Self {
        NativeType::Struct(Arc::clone(def))
    }

    /// Types whose slots may hold nil, so that script `None` converts.
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            NativeType::Any
                | NativeType::Value
                | NativeType::Slice(_)
                | NativeType::Map(..)
                | NativeType::Ptr(_)
                | NativeType::Func(_)
                | NativeType::Error
                | NativeType::Chan(_)
        )
    }

    /// Host containers that nested script containers are never coerced into.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NativeType::Slice(_) | NativeType::Array(..) | NativeType::Map(..)
        )
    }

    /// Element type of slices, arrays, pointers and channels.
    pub fn elem(&self) -> Option<&NativeType> {
        match self {
            NativeType::Slice(elem)
            | NativeType::Array(elem, _)
            | NativeType::Ptr(elem)
            | NativeType::Chan(elem) => Some(elem),
            _ => None,
        }
    }

    /// Value a freshly declared slot of this type holds.
    pub fn zero_value(&self) -> NativeValue {
        match self {
            NativeType::Bool => NativeValue::Bool(false),
            NativeType::Int(kind) => NativeValue::Int(*kind, 0),
            NativeType::Uint(kind) => NativeValue::Uint(*kind, 0),
            NativeType::Float(kind) => NativeValue::Float(*kind, 0.0),
            NativeType::Str => NativeValue::Str(String::new()),
            NativeType::Bytes => NativeValue::Bytes(Vec::new()),
            NativeType::Slice(elem) => NativeValue::slice((**elem).clone(), Vec::new()),
            NativeType::Array(elem, len) => NativeValue::array(
                (**elem).clone(),
                (0..*len).map(|_| elem.zero_value()).collect(),
            ),
            NativeType::Map(key, value) => {
                NativeValue::map((**key).clone(), (**value).clone(), Vec::new())
            }
            NativeType::Struct(def) => NativeValue::Struct(StructObj::zeroed(def)),
            NativeType::Ptr(elem) => NativeValue::nil_ptr((**elem).clone()),
            NativeType::Any
            | NativeType::Value
            | NativeType::Func(_)
            | NativeType::Error
            | NativeType::Chan(_)
            | NativeType::Opaque(_) => NativeValue::Nil,
        }
    }
}

impl PartialEq for NativeType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeType::Any, NativeType::Any)
            | (NativeType::Value, NativeType::Value)
            | (NativeType::Bool, NativeType::Bool)
            | (NativeType::Str, NativeType::Str)
            | (NativeType::Bytes, NativeType::Bytes)
            | (NativeType::Error, NativeType::Error) => true,
            (NativeType::Int(a), NativeType::Int(b)) => a == b,
            (NativeType::Uint(a), NativeType::Uint(b)) => a == b,
            (NativeType::Float(a), NativeType::Float(b)) => a == b,
            (NativeType::Slice(a), NativeType::Slice(b))
            | (NativeType::Ptr(a), NativeType::Ptr(b))
            | (NativeType::Chan(a), NativeType::Chan(b)) => a == b,
            (NativeType::Array(a, n), NativeType::Array(b, m)) => n == m && a == b,
            (NativeType::Map(ak, av), NativeType::Map(bk, bv)) => ak == bk && av == bv,
            (NativeType::Struct(a), NativeType::Struct(b)) => Arc::ptr_eq(a, b),
            (NativeType::Func(a), NativeType::Func(b)) => a == b,
            (NativeType::Opaque(a), NativeType::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for NativeType {}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Any => write!(f, "dyn Any"),
            NativeType::Value => write!(f, "Value"),
            NativeType::Bool => write!(f, "bool"),
            NativeType::Int(kind) => write!(f, "{}", kind.name()),
            NativeType::Uint(kind) => write!(f, "{}", kind.name()),
            NativeType::Float(kind) => write!(f, "{}", kind.name()),
            NativeType::Str => write!(f, "String"),
            NativeType::Bytes => write!(f, "Vec<u8>"),
            NativeType::Slice(elem) => write!(f, "Vec<{elem}>"),
            NativeType::Array(elem, len) => write!(f, "[{elem}; {len}]"),
            NativeType::Map(key, value) => write!(f, "HashMap<{key}, {value}>"),
            NativeType::Struct(def) => write!(f, "{}", def.name()),
            NativeType::Ptr(elem) => write!(f, "Ref<{elem}>"),
            NativeType::Func(sig) => write!(f, "{sig}"),
            NativeType::Error => write!(f, "Error"),
            NativeType::Chan(elem) => write!(f, "Chan<{elem}>"),
            NativeType::Opaque(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests;
