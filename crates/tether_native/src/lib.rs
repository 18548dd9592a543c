//! Tether Native - host values as the bridge sees them.
//!
//! Rust has no runtime reflection, so host data crossing into a script is
//! described explicitly:
//! - `NativeType`: static types (parameter, element, field types)
//! - `NativeValue`: dynamic values, with slices, maps and pointer cells held
//!   through shared handles so both sides observe mutations
//! - `StructDef`: registered record types with field tag tables and methods
//! - `FuncSig` / `NativeFunc`: host functions
//!
//! # Example
//!
//! ```text
//! let contact = StructDef::builder("Contact")
//!     .field("Name", NativeType::Str)
//!     .field_with_tags("Phone", NativeType::Str, &[("script", "phone")])
//!     .private_field("age", NativeType::Int(IntKind::I64))
//!     .build();
//! let bob = StructObj::zeroed(&contact).with("Name", "bob");
//! let native = NativeValue::ptr_to(bob.into());
//! ```

mod func;
mod structs;
mod types;
mod value;

pub use func::{FuncSig, NativeFunc};
pub use structs::{FieldDef, MethodDef, Receiver, StructDef, StructDefBuilder, StructObj, TagEntry};
pub use types::{FloatKind, IntKind, NativeType, UintKind};
pub use value::{
    MapData, MapRef, NativeError, NativePtr, NativeValue, OpaqueHandle, SeqData, SeqRef,
};
