use super::*;
use crate::structs::StructDef;
use pretty_assertions::assert_eq;

#[test]
fn aggregates_compare_by_identity() {
    let a = NativeValue::slice(NativeType::Str, vec!["x".into()]);
    let b = NativeValue::slice(NativeType::Str, vec!["x".into()]);
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
}

#[test]
fn clones_alias_storage() {
    let a = NativeValue::slice(NativeType::Int(IntKind::I64), vec![1i64.into()]);
    let b = a.clone();
    b.as_seq().unwrap().write().items.push(2i64.into());
    assert_eq!(a.seq_items().unwrap().len(), 2);
}

#[test]
fn same_value_crosses_numeric_kinds() {
    let a = NativeValue::from(3i32);
    let b = NativeValue::from(3u64);
    let c = NativeValue::from(3.0f64);
    assert_ne!(a, b);
    assert!(a.same_value(&b));
    assert!(a.same_value(&c));
    assert!(!a.same_value(&NativeValue::from("3")));
}

#[test]
fn native_type_of_values() {
    let m = NativeValue::map(NativeType::Str, NativeType::Bool, Vec::new());
    assert_eq!(m.native_type().to_string(), "HashMap<String, bool>");
    assert_eq!(NativeValue::ptr_to(1u8.into()).native_type().to_string(), "Ref<u8>");
    assert_eq!(NativeValue::Nil.native_type(), NativeType::Any);
}

#[test]
fn pointer_store_is_shared() {
    let NativeValue::Ptr(ptr) = NativeValue::ptr_to("a".into()) else {
        unreachable!()
    };
    let alias = ptr.clone();
    alias.store("b".into());
    assert_eq!(ptr.load(), Some(NativeValue::from("b")));
    assert!(NativePtr::nil(NativeType::Str).load().is_none());
}

#[test]
fn hashability() {
    assert!(NativeValue::from("k").is_hashable());
    assert!(!NativeValue::slice(NativeType::Str, vec![]).is_hashable());
    assert!(!NativeValue::Script(Value::list(vec![])).is_hashable());
    assert!(NativeValue::Script(Value::int(1)).is_hashable());
}

#[test]
fn display() {
    let def = StructDef::builder("Contact")
        .field("Name", NativeType::Str)
        .field("Age", NativeType::Uint(UintKind::U8))
        .build();
    let obj = StructObj::zeroed(&def).with("Name", "bob").with("Age", 30u8);
    assert_eq!(
        NativeValue::from(obj).to_string(),
        "Contact { Name: \"bob\", Age: 30 }"
    );
    let m = NativeValue::map(
        NativeType::Str,
        NativeType::Int(IntKind::I64),
        vec![("b".into(), 2i64.into()), ("a".into(), 1i64.into())],
    );
    assert_eq!(m.to_string(), "{\"a\": 1, \"b\": 2}");
    assert_eq!(NativeValue::error("boom").to_string(), "boom");
    assert_eq!(NativeValue::nil_ptr(NativeType::Str).to_string(), "nil");
}

#[test]
fn self_containing_slice_displays() {
    let s = NativeValue::slice(NativeType::Any, vec![1i64.into()]);
    let alias = s.clone();
    s.as_seq().unwrap().write().items.push(alias);
    assert_eq!(s.to_string(), "[1, [...]]");
}
