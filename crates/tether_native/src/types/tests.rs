use super::*;
use pretty_assertions::assert_eq;

#[test]
fn display_is_rust_flavoured() {
    let ty = NativeType::map(NativeType::Str, NativeType::slice(NativeType::Int(IntKind::I64)));
    assert_eq!(ty.to_string(), "HashMap<String, Vec<i64>>");
    assert_eq!(NativeType::array(NativeType::Str, 2).to_string(), "[String; 2]");
    assert_eq!(NativeType::ptr(NativeType::Bool).to_string(), "Ref<bool>");
    assert_eq!(NativeType::Any.to_string(), "dyn Any");
}

#[test]
fn struct_types_are_nominal() {
    let a = StructDef::builder("Point").build();
    let b = StructDef::builder("Point").build();
    assert_eq!(NativeType::strukt(&a), NativeType::strukt(&a));
    assert_ne!(NativeType::strukt(&a), NativeType::strukt(&b));
}

#[test]
fn integer_ranges() {
    assert!(IntKind::I8.fits(-128));
    assert!(!IntKind::I8.fits(128));
    assert!(UintKind::U8.fits(255));
    assert!(!UintKind::U8.fits(-1));
    assert!(UintKind::U64.fits(i128::from(u64::MAX)));
}

#[test]
fn nullability() {
    assert!(NativeType::ptr(NativeType::Str).is_nullable());
    assert!(NativeType::slice(NativeType::Str).is_nullable());
    assert!(!NativeType::Str.is_nullable());
    assert!(!NativeType::array(NativeType::Str, 1).is_nullable());
}

#[test]
fn zero_values() {
    assert_eq!(NativeType::Str.zero_value(), NativeValue::Str(String::new()));
    assert_eq!(
        NativeType::Int(IntKind::I32).zero_value(),
        NativeValue::Int(IntKind::I32, 0)
    );
    let arr = NativeType::array(NativeType::Bool, 3).zero_value();
    assert_eq!(arr.seq_items().unwrap(), vec![NativeValue::Bool(false); 3]);
    assert!(NativeType::ptr(NativeType::Str).zero_value().is_nil());
}
