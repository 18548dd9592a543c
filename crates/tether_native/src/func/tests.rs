use super::*;
use crate::types::IntKind;
use pretty_assertions::assert_eq;

fn i64_ty() -> NativeType {
    NativeType::Int(IntKind::I64)
}

#[test]
fn signature_display() {
    let sig = FuncSig::variadic(vec![NativeType::Str], i64_ty(), vec![i64_ty(), NativeType::Error]);
    assert_eq!(sig.to_string(), "fn(String, ...i64) -> (i64, Error)");
    assert_eq!(FuncSig::new(vec![], vec![]).to_string(), "fn()");
}

#[test]
fn error_convention_and_min_args() {
    let sig = FuncSig::variadic(vec![i64_ty()], i64_ty(), vec![NativeType::Error]);
    assert!(sig.returns_error());
    assert_eq!(sig.min_args(), 1);
    assert_eq!(FuncSig::new(vec![i64_ty(), i64_ty()], vec![]).min_args(), 2);
}

#[test]
fn invoke_runs_body() {
    let double = NativeFunc::new(FuncSig::new(vec![i64_ty()], vec![i64_ty()]), |args| {
        vec![NativeValue::from(args[0].as_i64().unwrap() * 2)]
    });
    assert_eq!(double.invoke(vec![21i64.into()]), vec![NativeValue::from(42i64)]);
}

#[test]
fn clones_share_identity() {
    let f = NativeFunc::new(FuncSig::new(vec![], vec![]), |_| vec![]);
    let g = NativeFunc::new(FuncSig::new(vec![], vec![]), |_| vec![]);
    assert!(f.ptr_eq(&f.clone()));
    assert!(!f.ptr_eq(&g));
}
