use super::*;
use pretty_assertions::assert_eq;
use tether_native::{FloatKind, IntKind, OpaqueHandle, StructDef, StructObj, UintKind};
use tether_value::{EvalErrorKind, Int, List};

use crate::DEFAULT_TAG;

#[test]
fn nil_and_nil_pointers_become_none() {
    assert_eq!(to_value(&NativeValue::Nil).unwrap(), Value::None);
    let nil = NativeValue::nil_ptr(NativeType::Int(IntKind::I64));
    assert_eq!(to_value(&nil).unwrap(), Value::None);
}

#[test]
fn pointers_to_scalars_convert_by_value() {
    let ptr = NativeValue::ptr_to(NativeValue::from("x"));
    assert_eq!(to_value(&ptr).unwrap(), Value::string("x"));
}

#[test]
fn errors_become_their_message() {
    let err = NativeValue::error("disk full");
    assert_eq!(to_value(&err).unwrap(), Value::string("disk full"));
}

#[test]
fn channels_and_opaque_handles_are_unsupported() {
    let chan = NativeValue::Chan(NativeType::Int(IntKind::I64));
    let err = to_value(&chan).unwrap_err();
    assert_eq!(err.message, "unsupported native type Chan<i64>");
    assert!(err.is_fatal());

    let handle = NativeValue::Opaque(OpaqueHandle::new("FileHandle", 3u32));
    let err = to_value(&handle).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UnsupportedType { .. }));
}

#[test]
fn unsupported_values_inside_containers_fail_on_access() {
    let chans = NativeValue::slice(
        NativeType::chan(NativeType::Bool),
        vec![NativeValue::Chan(NativeType::Bool)],
    );
    let wrapped = to_value(&chans).unwrap();
    let slice = wrapped.downcast_ref::<SliceWrapper>().unwrap();
    assert!(slice.get(0).unwrap_err().is_fatal());
}

#[test]
fn script_values_pass_through() {
    let list = Value::list(vec![Value::int(1)]);
    let back = to_value(&NativeValue::Script(list.clone())).unwrap();
    assert!(matches!((&back, &list), (Value::List(a), Value::List(b)) if a.ptr_eq(b)));
}

#[test]
fn primitives_without_a_target_type() {
    assert_eq!(
        from_value(&Value::int(-3)),
        NativeValue::Int(IntKind::I64, -3)
    );
    assert_eq!(
        from_value(&Value::int(u64::MAX)),
        NativeValue::Uint(UintKind::U64, u64::MAX)
    );
    let huge = from_value(&Value::Int(Int::new(1 << 70)));
    assert!(matches!(huge, NativeValue::Float(FloatKind::F64, _)));
    assert_eq!(from_value(&Value::None), NativeValue::Nil);
}

#[test]
fn containers_without_a_target_type() {
    let tuple = from_value(&Value::tuple(vec![Value::int(1), Value::string("a")]));
    assert_eq!(tuple.native_type(), NativeType::slice(NativeType::Any));
    assert_eq!(
        tuple.seq_items().unwrap(),
        vec![NativeValue::from(1i64), NativeValue::from("a")]
    );

    let set = from_value(&Value::set([Value::string("x")]).unwrap());
    assert_eq!(
        set.native_type(),
        NativeType::map(NativeType::Any, NativeType::Bool)
    );

    let dict = from_value(&Value::dict([(Value::string("k"), Value::int(2))]).unwrap());
    assert_eq!(
        dict.as_map().unwrap().read().entries.get(&NativeValue::from("k")),
        Some(&NativeValue::from(2i64))
    );
}

#[test]
fn self_referencing_list_is_cut_with_nil() {
    let list = List::new(vec![Value::int(1)]);
    list.append(Value::List(list.clone())).unwrap();

    let native = from_value(&Value::List(list));
    assert_eq!(
        native.seq_items().unwrap(),
        vec![NativeValue::from(1i64), NativeValue::Nil]
    );
}

#[test]
fn shared_but_acyclic_containers_convert_twice() {
    let inner = Value::list(vec![Value::int(1)]);
    let outer = Value::list(vec![inner.clone(), inner]);
    let items = from_value(&outer).seq_items().unwrap();
    assert!(items.iter().all(|item| !item.is_nil()));
}

#[test]
fn wrappers_give_back_their_handle() {
    let native = NativeValue::slice(NativeType::Str, vec!["a".into()]);
    assert_eq!(from_value(&to_value(&native).unwrap()), native);

    let map = NativeValue::map(NativeType::Str, NativeType::Bool, Vec::new());
    assert_eq!(from_value(&to_value(&map).unwrap()), map);

    let def = StructDef::builder("Unit").build();
    let ptr = NativeValue::ptr_to(StructObj::new(&def, vec![]).into());
    assert_eq!(from_value(&to_value(&ptr).unwrap()), ptr);
}

#[test]
fn freezing_reaches_held_script_values() {
    let inner = List::new(vec![]);
    let def = StructDef::builder("Holder")
        .field("Items", NativeType::Value)
        .build();
    let holder = StructObj::new(&def, vec![NativeValue::Script(Value::List(inner.clone()))]);
    let native = NativeValue::slice(NativeType::strukt(&def), vec![holder.into()]);

    freeze_reachable(&native);
    assert!(inner.is_frozen());
}

#[test]
fn freezing_a_self_containing_slice_terminates() {
    let native = NativeValue::slice(NativeType::Value, Vec::new());
    let wrapped = to_value(&native).unwrap();
    let slice = wrapped.downcast_ref::<SliceWrapper>().unwrap();
    slice.append(&wrapped).unwrap();

    wrapped.freeze();
    assert!(slice.is_frozen());
}

fn badge_def() -> std::sync::Arc<StructDef> {
    StructDef::builder("Badge")
        .field_with_tags("Label", NativeType::Str, &[("script", "label"), ("ui", "text")])
        .build()
}

fn field(value: &Value, name: &str) -> Option<Value> {
    value.as_object().unwrap().as_attrs().unwrap().attr(name).unwrap()
}

#[test]
fn container_elements_keep_the_tag() {
    let def = badge_def();
    let badge: NativeValue = StructObj::new(&def, vec!["new".into()]).into();
    let badges = NativeValue::slice(NativeType::strukt(&def), vec![badge.clone()]);
    let by_id = NativeValue::map(
        NativeType::Int(IntKind::I64),
        NativeType::strukt(&def),
        vec![(1i64.into(), badge)],
    );

    let list = to_value_with_tag(&badges, "ui").unwrap();
    let first = list.downcast_ref::<SliceWrapper>().unwrap().get(0).unwrap();
    assert_eq!(field(&first, "text"), Some(Value::string("new")));
    assert_eq!(field(&first, "label"), None);

    let dict = to_value_with_tag(&by_id, "ui").unwrap();
    let entry = dict
        .downcast_ref::<MapWrapper>()
        .unwrap()
        .get(&Value::int(1))
        .unwrap()
        .unwrap();
    assert_eq!(field(&entry, "text"), Some(Value::string("new")));
}

#[test]
fn empty_tag_means_the_default() {
    let def = badge_def();
    let badge: NativeValue = StructObj::new(&def, vec!["new".into()]).into();

    let value = to_value_with_tag(&badge, "").unwrap();
    assert_eq!(field(&value, "label"), Some(Value::string("new")));
    assert_eq!(Converter::with_tag("").tag().as_str(), DEFAULT_TAG);
    let value = Converter::with_tag("").to_value(&badge).unwrap();
    assert_eq!(field(&value, "label"), Some(Value::string("new")));
}
