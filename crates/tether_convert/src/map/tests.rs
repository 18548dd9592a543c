use super::*;
use crate::dispatch::to_value;
use pretty_assertions::assert_eq;
use tether_native::IntKind;

fn i64_ty() -> NativeType {
    NativeType::Int(IntKind::I64)
}

fn wrap(native: &NativeValue) -> MapWrapper {
    to_value(native)
        .unwrap()
        .downcast_ref::<MapWrapper>()
        .unwrap()
        .clone()
}

fn scores() -> NativeValue {
    NativeValue::map(
        NativeType::Str,
        i64_ty(),
        vec![("alice".into(), 3i64.into()), ("bob".into(), 5i64.into())],
    )
}

#[test]
fn lookup_and_assignment_share_storage() {
    let native = scores();
    let map = wrap(&native);
    assert_eq!(map.get(&Value::string("bob")).unwrap(), Some(Value::int(5)));
    assert_eq!(map.get(&Value::string("carol")).unwrap(), None);

    map.set(&Value::string("carol"), &Value::int(8)).unwrap();
    let host = native.as_map().unwrap().read();
    assert_eq!(
        host.entries.get(&NativeValue::from("carol")),
        Some(&NativeValue::from(8i64))
    );
}

#[test]
fn keys_and_values_are_coerced() {
    let map = wrap(&scores());
    let err = map.get(&Value::int(1)).unwrap_err();
    assert_eq!(
        err.message,
        "key: value of type int cannot be converted to type String"
    );
    let err = map
        .set(&Value::string("dave"), &Value::string("x"))
        .unwrap_err();
    assert_eq!(
        err.message,
        "value: value of type string cannot be converted to type i64"
    );
}

#[test]
fn iteration_yields_keys() {
    let map = wrap(&scores());
    let mut keys: Vec<String> = map
        .iterate()
        .map(|k| k.unwrap().as_str().unwrap().to_string())
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["alice".to_string(), "bob".to_string()]);
    assert_eq!(Mapping::len(&map), 2);
}

#[test]
fn pop_with_and_without_default() {
    let map = wrap(&scores());
    assert_eq!(map.pop(&Value::string("alice"), None).unwrap(), Value::int(3));
    assert_eq!(
        map.pop(&Value::string("alice"), Some(&Value::int(0))).unwrap(),
        Value::int(0)
    );
    let err = map.pop(&Value::string("alice"), None).unwrap_err();
    assert_eq!(err.message, "pop: key \"alice\" not found");
}

#[test]
fn frozen_maps_refuse_mutation() {
    let map = wrap(&scores());
    map.freeze();
    let err = map.set(&Value::string("x"), &Value::int(1)).unwrap_err();
    assert_eq!(err.message, "cannot insert into frozen map");
    assert!(map.clear().is_err());
    assert_eq!(map.len(), 2);
}

#[test]
fn method_table() {
    let map = wrap(&scores());
    let get = map.attr("get").unwrap().unwrap();
    let get = get.as_object().unwrap().as_callable().unwrap();
    assert_eq!(
        get.call(&[Value::string("nobody"), Value::int(-1)], &[])
            .unwrap(),
        Value::int(-1)
    );

    let items = map.attr("items").unwrap().unwrap();
    let items = items
        .as_object()
        .unwrap()
        .as_callable()
        .unwrap()
        .call(&[], &[])
        .unwrap();
    assert_eq!(items.len(), Some(2));
    assert!(map.attr("update").unwrap().is_none());
}

#[test]
fn display_is_sorted() {
    let map = wrap(&scores());
    assert_eq!(map.to_string(), r#"{"alice": 3, "bob": 5}"#);
    assert_eq!(map.type_name(), "tether_map<HashMap<String, i64>>");
}

#[test]
fn map_holding_itself() {
    let native = NativeValue::map(NativeType::Str, NativeType::Value, Vec::new());
    let value = to_value(&native).unwrap();
    let map = value.downcast_ref::<MapWrapper>().unwrap();
    map.set(&Value::string("self"), &value).unwrap();

    assert_eq!(map.to_string(), r#"{"self": {...}}"#);
    assert_eq!(crate::from_value(&value), native);
    let inner = map.get(&Value::string("self")).unwrap().unwrap();
    assert!(inner.downcast_ref::<MapWrapper>().is_some());
}
