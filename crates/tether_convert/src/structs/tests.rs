use super::*;
use crate::dispatch::to_value;
use crate::Converter;
use pretty_assertions::assert_eq;
use tether_native::{FuncSig, IntKind};
use tether_value::EvalErrorKind;

fn address_def() -> Arc<StructDef> {
    StructDef::builder("Address")
        .field_with_tags("City", NativeType::Str, &[("script", "city")])
        .build()
}

fn contact_def(address: &Arc<StructDef>) -> Arc<StructDef> {
    StructDef::builder("Contact")
        .field("Name", NativeType::Str)
        .field_with_tags("Phone", NativeType::Str, &[("script", "phone"), ("json", "tel")])
        .field_with_tags("Age", NativeType::Int(IntKind::I64), &[("script", "-")])
        .field("Home", NativeType::strukt(address))
        .method("Greet", FuncSig::new(vec![], vec![NativeType::Str]), |recv, _| {
            let name = recv
                .as_struct()
                .and_then(|obj| obj.get("Name"))
                .and_then(NativeValue::as_str)
                .unwrap_or_default()
                .to_string();
            vec![format!("hi {name}").into()]
        })
        .ptr_method("Rename", FuncSig::new(vec![NativeType::Str], vec![]), |recv, args| {
            if let (Some(ptr), Some(name)) = (recv.as_ptr(), args.first()) {
                if let Some(NativeValue::Struct(obj)) = ptr.load() {
                    ptr.store(obj.with("Name", name.clone()).into());
                }
            }
            vec![]
        })
        .build()
}

fn bob() -> (Arc<StructDef>, StructObj) {
    let address = address_def();
    let def = contact_def(&address);
    let home = StructObj::new(&address, vec!["Paris".into()]);
    let obj = StructObj::new(
        &def,
        vec!["bob".into(), "555".into(), 30i64.into(), home.into()],
    );
    (def, obj)
}

fn attrs(value: &Value) -> &dyn HasAttrs {
    value.as_object().unwrap().as_attrs().unwrap()
}

fn call(value: &Value, args: &[Value]) -> Value {
    value
        .as_object()
        .unwrap()
        .as_callable()
        .unwrap()
        .call(args, &[])
        .unwrap()
}

#[test]
fn fields_follow_the_tag() {
    let (_, obj) = bob();
    let value = to_value(&obj.into()).unwrap();
    let contact = attrs(&value);
    assert_eq!(contact.attr("Name").unwrap(), Some(Value::string("bob")));
    assert_eq!(contact.attr("phone").unwrap(), Some(Value::string("555")));
    assert_eq!(contact.attr("Phone").unwrap(), None);
    assert_eq!(contact.attr("Age").unwrap(), None);
    assert_eq!(contact.attr_names(), vec!["Greet", "Name", "phone", "Home"]);
}

#[test]
fn another_tag_renames_differently() {
    let (_, obj) = bob();
    let value = Converter::with_tag("json").to_value(&obj.into()).unwrap();
    let contact = attrs(&value);
    assert_eq!(contact.attr("tel").unwrap(), Some(Value::string("555")));
    assert_eq!(contact.attr("phone").unwrap(), None);
    // No json tag on Age: visible under its own name.
    assert_eq!(contact.attr("Age").unwrap(), Some(Value::int(30)));
    // Nested structs keep the tag.
    let home = contact.attr("Home").unwrap().unwrap();
    assert_eq!(attrs(&home).attr("City").unwrap(), Some(Value::string("Paris")));
    assert_eq!(attrs(&home).attr("city").unwrap(), None);
}

#[test]
fn value_structs_are_read_only_copies() {
    let (_, obj) = bob();
    let value = to_value(&obj.into()).unwrap();
    let err = attrs(&value)
        .set_attr("Name", Value::string("alice"))
        .unwrap_err();
    assert_eq!(err.message, "Name is not a settable field");
    assert_eq!(value.type_name(), "tether_struct<Contact>");
}

#[test]
fn pointer_structs_write_through() {
    let (_, obj) = bob();
    let native = NativeValue::ptr_to(obj.into());
    let value = to_value(&native).unwrap();
    assert_eq!(value.type_name(), "tether_struct<Ref<Contact>>");

    attrs(&value).set_attr("phone", Value::string("777")).unwrap();
    let host = native.as_ptr().unwrap().load().unwrap();
    assert_eq!(host.as_struct().unwrap().get("Phone"), Some(&"777".into()));
}

#[test]
fn nested_fields_of_pointer_structs_are_addressable() {
    let (_, obj) = bob();
    let native = NativeValue::ptr_to(obj.into());
    let value = to_value(&native).unwrap();
    let home = attrs(&value).attr("Home").unwrap().unwrap();
    attrs(&home).set_attr("city", Value::string("Lyon")).unwrap();

    let host = native.as_ptr().unwrap().load().unwrap();
    let city = host
        .as_struct()
        .and_then(|c| c.get("Home"))
        .and_then(NativeValue::as_struct)
        .and_then(|a| a.get("City"))
        .cloned();
    assert_eq!(city, Some("Lyon".into()));
}

#[test]
fn assignment_is_coerced_and_checked() {
    let (_, obj) = bob();
    let value = to_value(&NativeValue::ptr_to(obj.into())).unwrap();
    let contact = attrs(&value);

    let err = contact.set_attr("Name", Value::int(1)).unwrap_err();
    assert_eq!(
        err.message,
        "Name: value of type int cannot be converted to type String"
    );

    let err = contact.set_attr("Phone", Value::string("1")).unwrap_err();
    assert_eq!(
        err.message,
        "tether_struct<Ref<Contact>> has no .Phone field or method (did you mean .phone?)"
    );
    assert!(matches!(err.kind, EvalErrorKind::AttributeNotFound { .. }));
}

#[test]
fn method_sets_depend_on_addressability() {
    let (_, obj) = bob();
    let by_value = to_value(&obj.clone().into()).unwrap();
    assert!(attrs(&by_value).attr("Rename").unwrap().is_none());
    let greet = attrs(&by_value).attr("Greet").unwrap().unwrap();
    assert_eq!(call(&greet, &[]), Value::string("hi bob"));

    let native = NativeValue::ptr_to(obj.into());
    let by_ref = to_value(&native).unwrap();
    assert_eq!(
        attrs(&by_ref).attr_names(),
        vec!["Greet", "Rename", "Name", "phone", "Home"]
    );
    let rename = attrs(&by_ref).attr("Rename").unwrap().unwrap();
    assert_eq!(call(&rename, &[Value::string("alice")]), Value::None);
    assert_eq!(
        attrs(&by_ref).attr("Name").unwrap(),
        Some(Value::string("alice"))
    );
}

#[test]
fn frozen_structs_refuse_assignment() {
    let (_, obj) = bob();
    let value = to_value(&NativeValue::ptr_to(obj.into())).unwrap();
    value.freeze();
    let err = attrs(&value)
        .set_attr("Name", Value::string("x"))
        .unwrap_err();
    assert_eq!(err.message, "cannot assign to field of frozen struct");

    let home = attrs(&value).attr("Home").unwrap().unwrap();
    assert!(attrs(&home).set_attr("city", Value::string("x")).is_err());
}

#[test]
fn display_renders_the_host_value() {
    let address = address_def();
    let home = StructObj::new(&address, vec!["Paris".into()]);
    let value = to_value(&home.into()).unwrap();
    assert_eq!(value.to_string(), r#"Address { City: "Paris" }"#);
}

#[test]
fn unexported_fields_are_not_attributes() {
    let def = StructDef::builder("Person")
        .field("Name", NativeType::Str)
        .private_field("age", NativeType::Int(IntKind::I64))
        .build();
    let obj = StructObj::new(&def, vec!["ann".into(), 41i64.into()]);
    let native = NativeValue::ptr_to(obj.into());
    let value = to_value(&native).unwrap();
    let person = attrs(&value);
    assert_eq!(person.attr_names(), vec!["Name"]);
    assert_eq!(person.attr("age").unwrap(), None);
    assert!(person.set_attr("age", Value::int(1)).is_err());

    let host = native.as_ptr().unwrap().load().unwrap();
    assert_eq!(host.as_struct().unwrap().get("age"), Some(&41i64.into()));
}

#[test]
fn empty_structs_have_no_attributes() {
    let def = StructDef::builder("Empty").build();
    let value = to_value(&StructObj::zeroed(&def).into()).unwrap();
    assert_eq!(attrs(&value).attr_names(), Vec::<String>::new());
    assert_eq!(attrs(&value).attr("anything").unwrap(), None);
    assert_eq!(value.to_string(), "Empty {}");
}
