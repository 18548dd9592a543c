use super::*;
use crate::types::IntKind;
use pretty_assertions::assert_eq;

fn contact() -> Arc<StructDef> {
    StructDef::builder("Contact")
        .field("Name", NativeType::Str)
        .field_with_tags("Phone", NativeType::Str, &[("script", "phone,omitempty")])
        .field_with_tags("Secret", NativeType::Str, &[("script", "-")])
        .field_with_tags("Street", NativeType::Str, &[("json", "street")])
        .field_with_tags("Zip", NativeType::Str, &[("script", ",omitempty")])
        .private_field("age", NativeType::Int(IntKind::I64))
        .method("Greet", FuncSig::new(vec![], vec![NativeType::Str]), |_, _| {
            vec!["hi".into()]
        })
        .ptr_method("Rename", FuncSig::new(vec![NativeType::Str], vec![]), |_, _| {
            vec![]
        })
        .private_method("secret", FuncSig::new(vec![], vec![]), |_, _| vec![])
        .method("Age", FuncSig::new(vec![], vec![NativeType::Int(IntKind::I64)]), |_, _| {
            vec![0i64.into()]
        })
        .build()
}

#[test]
fn tag_parsing() {
    let entry = TagEntry::parse("script", "phone,omitempty");
    assert_eq!(entry.alias(), Some("phone"));
    assert!(!entry.is_omitted());
    assert_eq!(entry.options(), ["omitempty".to_string()]);

    assert!(TagEntry::parse("script", "-").is_omitted());
    assert!(TagEntry::parse("script", "-,").is_omitted());
    assert_eq!(TagEntry::parse("script", "").alias(), None);
}

#[test]
fn exposed_fields_follow_tag() {
    let def = contact();
    let exposed: Vec<&str> = def.exposed_fields("script").map(|(_, name)| name).collect();
    assert_eq!(exposed, vec!["Name", "phone", "Street", "Zip"]);

    let by_json: Vec<&str> = def.exposed_fields("json").map(|(_, name)| name).collect();
    assert_eq!(by_json, vec!["Name", "Phone", "Secret", "street", "Zip"]);

    assert_eq!(def.exposed_field("phone", "script"), Some(1));
    assert_eq!(def.exposed_field("Phone", "script"), None);
    assert_eq!(def.exposed_field("age", "script"), None);
}

#[test]
fn methods_sorted_and_filtered_by_receiver() {
    let def = contact();
    let by_value: Vec<&str> = def.method_set(false).map(MethodDef::name).collect();
    assert_eq!(by_value, vec!["Age", "Greet"]);
    let by_pointer: Vec<&str> = def.method_set(true).map(MethodDef::name).collect();
    assert_eq!(by_pointer, vec!["Age", "Greet", "Rename"]);
    assert!(def.find_method("secret", true).is_none());
    assert!(def.find_method("Rename", false).is_none());
}

#[test]
fn bound_method_receives_receiver() {
    let def = StructDef::builder("Counter")
        .field("N", NativeType::Int(IntKind::I64))
        .method("Get", FuncSig::new(vec![], vec![NativeType::Int(IntKind::I64)]), |recv, _| {
            vec![recv.as_struct().unwrap().get("N").unwrap().clone()]
        })
        .build();
    let obj = StructObj::zeroed(&def).with("N", 7i64);
    let method = def.find_method("Get", false).unwrap();
    let get = method.bind(obj.into());
    assert_eq!(get.invoke(vec![]), vec![NativeValue::from(7i64)]);
}

#[test]
fn struct_values_are_copies() {
    let def = contact();
    let a = StructObj::zeroed(&def).with("Name", "bob");
    let mut b = a.clone();
    b.fields_mut()[0] = "alice".into();
    assert_eq!(a.get("Name"), Some(&NativeValue::from("bob")));
    assert_ne!(a, b);
}

#[test]
#[should_panic(expected = "has no field Nope")]
fn with_unknown_field_panics() {
    let _ = StructObj::zeroed(&contact()).with("Nope", 1i64);
}
