use super::*;
use crate::Converter;
use pretty_assertions::assert_eq;
use tether_native::{FuncSig, IntKind};
use tether_value::EvalErrorKind;

fn i64_ty() -> NativeType {
    NativeType::Int(IntKind::I64)
}

fn callable(name: &str, func: NativeFunc) -> Value {
    Converter::new()
        .to_value_named(name, &NativeValue::Func(func))
        .unwrap()
}

fn call(value: &Value, args: &[Value]) -> EvalResult {
    value.as_object().unwrap().as_callable().unwrap().call(args, &[])
}

fn greet() -> NativeFunc {
    NativeFunc::new(
        FuncSig::new(vec![NativeType::Str], vec![NativeType::Str]),
        |args| vec![format!("hello {}", args[0].as_str().unwrap_or_default()).into()],
    )
}

#[test]
fn arguments_and_results_are_converted() {
    let f = callable("greet", greet());
    assert_eq!(
        call(&f, &[Value::string("world")]).unwrap(),
        Value::string("hello world")
    );
}

#[test]
fn arity_is_checked() {
    let f = callable("greet", greet());
    let err = call(&f, &[]).unwrap_err();
    assert_eq!(err.message, "greet: got 0 arguments, want 1");
    assert!(matches!(err.kind, EvalErrorKind::ArityMismatch { .. }));
}

#[test]
fn argument_errors_name_the_position() {
    let f = callable("greet", greet());
    let err = call(&f, &[Value::int(1)]).unwrap_err();
    assert_eq!(
        err.message,
        "greet: argument 1: value of type int cannot be converted to type String"
    );
}

#[test]
fn keyword_arguments_are_rejected() {
    let f = callable("greet", greet());
    let err = f
        .as_object()
        .unwrap()
        .as_callable()
        .unwrap()
        .call(&[Value::string("x")], &[("loud".to_string(), Value::Bool(true))])
        .unwrap_err();
    assert_eq!(err.message, "greet: unexpected keyword arguments");
}

#[test]
fn variadic_arguments_collect_into_a_slice() {
    let count = NativeFunc::new(
        FuncSig::variadic(vec![NativeType::Str], i64_ty(), vec![i64_ty()]),
        |args| {
            let total: i64 = args[1]
                .seq_items()
                .unwrap_or_default()
                .iter()
                .filter_map(NativeValue::as_i64)
                .sum();
            vec![total.into()]
        },
    );
    let f = callable("sum", count);
    assert_eq!(
        call(&f, &[Value::string("x"), Value::int(1), Value::int(2), Value::int(3)]).unwrap(),
        Value::int(6)
    );
    assert_eq!(call(&f, &[Value::string("x")]).unwrap(), Value::int(0));

    let err = call(&f, &[]).unwrap_err();
    assert_eq!(err.message, "sum: got 0 arguments, want at least 1");

    let err = call(&f, &[Value::string("x"), Value::string("y")]).unwrap_err();
    assert_eq!(
        err.message,
        "sum: argument 2: value of type string cannot be converted to type i64"
    );
}

#[test]
fn trailing_error_becomes_a_script_error() {
    let parse = NativeFunc::new(
        FuncSig::new(vec![NativeType::Str], vec![i64_ty(), NativeType::Error]),
        |args| match args[0].as_str().and_then(|s| s.parse::<i64>().ok()) {
            Some(n) => vec![n.into(), NativeValue::Nil],
            None => vec![0i64.into(), NativeValue::error("not a number")],
        },
    );
    let f = callable("parse", parse);
    assert_eq!(call(&f, &[Value::string("42")]).unwrap(), Value::int(42));

    let err = call(&f, &[Value::string("x")]).unwrap_err();
    assert_eq!(err.message, "not a number");
    assert!(matches!(err.kind, EvalErrorKind::Host { .. }));
}

#[test]
fn multiple_results_become_a_tuple() {
    let split = NativeFunc::new(
        FuncSig::new(vec![], vec![i64_ty(), NativeType::Str]),
        |_| vec![1i64.into(), "a".into()],
    );
    let f = callable("split", split);
    assert_eq!(
        call(&f, &[]).unwrap(),
        Value::tuple(vec![Value::int(1), Value::string("a")])
    );

    let nothing = NativeFunc::new(FuncSig::new(vec![], vec![]), |_| vec![]);
    assert_eq!(call(&callable("nothing", nothing), &[]).unwrap(), Value::None);
}

#[test]
fn functions_hash_by_identity() {
    let func = greet();
    let a = callable("a", func.clone());
    let b = callable("b", func);
    assert_eq!(a.hash().unwrap(), b.hash().unwrap());
    assert_eq!(a.type_name(), "tether_fn<fn(String) -> String>");
}

#[test]
fn make_callable_names_the_function() {
    let f = make_callable("greet", &NativeValue::Func(greet()));
    assert_eq!(f.to_string(), "<native function greet: fn(String) -> String>");
}

#[test]
#[should_panic(expected = "not a function")]
fn make_callable_rejects_non_functions() {
    make_callable("x", &NativeValue::from(1i64));
}

#[test]
fn results_keep_the_converter_tag() {
    let def = tether_native::StructDef::builder("Account")
        .field_with_tags("Owner", NativeType::Str, &[("script", "owner"), ("db", "owner_name")])
        .build();
    let ret = NativeType::ptr(NativeType::strukt(&def));
    let open = NativeFunc::new(FuncSig::new(vec![], vec![ret]), move |_| {
        let obj = tether_native::StructObj::new(&def, vec!["ann".into()]);
        vec![NativeValue::ptr_to(obj.into())]
    });
    let f = Converter::with_tag("db")
        .to_value_named("open", &NativeValue::Func(open))
        .unwrap();

    let account = call(&f, &[]).unwrap();
    let attrs = account.as_object().unwrap().as_attrs().unwrap();
    assert_eq!(attrs.attr("owner_name").unwrap(), Some(Value::string("ann")));
    assert_eq!(attrs.attr("owner").unwrap(), None);
}
