#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::Arc;

use super::*;
use crate::{buffer_handler, TestElement, TypeMask};
use pretty_assertions::assert_eq;
use rill_value::EvalErrorKind;

fn interp() -> Interpreter {
    InterpreterBuilder::new()
        .config(EvalConfig::default().with_seed(3))
        .output(buffer_handler())
        .build()
}

fn eggs(yolks: &[i64]) -> Value {
    let elements = yolks
        .iter()
        .map(|&y| Arc::new(TestElement::new(y)) as ObjectRef)
        .collect();
    Value::object_vec(&crate::TEST_ELEMENT_CLASS, elements).unwrap()
}

fn doubled(args: &[Value], _: &mut dyn CallContext) -> EvalResult {
    let values = args[0].as_ints().unwrap_or_default().iter().map(|v| v * 2).collect();
    Ok(Value::int_vec(values))
}

fn greet(args: &[Value], ctx: &mut dyn CallContext) -> EvalResult {
    ctx.write_output(&format!("hello {}\n", args[0].string_at(0)?));
    Ok(Value::invisible_null())
}

fn too_many(_: &[Value], _: &mut dyn CallContext) -> EvalResult {
    Ok(Value::int_vec(vec![1, 2]))
}

// Methods

#[test]
fn instance_methods_run_per_element() {
    let mut interp = interp();
    let result = interp.execute_method_call(&eggs(&[2, 3]), "_cubicYolk", &[]).unwrap();
    assert_eq!(result, Value::int_vec(vec![8, 27]));
}

#[test]
fn instance_method_overflow_is_a_script_error() {
    let mut interp = interp();
    let err = interp
        .execute_method_call(&eggs(&[2, 3_000_000]), "_cubicYolk", &[])
        .unwrap_err();
    assert!(!err.is_internal());
    assert_eq!(err.message, "method _cubicYolk() overflowed cubing 3000000");
}

#[test]
fn inherited_str_lists_properties() {
    let mut interp = interp();
    let result = interp.execute_method_call(&eggs(&[5]), "str", &[]).unwrap();
    assert!(result.is_invisible());
    assert_eq!(interp.output().take(), "_TestElement:\n\t_yolk <-> (integer) 5\n");
}

#[test]
fn class_methods_run_once_for_the_receiver() {
    let mut interp = interp();
    interp
        .execute_method_call(&eggs(&[1, 2, 3]), "method", &[Value::string("_cubicYolk")])
        .unwrap();
    let listing = interp.output().take();
    assert_eq!(listing.lines().count(), 1);
    assert!(listing.contains("_cubicYolk"));
}

#[test]
fn empty_receivers_produce_null() {
    let mut interp = interp();
    let untagged = Value::empty_object(None);
    assert!(interp.execute_method_call(&untagged, "str", &[]).unwrap().is_null());
    let tagged = Value::empty_object(Some(&crate::TEST_ELEMENT_CLASS));
    assert!(interp.execute_method_call(&tagged, "_cubicYolk", &[]).unwrap().is_null());
}

#[test]
fn method_errors_name_the_receiver_type() {
    let mut interp = interp();
    let err = interp.execute_method_call(&Value::int(1), "str", &[]).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedMethod {
            method: "str".into(),
            class: "integer".into(),
        }
    );

    let err = interp.execute_method_call(&eggs(&[1]), "fly", &[]).unwrap_err();
    assert_eq!(err.message, "method fly() is not defined on object element type _TestElement");

    let err = interp
        .execute_method_call(&eggs(&[1]), "_cubicYolk", &[Value::int(1)])
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::TooManyArguments { .. }));
}

// Properties

#[test]
fn properties_read_and_write_across_elements() {
    let mut interp = interp();
    let x = eggs(&[1, 2]);
    assert_eq!(interp.get_property(&x, "_yolk").unwrap(), Value::int_vec(vec![1, 2]));

    interp.set_property(&x, "_yolk", &Value::int(4)).unwrap();
    assert_eq!(interp.get_property(&x, "_yolk").unwrap(), Value::int_vec(vec![4, 4]));

    interp.set_property(&x, "_yolk", &Value::int_vec(vec![7, 8])).unwrap();
    assert_eq!(interp.get_property(&x, "_yolk").unwrap(), Value::int_vec(vec![7, 8]));
}

#[test]
fn property_errors() {
    let mut interp = interp();
    let x = eggs(&[1, 2]);

    let err = interp
        .set_property(&x, "_yolk", &Value::int_vec(vec![1, 2, 3]))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::AssignmentLengthMismatch { targets: 2, values: 3, .. }));

    let err = interp.set_property(&x, "_yolk", &Value::string("a")).unwrap_err();
    assert!(!err.is_internal());

    let err = interp.get_property(&x, "shell").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedProperty { .. }));

    let err = interp.get_property(&Value::float(1.0), "_yolk").unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedProperty {
            property: "_yolk".into(),
            class: "float".into(),
        }
    );
}

// Host functions

#[test]
fn host_functions_dispatch_like_builtins() {
    let mut interp = interp();
    interp
        .register_function(
            CallSignature::function("doubled", TypeMask::INT).arg("x", TypeMask::INT),
            doubled,
        )
        .unwrap();
    interp
        .register_function(
            CallSignature::function("greet", TypeMask::NULL).arg("name", TypeMask::STRING.singleton()),
            greet,
        )
        .unwrap();

    assert_eq!(
        interp.execute_function_call("doubled", &[Value::int_vec(vec![1, 2])]).unwrap(),
        Value::int_vec(vec![2, 4])
    );
    interp.execute_function_call("greet", &[Value::string("rill")]).unwrap();
    assert_eq!(interp.output().take(), "hello rill\n");

    let err = interp.execute_function_call("doubled", &[Value::float(1.0)]).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ArgumentTypeMismatch { .. }));

    let names: Vec<_> = interp.function_signatures().iter().map(|s| s.name).collect();
    assert!(names.contains(&"doubled"));
    assert!(names.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn host_functions_cannot_shadow() {
    let mut interp = interp();
    let err = interp
        .register_function(CallSignature::function("abs", TypeMask::INT), doubled)
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::DuplicateFunction { name: "abs".into() });

    let sig = CallSignature::function("doubled", TypeMask::INT).arg("x", TypeMask::INT);
    interp.register_function(sig.clone(), doubled).unwrap();
    assert!(interp.register_function(sig, doubled).is_err());
}

#[test]
fn return_contracts_are_enforced() {
    let mut interp = interp();
    interp
        .register_function(CallSignature::function("broken", TypeMask::INT.singleton()), too_many)
        .unwrap();
    let err = interp.execute_function_call("broken", &[]).unwrap_err();
    assert!(err.is_internal());
    assert!(err.message.starts_with("(internal error) return value of function broken()"));
}

#[test]
fn host_functions_are_per_interpreter() {
    let mut first = interp();
    first
        .register_function(CallSignature::function("doubled", TypeMask::INT).arg("x", TypeMask::INT), doubled)
        .unwrap();
    let second = interp();
    assert!(first.resolve_function("doubled").is_some());
    assert!(second.resolve_function("doubled").is_none());
    assert!(second.resolve_function("abs").is_some());
}

// Configuration

#[test]
fn display_precision_follows_the_config() {
    let mut interp = InterpreterBuilder::new()
        .config(EvalConfig::default().with_float_precision(3))
        .output(buffer_handler())
        .build();
    interp
        .execute_function_call("print", &[Value::float(std::f64::consts::PI)])
        .unwrap();
    assert_eq!(interp.output().take(), "3.14\n");
    assert_eq!(interp.config().float_precision, 3);
}

#[test]
fn silent_output_discards_text() {
    let mut interp = InterpreterBuilder::new()
        .config(EvalConfig::default().with_output(crate::OutputMode::Silent))
        .build();
    interp.execute_function_call("print", &[Value::int(1)]).unwrap();
    assert_eq!(interp.output().captured(), "");
}

#[test]
fn seeded_interpreters_agree() {
    let draw = || {
        let mut interp = interp();
        interp.execute_function_call("rnorm", &[Value::int(5)]).unwrap()
    };
    assert_eq!(draw(), draw());
}
