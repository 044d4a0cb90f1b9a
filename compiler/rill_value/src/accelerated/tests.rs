#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::atomic::Ordering;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::test_helpers::{
    widgets, CaptureContext, Flags, Gizmo, Sprocket, Widget, GIZMO_CLASS, SPROCKET_CLASS,
    WIDGET_CLASS,
};
use crate::{downcast, EvalErrorKind};

fn weights_of(elements: &[ObjectRef]) -> Vec<f64> {
    elements
        .iter()
        .map(|e| downcast::<Widget>(e).unwrap().weight())
        .collect()
}

fn mixed(flags: &Arc<Flags>) -> Vec<ObjectRef> {
    vec![
        Arc::new(Widget::new(0, flags)) as ObjectRef,
        Arc::new(Gizmo::new(1, 20, flags)),
        Arc::new(Widget::new(2, flags)),
    ]
}

// Reads

#[test]
fn accelerated_and_scalar_reads_agree() {
    for n in [0, 1, 2, 1000] {
        let flags = Arc::new(Flags::default());
        let elements = widgets(n, &flags);
        for property in ["id", "weight", "label"] {
            let fast = get_property_of_elements(&WIDGET_CLASS, &elements, property).unwrap();
            let slow = get_property_per_element(&WIDGET_CLASS, &elements, property).unwrap();
            assert_eq!(fast, slow, "{property} over {n} elements");
            assert_eq!(fast.count(), n);
            assert_eq!(fast.value_type(), slow.value_type());
        }
    }
}

#[test]
fn empty_reads_have_the_declared_type() {
    let result = get_property_of_elements(&WIDGET_CLASS, &[], "id").unwrap();
    assert_eq!(result.type_name(), "integer");
    assert!(result.is_empty());
}

#[test]
fn unavailable_property_fails_identically_on_both_paths() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(3, &flags);
    let fast = get_property_of_elements(&WIDGET_CLASS, &elements, "tag").unwrap_err();
    let slow = get_property_per_element(&WIDGET_CLASS, &elements, "tag").unwrap_err();
    assert_eq!(fast, slow);
    assert!(matches!(fast.kind, EvalErrorKind::PropertyNotAvailable { .. }));
    assert!(!fast.is_internal());
}

#[test]
fn undeclared_property_is_a_script_error() {
    let flags = Arc::new(Flags::default());
    let err = get_property_of_elements(&WIDGET_CLASS, &widgets(1, &flags), "teeth").unwrap_err();
    assert_eq!(err.message, "property teeth is not defined for object element type Widget");
}

#[test]
fn mixed_classes_read_per_element() {
    let flags = Arc::new(Flags::default());
    let elements = mixed(&flags);
    assert!(homogeneous_class(&elements).is_none());
    let ids = get_property_of_elements(&WIDGET_CLASS, &elements, "id").unwrap();
    assert_eq!(ids, Value::int_vec(vec![0, 1, 2]));
}

#[test]
fn inherited_getters_serve_subclasses() {
    let flags = Arc::new(Flags::default());
    let gizmos: Vec<ObjectRef> = vec![
        Arc::new(Gizmo::new(5, 8, &flags)) as ObjectRef,
        Arc::new(Gizmo::new(6, 9, &flags)),
    ];
    assert!(std::ptr::eq(homogeneous_class(&gizmos).unwrap(), &GIZMO_CLASS));
    let ids = get_property_of_elements(&GIZMO_CLASS, &gizmos, "id").unwrap();
    assert_eq!(ids, Value::int_vec(vec![5, 6]));
    let teeth = get_property_of_elements(&GIZMO_CLASS, &gizmos, "teeth").unwrap();
    assert_eq!(teeth, Value::int_vec(vec![8, 9]));
}

#[test]
fn bulk_bodies_reject_foreign_elements() {
    let err = downcast::<Widget>(&(Arc::new(Sprocket) as ObjectRef)).unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(err.kind, EvalErrorKind::ClassMismatch { got: "Sprocket", .. }));
}

// Writes

#[test]
fn broadcast_assignment_takes_the_accelerated_path() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(5, &flags);
    set_property_of_elements(&WIDGET_CLASS, &elements, "weight", &Value::float(3.0)).unwrap();
    assert_eq!(weights_of(&elements), vec![3.0; 5]);
    assert!(flags.weight_set.load(Ordering::Relaxed));
    assert_eq!(flags.scalar_writes.load(Ordering::Relaxed), 0);
}

#[test]
fn element_wise_assignment_matches_scalar_path() {
    let values = Value::float_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let fast_flags = Arc::new(Flags::default());
    let fast = widgets(5, &fast_flags);
    set_property_of_elements(&WIDGET_CLASS, &fast, "weight", &values).unwrap();

    let slow_flags = Arc::new(Flags::default());
    let slow = widgets(5, &slow_flags);
    set_property_per_element(&WIDGET_CLASS, &slow, "weight", &values).unwrap();

    assert_eq!(weights_of(&fast), weights_of(&slow));
    assert_eq!(weights_of(&fast), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert!(fast_flags.weight_set.load(Ordering::Relaxed));
    assert!(slow_flags.weight_set.load(Ordering::Relaxed));
    assert_eq!(slow_flags.scalar_writes.load(Ordering::Relaxed), 5);
}

#[test]
fn mismatched_assignment_length_is_rejected() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(5, &flags);
    let values = Value::float_vec(vec![1.0, 2.0, 3.0]);
    for result in [
        set_property_of_elements(&WIDGET_CLASS, &elements, "weight", &values),
        set_property_per_element(&WIDGET_CLASS, &elements, "weight", &values),
    ] {
        let err = result.unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::AssignmentLengthMismatch {
                target: "property weight".into(),
                targets: 5,
                values: 3
            }
        );
    }
    assert_eq!(weights_of(&elements), vec![0.0; 5]);
    assert!(!flags.weight_set.load(Ordering::Relaxed));
}

#[test]
fn invalid_values_fail_on_both_paths() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(2, &flags);
    let negative = Value::float(-1.0);
    let fast = set_property_of_elements(&WIDGET_CLASS, &elements, "weight", &negative).unwrap_err();
    let slow = set_property_per_element(&WIDGET_CLASS, &elements, "weight", &negative).unwrap_err();
    assert_eq!(fast.kind, slow.kind);
    assert!(matches!(fast.kind, EvalErrorKind::InvalidPropertyValue { .. }));
    assert_eq!(slow.notes, vec!["while assigning weight of element 0".to_string()]);

    let nan = Value::float_vec(vec![1.0, f64::NAN]);
    let err = set_property_per_element(&WIDGET_CLASS, &elements, "weight", &nan).unwrap_err();
    assert_eq!(err.notes, vec!["while assigning weight of element 1".to_string()]);
}

#[test]
fn wrong_type_is_rejected_before_any_write() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(2, &flags);
    let err = set_property_of_elements(&WIDGET_CLASS, &elements, "weight", &Value::string("x"))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidPropertyValue { .. }));
    assert_eq!(flags.scalar_writes.load(Ordering::Relaxed), 0);
}

#[test]
fn read_only_properties_reject_assignment() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(2, &flags);
    let err = set_property_of_elements(&WIDGET_CLASS, &elements, "id", &Value::int(9)).unwrap_err();
    assert_eq!(err.message, "property id of Widget is read-only");
}

#[test]
fn mixed_classes_write_per_element() {
    let flags = Arc::new(Flags::default());
    let elements = mixed(&flags);
    set_property_of_elements(&WIDGET_CLASS, &elements, "tag", &Value::int_vec(vec![7, 8, 9])).unwrap();
    assert_eq!(flags.scalar_writes.load(Ordering::Relaxed), 3);
    let tags = get_property_of_elements(&WIDGET_CLASS, &elements, "tag").unwrap();
    assert_eq!(tags, Value::int_vec(vec![7, 8, 9]));
}

#[test]
fn properties_without_bulk_setters_write_per_element() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(3, &flags);
    set_property_of_elements(&WIDGET_CLASS, &elements, "label", &Value::string("w")).unwrap();
    assert_eq!(flags.scalar_writes.load(Ordering::Relaxed), 3);
    let labels = get_property_of_elements(&WIDGET_CLASS, &elements, "label").unwrap();
    assert_eq!(labels, Value::string_vec(vec!["w".into(); 3]));
}

proptest! {
    #[test]
    fn both_assignment_paths_leave_identical_state(
        weights in prop::collection::vec(0.0f64..1e6, 1..40),
        broadcast in any::<bool>(),
    ) {
        let n = weights.len();
        let value = if broadcast { Value::float(weights[0]) } else { Value::float_vec(weights) };

        let fast_flags = Arc::new(Flags::default());
        let fast = widgets(n, &fast_flags);
        set_property_of_elements(&WIDGET_CLASS, &fast, "weight", &value).unwrap();

        let slow_flags = Arc::new(Flags::default());
        let slow = widgets(n, &slow_flags);
        set_property_per_element(&WIDGET_CLASS, &slow, "weight", &value).unwrap();

        prop_assert_eq!(weights_of(&fast), weights_of(&slow));
        prop_assert_eq!(
            get_property_of_elements(&WIDGET_CLASS, &fast, "weight").unwrap(),
            get_property_per_element(&WIDGET_CLASS, &slow, "weight").unwrap()
        );
        prop_assert_eq!(
            fast_flags.weight_set.load(Ordering::Relaxed),
            slow_flags.weight_set.load(Ordering::Relaxed)
        );
    }
}

// Methods

#[test]
fn accelerated_and_scalar_methods_agree() {
    let flags = Arc::new(Flags::default());
    let homogeneous = widgets(4, &flags);
    set_property_of_elements(&WIDGET_CLASS, &homogeneous, "weight", &Value::float(1.5)).unwrap();
    let mut ctx = CaptureContext::default();

    let doubled = resolve_method(&WIDGET_CLASS, "doubled").unwrap();
    let fast = call_method_of_elements(&WIDGET_CLASS, doubled, &homogeneous, &[], &mut ctx).unwrap();
    assert_eq!(fast, Value::float_vec(vec![3.0; 4]));

    let mixed = mixed(&flags);
    set_property_of_elements(&WIDGET_CLASS, &mixed, "weight", &Value::float(1.5)).unwrap();
    let slow = call_method_of_elements(&WIDGET_CLASS, doubled, &mixed, &[], &mut ctx).unwrap();
    assert_eq!(slow, Value::float_vec(vec![3.0; 3]));
}

#[test]
fn instance_methods_receive_checked_arguments() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(2, &flags);
    set_property_of_elements(&WIDGET_CLASS, &elements, "weight", &Value::float_vec(vec![1.0, 2.0]))
        .unwrap();
    let scaled = resolve_method(&WIDGET_CLASS, "scaled").unwrap();
    let args = scaled.call.check_arguments(&[Value::int(3)]).unwrap();
    let mut ctx = CaptureContext::default();
    let result = call_method_of_elements(&WIDGET_CLASS, scaled, &elements, &args, &mut ctx).unwrap();
    assert_eq!(result, Value::float_vec(vec![3.0, 6.0]));
}

#[test]
fn class_methods_run_once_over_all_elements() {
    let flags = Arc::new(Flags::default());
    let elements = widgets(3, &flags);
    set_property_of_elements(&WIDGET_CLASS, &elements, "weight", &Value::float_vec(vec![1.0, 2.0, 4.0]))
        .unwrap();
    let total = resolve_method(&WIDGET_CLASS, "total").unwrap();
    let mut ctx = CaptureContext::default();
    let result = call_method_of_elements(&WIDGET_CLASS, total, &elements, &[], &mut ctx).unwrap();
    assert_eq!(result, Value::float(7.0));
}

#[test]
fn empty_receiver_yields_null_for_instance_methods() {
    let doubled = resolve_method(&WIDGET_CLASS, "doubled").unwrap();
    let mut ctx = CaptureContext::default();
    let result = call_method_of_elements(&WIDGET_CLASS, doubled, &[], &[], &mut ctx).unwrap();
    assert!(result.is_null());
}

#[test]
fn root_methods_reach_every_class() {
    let str_method = resolve_method(&SPROCKET_CLASS, "str").unwrap();
    let mut ctx = CaptureContext::default();
    let elements: Vec<ObjectRef> = vec![Arc::new(Sprocket) as ObjectRef];
    let result = call_method_of_elements(&SPROCKET_CLASS, str_method, &elements, &[], &mut ctx).unwrap();
    assert!(result.is_invisible());
    assert_eq!(ctx.output, "Sprocket:\n");

    let err = resolve_method(&SPROCKET_CLASS, "spin").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedMethod { .. }));
}

#[test]
fn broken_dispatch_flags_are_internal() {
    let mut broken = resolve_method(&WIDGET_CLASS, "doubled").unwrap().clone();
    broken.is_class_method = true;
    let mut ctx = CaptureContext::default();
    let err = call_method_of_elements(&WIDGET_CLASS, &broken, &[], &[], &mut ctx).unwrap_err();
    assert!(err.is_internal());
}
