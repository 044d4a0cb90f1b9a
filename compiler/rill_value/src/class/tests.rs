#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{
    widgets, CaptureContext, Flags, Gizmo, Widget, GIZMO_CLASS, SPROCKET_CLASS, WIDGET_CLASS,
};
use crate::{DefaultValue, EvalErrorKind, ScriptObject};

static RELABELED_CLASS: ClassDescriptor = ClassDescriptor::new(
    "Relabeled",
    Some(&WIDGET_CLASS),
    relabeled_properties,
    relabeled_methods,
);

fn relabeled_properties() -> Vec<PropertySignature> {
    vec![
        PropertySignature::read_only("label", TypeMask::STRING.singleton()),
        PropertySignature::read_write("aliases", TypeMask::STRING),
    ]
}

fn relabeled_methods() -> Vec<MethodSignature> {
    vec![MethodSignature::instance("doubled", TypeMask::FLOAT)]
}

fn names(properties: &[PropertySignature]) -> Vec<&'static str> {
    properties.iter().map(|p| p.name).collect()
}

#[test]
fn subclass_relation_follows_the_chain() {
    assert!(GIZMO_CLASS.is_subclass_of(&GIZMO_CLASS));
    assert!(GIZMO_CLASS.is_subclass_of(&WIDGET_CLASS));
    assert!(GIZMO_CLASS.is_subclass_of(&OBJECT_CLASS));
    assert!(!WIDGET_CLASS.is_subclass_of(&GIZMO_CLASS));
    assert!(!SPROCKET_CLASS.is_subclass_of(&WIDGET_CLASS));
    assert_eq!(GIZMO_CLASS.superclass().map(ClassDescriptor::name), Some("Widget"));
    assert!(OBJECT_CLASS.superclass().is_none());
}

#[test]
fn properties_merge_superclass_and_sort() {
    assert_eq!(names(WIDGET_CLASS.properties()), ["id", "label", "tag", "weight"]);
    assert_eq!(names(GIZMO_CLASS.properties()), ["id", "label", "tag", "teeth", "weight"]);
    assert!(SPROCKET_CLASS.properties().is_empty());
}

#[test]
fn methods_inherit_root_methods() {
    let methods: Vec<_> = GIZMO_CLASS.methods().iter().map(MethodSignature::name).collect();
    assert_eq!(methods, ["doubled", "method", "property", "scaled", "str", "total"]);
    assert!(SPROCKET_CLASS.method("str").is_some());
    assert!(SPROCKET_CLASS.method("doubled").is_none());
}

#[test]
fn own_signatures_override_inherited_ones() {
    assert_eq!(
        names(RELABELED_CLASS.properties()),
        ["aliases", "id", "label", "tag", "weight"]
    );
    let label = RELABELED_CLASS.property("label").unwrap();
    assert!(label.read_only);
    assert!(!WIDGET_CLASS.property("label").unwrap().read_only);

    // cardinality change is allowed (with a warning) and the override wins
    let doubled = RELABELED_CLASS.method("doubled").unwrap();
    assert!(!doubled.call.return_mask.is_singleton());
    assert!(doubled.accelerated.is_none());
}

#[test]
fn lookup_by_name() {
    assert_eq!(WIDGET_CLASS.property("weight").unwrap().mask, TypeMask::FLOAT.singleton());
    assert!(WIDGET_CLASS.property("teeth").is_none());
    assert!(WIDGET_CLASS.method("total").unwrap().is_class_method);
}

#[test]
fn property_display() {
    let id = WIDGET_CLASS.property("id").unwrap();
    assert_eq!(id.to_string(), "id => (integer$)");
    let owner = PropertySignature::read_write("owner", TypeMask::OBJECT.singleton()).with_class(&WIDGET_CLASS);
    assert_eq!(owner.to_string(), "owner <-> (object<Widget>$)");
    assert_eq!(format!("{GIZMO_CLASS}"), "Gizmo");
}

#[test]
fn empty_results_match_the_declared_type() {
    let weight = WIDGET_CLASS.property("weight").unwrap();
    assert_eq!(weight.empty_result().type_name(), "float");
    let owner = PropertySignature::read_only("owner", TypeMask::OBJECT).with_class(&GIZMO_CLASS);
    assert_eq!(owner.empty_result().element_type_name(), "Gizmo");
    let mixed = PropertySignature::read_only("any", TypeMask::ANY_BASE);
    assert!(mixed.empty_result().is_null());
}

#[test]
fn assignability_checks_type_and_class() {
    let weight = WIDGET_CLASS.property("weight").unwrap();
    weight.check_assignable(&Value::float(1.0)).unwrap();
    let err = weight.check_assignable(&Value::string("heavy")).unwrap_err();
    assert_eq!(err.message, "invalid value for property weight: cannot be type string");

    let flags = Arc::new(Flags::default());
    let owner = PropertySignature::read_write("owner", TypeMask::OBJECT).with_class(&GIZMO_CLASS);
    let plain = Value::object_vec(&WIDGET_CLASS, widgets(1, &flags)).unwrap();
    assert!(owner.check_assignable(&plain).is_err());
    owner
        .check_assignable(&Value::object(Arc::new(Gizmo::new(1, 3, &flags))))
        .unwrap();
}

#[test]
fn result_checks_are_internal() {
    let id = WIDGET_CLASS.property("id").unwrap();
    id.check_result(&Value::int_vec(vec![1, 2]), 2).unwrap();
    let err = id.check_result(&Value::int_vec(vec![1]), 2).unwrap_err();
    assert!(err.is_internal());
    let err = id.check_result(&Value::float(1.0), 1).unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn method_lists_every_method_signature() {
    let mut ctx = CaptureContext::default();
    let listing = WIDGET_CLASS.method("method").unwrap();
    let body = listing.class_impl.unwrap();
    let result = body(&WIDGET_CLASS, &[], &[Value::null()], &mut ctx).unwrap();
    assert!(result.is_invisible());
    assert_eq!(
        ctx.output,
        "- (float$)doubled()\n\
         + (void)method([Ns$ methodName = NULL])\n\
         + (void)property([Ns$ propertyName = NULL])\n\
         - (float$)scaled(numeric$ factor)\n\
         - (void)str()\n\
         + (float$)total()\n"
    );
}

#[test]
fn property_listing_filters_by_name() {
    let mut ctx = CaptureContext::default();
    let body = WIDGET_CLASS.method("property").unwrap().class_impl.unwrap();
    body(&WIDGET_CLASS, &[], &[Value::string("weight")], &mut ctx).unwrap();
    assert_eq!(ctx.output, "weight <-> (float$)\n");

    let err = body(&WIDGET_CLASS, &[], &[Value::string("mass")], &mut ctx).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedProperty {
            property: "mass".into(),
            class: "Widget".into()
        }
    );
}

#[test]
fn method_listing_rejects_unknown_names() {
    let mut ctx = CaptureContext::default();
    let body = SPROCKET_CLASS.method("method").unwrap().class_impl.unwrap();
    let err = body(&SPROCKET_CLASS, &[], &[Value::string("spin")], &mut ctx).unwrap_err();
    assert_eq!(err.message, "method spin() is not defined on object element type Sprocket");
    assert!(ctx.output.is_empty());
}

#[test]
fn str_describes_every_property() {
    let flags = Arc::new(Flags::default());
    let widget = Widget::new(4, &flags);
    widget.set_property("weight", &Value::float(2.5)).unwrap();
    let mut ctx = CaptureContext::default();
    let result = widget.execute_instance_method("str", &[], &mut ctx).unwrap();
    assert!(result.is_invisible());
    assert_eq!(
        ctx.output,
        "Widget:\n\
         \tid => (integer) 4\n\
         \tlabel <-> (string) \"\"\n\
         \ttag <-> <inaccessible>\n\
         \tweight <-> (float) 2.5\n"
    );
}

#[test]
fn str_truncates_long_values() {
    static SERIES_CLASS: ClassDescriptor =
        ClassDescriptor::new("Series", Some(&OBJECT_CLASS), series_properties, Vec::new);

    fn series_properties() -> Vec<PropertySignature> {
        vec![PropertySignature::read_only("values", TypeMask::INT)]
    }

    let mut ctx = CaptureContext::default();
    let get = |_: &str| -> EvalResult { Ok(Value::int_vec(vec![5, 6, 7, 8])) };
    root_instance_method(&SERIES_CLASS, &get, "str", &mut ctx).unwrap();
    assert_eq!(ctx.output, "Series:\n\tvalues => (integer) 5 6 ... (4 values)\n");
}

#[test]
fn undeclared_names_reaching_the_root_are_internal() {
    let flags = Arc::new(Flags::default());
    let widget = Widget::new(0, &flags);
    let err = widget.get_property("volume").unwrap_err();
    assert!(err.is_internal());
    let err = widget.set_property("volume", &Value::int(1)).unwrap_err();
    assert!(err.is_internal());
    let mut ctx = CaptureContext::default();
    let err = widget
        .execute_instance_method("spin", &[], &mut ctx)
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UnrecognizedMethodId { .. }));
}

#[test]
fn default_value_display() {
    assert_eq!(DefaultValue::String("a b").to_string(), "\"a b\"");
    assert_eq!(DefaultValue::Logical(false).to_string(), "F");
}
