//! The root `Object` class.

use crate::errors::{
    undefined_method, undefined_property, unrecognized_method_id, unrecognized_property_id,
};
use crate::{
    CallContext, ClassDescriptor, DefaultValue, EvalError, EvalResult, MethodSignature, ObjectRef,
    PropertySignature, TypeMask, Value,
};

/// Ultimate superclass of every host class.
pub static OBJECT_CLASS: ClassDescriptor =
    ClassDescriptor::new("Object", None, no_properties, root_methods);

fn no_properties() -> Vec<PropertySignature> {
    Vec::new()
}

fn root_methods() -> Vec<MethodSignature> {
    let name_mask = (TypeMask::STRING | TypeMask::NULL).singleton();
    vec![
        MethodSignature::class_method("method", TypeMask::NULL, list_methods).optional(
            "methodName",
            name_mask,
            DefaultValue::Null,
        ),
        MethodSignature::class_method("property", TypeMask::NULL, list_properties).optional(
            "propertyName",
            name_mask,
            DefaultValue::Null,
        ),
        MethodSignature::instance("str", TypeMask::NULL),
    ]
}

fn name_filter(args: &[Value]) -> Result<Option<String>, EvalError> {
    match args.first() {
        Some(arg) if !arg.is_null() => Ok(Some(arg.string_at(0)?)),
        _ => Ok(None),
    }
}

fn list_methods(
    class: &'static ClassDescriptor,
    _elements: &[ObjectRef],
    args: &[Value],
    ctx: &mut dyn CallContext,
) -> EvalResult {
    let filter = name_filter(args)?;
    let mut out = String::new();
    for method in class.methods() {
        if filter.as_deref().map_or(true, |name| name == method.name()) {
            out.push_str(&format!("{method}\n"));
        }
    }
    if let (Some(name), true) = (&filter, out.is_empty()) {
        return Err(undefined_method(name, class.name()));
    }
    ctx.write_output(&out);
    Ok(Value::invisible_null())
}

fn list_properties(
    class: &'static ClassDescriptor,
    _elements: &[ObjectRef],
    args: &[Value],
    ctx: &mut dyn CallContext,
) -> EvalResult {
    let filter = name_filter(args)?;
    let mut out = String::new();
    for property in class.properties() {
        if filter.as_deref().map_or(true, |name| name == property.name) {
            out.push_str(&format!("{property}\n"));
        }
    }
    if let (Some(name), true) = (&filter, out.is_empty()) {
        return Err(undefined_property(name, class.name()));
    }
    ctx.write_output(&out);
    Ok(Value::invisible_null())
}

/// Instance methods every object understands; the end of every
/// `execute_instance_method` delegation chain.
///
/// `get` reads a property of the receiving element.
pub fn root_instance_method(
    class: &'static ClassDescriptor,
    get: &dyn Fn(&str) -> EvalResult,
    method: &str,
    ctx: &mut dyn CallContext,
) -> EvalResult {
    match method {
        "str" => {
            let opts = ctx.display_options();
            let mut out = format!("{}:\n", class.name());
            for property in class.properties() {
                let arrow = if property.read_only { "=>" } else { "<->" };
                match get(property.name) {
                    Ok(value) => {
                        let shown = if value.count() <= 2 {
                            value.print_form(opts)
                        } else {
                            let head = value.subset(&[0, 1])?.print_form(opts);
                            format!("{head} ... ({} values)", value.count())
                        };
                        out.push_str(&format!(
                            "\t{} {arrow} ({}) {shown}\n",
                            property.name,
                            value.type_name()
                        ));
                    }
                    Err(err) if err.is_internal() => return Err(err),
                    Err(_) => {
                        out.push_str(&format!("\t{} {arrow} <inaccessible>\n", property.name));
                    }
                }
            }
            ctx.write_output(&out);
            Ok(Value::invisible_null())
        }
        _ => Err(unrecognized_method_id(method, class.name())),
    }
}

/// End of every `get_property` delegation chain.
pub fn root_get_property(class: &'static ClassDescriptor, property: &str) -> EvalResult {
    Err(unrecognized_property_id(property, class.name()))
}

/// End of every `set_property` delegation chain.
pub fn root_set_property(class: &'static ClassDescriptor, property: &str) -> Result<(), EvalError> {
    Err(unrecognized_property_id(property, class.name()))
}
