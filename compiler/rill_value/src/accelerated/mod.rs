//! Bulk property access over object collections.
//!
//! Reading or writing one property across thousands of objects is the hot
//! path of a large host. When a property signature carries an accelerated
//! getter or setter, the engine calls it once with the whole element slice
//! instead of dispatching through `ScriptObject` once per element.
//!
//! # Path selection
//!
//! The accelerated path is taken when the signature declares it and every
//! element has exactly the class that was resolved (homogeneity is checked
//! here, once, not inside each bulk body). Mixed-class slices, or properties
//! without a bulk body, take the per-element scalar path. Both paths produce
//! identical results and identical side effects.
//!
//! # Assignment shape
//!
//! A one-element value is broadcast to every target; otherwise the value
//! must have exactly one element per target. Any other length is an error.

#[cfg(test)]
mod tests;

use std::ptr;

use crate::errors::{
    assignment_length_mismatch, read_only_property, undefined_method, undefined_property,
    unrecognized_method_id,
};
use crate::signature::{MethodKind, MethodSignature};
use crate::{CallContext, ClassDescriptor, EvalError, EvalResult, ObjectRef, PropertySignature, Value};

/// The single class shared by every element, if there is one.
pub fn homogeneous_class(elements: &[ObjectRef]) -> Option<&'static ClassDescriptor> {
    let (first, rest) = elements.split_first()?;
    let class = first.class();
    rest.iter()
        .all(|element| ptr::eq(element.class(), class))
        .then_some(class)
}

fn is_homogeneous_as(elements: &[ObjectRef], class: &'static ClassDescriptor) -> bool {
    elements.iter().all(|element| ptr::eq(element.class(), class))
}

fn resolve_property<'c>(
    class: &'c ClassDescriptor,
    property: &str,
) -> Result<&'c PropertySignature, EvalError> {
    class
        .property(property)
        .ok_or_else(|| undefined_property(property, class.name()))
}

/// Read `property` from every element, choosing the fastest valid path.
///
/// `class` is the declared class of the collection; it resolves the
/// signature and decides the result shape for an empty collection.
#[tracing::instrument(level = "debug", skip(class, elements), fields(class = class.name(), count = elements.len()))]
pub fn get_property_of_elements(
    class: &'static ClassDescriptor,
    elements: &[ObjectRef],
    property: &str,
) -> EvalResult {
    let signature = resolve_property(class, property)?;
    if elements.is_empty() {
        return Ok(signature.empty_result());
    }

    match signature.getter {
        Some(getter) if is_homogeneous_as(elements, class) => {
            tracing::trace!(property, count = elements.len(), "accelerated get");
            let result = getter(elements)?;
            signature.check_result(&result, elements.len())?;
            Ok(result)
        }
        _ => read_per_element(signature, elements),
    }
}

/// Read `property` through each element's scalar `get_property`.
///
/// Always valid; this is what the accelerated path must be equivalent to.
pub fn get_property_per_element(
    class: &'static ClassDescriptor,
    elements: &[ObjectRef],
    property: &str,
) -> EvalResult {
    let signature = resolve_property(class, property)?;
    if elements.is_empty() {
        return Ok(signature.empty_result());
    }
    read_per_element(signature, elements)
}

fn read_per_element(signature: &PropertySignature, elements: &[ObjectRef]) -> EvalResult {
    tracing::trace!(property = signature.name, count = elements.len(), "per-element get");
    let mut parts = Vec::with_capacity(elements.len());
    for element in elements {
        let value = element.get_property(signature.name)?;
        signature.check_result(&value, 1)?;
        parts.push(value);
    }
    Value::concatenate(&parts)
}

/// Assign `value` to `property` on every element.
///
/// No guarantee is made about which elements were modified when an error
/// is returned part-way through.
#[tracing::instrument(level = "debug", skip(class, elements, value), fields(class = class.name(), count = elements.len()))]
pub fn set_property_of_elements(
    class: &'static ClassDescriptor,
    elements: &[ObjectRef],
    property: &str,
    value: &Value,
) -> Result<(), EvalError> {
    let signature = prepare_assignment(class, elements, property, value)?;
    match signature.setter {
        Some(setter) if !elements.is_empty() && is_homogeneous_as(elements, class) => {
            tracing::trace!(property, count = elements.len(), "accelerated set");
            setter(elements, value)
        }
        _ => write_per_element(signature, elements, value),
    }
}

/// Assign through each element's scalar `set_property`.
pub fn set_property_per_element(
    class: &'static ClassDescriptor,
    elements: &[ObjectRef],
    property: &str,
    value: &Value,
) -> Result<(), EvalError> {
    let signature = prepare_assignment(class, elements, property, value)?;
    write_per_element(signature, elements, value)
}

fn prepare_assignment<'c>(
    class: &'c ClassDescriptor,
    elements: &[ObjectRef],
    property: &str,
    value: &Value,
) -> Result<&'c PropertySignature, EvalError> {
    let signature = resolve_property(class, property)?;
    if signature.read_only {
        return Err(read_only_property(property, class.name()));
    }
    signature.check_assignable(value)?;

    let values = value.count();
    if signature.mask.is_singleton() && values != 1 && values != elements.len() {
        return Err(assignment_length_mismatch(
            &format!("property {property}"),
            elements.len(),
            values,
        ));
    }
    Ok(signature)
}

fn write_per_element(
    signature: &PropertySignature,
    elements: &[ObjectRef],
    value: &Value,
) -> Result<(), EvalError> {
    tracing::trace!(property = signature.name, count = elements.len(), "per-element set");
    let broadcast = !signature.mask.is_singleton() || value.count() == 1;
    for (index, element) in elements.iter().enumerate() {
        let result = if broadcast {
            element.set_property(signature.name, value)
        } else {
            element.set_property(signature.name, &value.element_value(index)?)
        };
        result.map_err(|err| err.with_note(format!("while assigning {} of element {index}", signature.name)))?;
    }
    Ok(())
}

/// Resolve a method on `class`, walking the superclass chain.
pub fn resolve_method<'c>(
    class: &'c ClassDescriptor,
    method: &str,
) -> Result<&'c MethodSignature, EvalError> {
    class
        .method(method)
        .ok_or_else(|| undefined_method(method, class.name()))
}

/// Run a method over every receiver element with already-checked arguments.
///
/// Class methods run once with the whole receiver. Instance methods use the
/// accelerated body for homogeneous receivers and otherwise run per element,
/// concatenating the results.
pub fn call_method_of_elements(
    class: &'static ClassDescriptor,
    signature: &MethodSignature,
    elements: &[ObjectRef],
    args: &[Value],
    ctx: &mut dyn CallContext,
) -> EvalResult {
    match signature.dispatch_kind()? {
        MethodKind::Class => match signature.class_impl {
            Some(body) => body(class, elements, args, ctx),
            None => Err(unrecognized_method_id(signature.name(), class.name())),
        },
        MethodKind::Instance => match signature.accelerated {
            Some(body) if !elements.is_empty() && is_homogeneous_as(elements, class) => {
                tracing::trace!(method = signature.name(), count = elements.len(), "accelerated method");
                body(elements, args, ctx)
            }
            _ => {
                let mut parts = Vec::with_capacity(elements.len());
                for element in elements {
                    parts.push(element.execute_instance_method(signature.name(), args, ctx)?);
                }
                if parts.is_empty() {
                    return Ok(Value::null());
                }
                Value::concatenate(&parts)
            }
        },
    }
}
