//! Concatenation with type promotion.

use std::ptr;

use super::{Elements, ObjectVector, Value, ValueType};
use crate::errors::{mixed_object_classes, object_scalar_mix};
use crate::{ClassDescriptor, EvalResult};

impl Value {
    /// Concatenate `values` into one value of the highest type present.
    ///
    /// Scalar types promote along `NULL < logical < integer < float < string`.
    /// Objects never mix with scalars, and all non-empty object arguments
    /// must share one class; empty object arguments impose no class. NULL
    /// arguments contribute nothing. If every argument is NULL the result is
    /// NULL, invisible only if every argument was invisible.
    pub fn concatenate(values: &[Value]) -> EvalResult {
        let mut highest = ValueType::Null;
        let mut has_object = false;
        let mut has_scalar = false;
        let mut class: Option<&'static ClassDescriptor> = None;
        let mut empty_class: Option<&'static ClassDescriptor> = None;
        let mut all_invisible = !values.is_empty();
        let mut total = 0usize;

        for value in values {
            if !value.is_invisible() {
                all_invisible = false;
            }
            match value {
                Value::Null { .. } => continue,
                Value::Object(objects) => {
                    has_object = true;
                    if objects.is_empty() {
                        empty_class = empty_class.or(objects.class());
                    } else if let Some(this) = objects.class() {
                        match class {
                            Some(seen) if !ptr::eq(seen, this) => {
                                return Err(mixed_object_classes(seen.name(), this.name()));
                            }
                            _ => class = Some(this),
                        }
                    }
                }
                scalar => {
                    has_scalar = true;
                    highest = highest.max(scalar.value_type());
                }
            }
            total = total.saturating_add(value.count());
        }

        if has_object && has_scalar {
            return Err(object_scalar_mix());
        }

        if has_object {
            let mut elements = Vec::with_capacity(total);
            for value in values {
                if let Some(objects) = value.as_objects() {
                    elements.extend(objects.iter().cloned());
                }
            }
            return Ok(Value::Object(ObjectVector {
                class: class.or(empty_class),
                elements: Elements::from_vec(elements),
            }));
        }

        if !has_scalar {
            return Ok(if all_invisible {
                Value::invisible_null()
            } else {
                Value::null()
            });
        }

        let mut result = Value::empty_of(highest);
        for value in values {
            for index in 0..value.count() {
                result.push_value_from_index_of(index, value)?;
            }
        }
        Ok(result)
    }
}
