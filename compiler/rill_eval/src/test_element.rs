//! `_TestElement`, the evaluator's own object class.
//!
//! Created by `_Test(yolk)`. Lets object dispatch, property access and the
//! bulk protocol be exercised without a host.

use std::any::Any;

use parking_lot::Mutex;
use rill_value::errors::invalid_argument;
use rill_value::{
    downcast, root_get_property, root_instance_method, root_set_property, CallContext,
    ClassDescriptor, EvalError, EvalResult, MethodSignature, ObjectRef, PropertySignature,
    ScriptObject, TypeMask, Value, OBJECT_CLASS,
};

pub static TEST_ELEMENT_CLASS: ClassDescriptor = ClassDescriptor::new(
    "_TestElement",
    Some(&OBJECT_CLASS),
    test_element_properties,
    test_element_methods,
);

fn test_element_properties() -> Vec<PropertySignature> {
    vec![PropertySignature::read_write("_yolk", TypeMask::INT.singleton())
        .accelerated_get(get_yolks)
        .accelerated_set(set_yolks)]
}

fn test_element_methods() -> Vec<MethodSignature> {
    vec![MethodSignature::instance("_cubicYolk", TypeMask::INT.singleton())]
}

#[derive(Debug)]
pub struct TestElement {
    yolk: Mutex<i64>,
}

impl TestElement {
    pub fn new(yolk: i64) -> Self {
        TestElement {
            yolk: Mutex::new(yolk),
        }
    }

    pub fn yolk(&self) -> i64 {
        *self.yolk.lock()
    }
}

impl ScriptObject for TestElement {
    fn class(&self) -> &'static ClassDescriptor {
        &TEST_ELEMENT_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_property(&self, property: &str) -> EvalResult {
        match property {
            "_yolk" => Ok(Value::int(self.yolk())),
            _ => root_get_property(self.class(), property),
        }
    }

    fn set_property(&self, property: &str, value: &Value) -> Result<(), EvalError> {
        match property {
            "_yolk" => {
                *self.yolk.lock() = value.int_at(0)?;
                Ok(())
            }
            _ => root_set_property(self.class(), property),
        }
    }

    fn execute_instance_method(&self, method: &str, args: &[Value], ctx: &mut dyn CallContext) -> EvalResult {
        match method {
            "_cubicYolk" => {
                let yolk = self.yolk();
                yolk
                    .checked_mul(yolk)
                    .and_then(|square| square.checked_mul(yolk))
                    .map(Value::int)
                    .ok_or_else(|| {
                        invalid_argument("method _cubicYolk()", format!("overflowed cubing {yolk}"))
                    })
            }
            _ => {
                let _ = args;
                root_instance_method(self.class(), &|p| self.get_property(p), method, ctx)
            }
        }
    }
}

fn get_yolks(elements: &[ObjectRef]) -> EvalResult {
    let yolks = elements
        .iter()
        .map(|e| downcast::<TestElement>(e).map(TestElement::yolk))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::int_vec(yolks))
}

fn set_yolks(elements: &[ObjectRef], value: &Value) -> Result<(), EvalError> {
    let broadcast = value.count() == 1;
    for (index, element) in elements.iter().enumerate() {
        let yolk = value.int_at(if broadcast { 0 } else { index })?;
        *downcast::<TestElement>(element)?.yolk.lock() = yolk;
    }
    Ok(())
}
