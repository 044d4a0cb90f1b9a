//! `Subpopulation`: a numbered group of individuals.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use rill_value::errors::property_not_available;
use rill_value::{
    root_get_property, root_set_property, ClassDescriptor, EvalError, EvalResult, ObjectRef,
    PropertySignature, ScriptObject, TypeMask, Value, OBJECT_CLASS,
};

use crate::context::HostContext;
use crate::individual::{Individual, INDIVIDUAL_CLASS};

pub static SUBPOPULATION_CLASS: ClassDescriptor = ClassDescriptor::new(
    "Subpopulation",
    Some(&OBJECT_CLASS),
    subpopulation_properties,
    Vec::new,
);

fn subpopulation_properties() -> Vec<PropertySignature> {
    let int1 = TypeMask::INT.singleton();
    vec![
        PropertySignature::read_only("id", int1),
        PropertySignature::read_only("individualCount", int1),
        PropertySignature::read_only("individuals", TypeMask::OBJECT).with_class(&INDIVIDUAL_CLASS),
        PropertySignature::read_write("tag", int1),
    ]
}

#[derive(Debug)]
pub struct Subpopulation {
    id: i64,
    individuals: Mutex<Vec<Arc<Individual>>>,
    tag: Mutex<Option<i64>>,
    context: Arc<HostContext>,
}

impl Subpopulation {
    pub(crate) fn new(id: i64, context: &Arc<HostContext>) -> Self {
        Subpopulation {
            id,
            individuals: Mutex::new(Vec::new()),
            tag: Mutex::new(None),
            context: Arc::clone(context),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn context(&self) -> &Arc<HostContext> {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.individuals.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.lock().is_empty()
    }

    pub fn individual(&self, index: usize) -> Option<Arc<Individual>> {
        self.individuals.lock().get(index).cloned()
    }

    /// Append an individual; it must already carry the next free index.
    pub(crate) fn push(&self, individual: Arc<Individual>) {
        self.individuals.lock().push(individual);
    }

    /// Every individual as one script value.
    pub fn individuals_value(&self) -> EvalResult {
        let elements = self
            .individuals
            .lock()
            .iter()
            .map(|i| Arc::clone(i) as ObjectRef)
            .collect();
        Value::object_vec(&INDIVIDUAL_CLASS, elements)
    }
}

impl ScriptObject for Subpopulation {
    fn class(&self) -> &'static ClassDescriptor {
        &SUBPOPULATION_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn print_form(&self) -> String {
        format!("Subpopulation<p{}>", self.id)
    }

    fn get_property(&self, property: &str) -> EvalResult {
        match property {
            "id" => Ok(Value::int(self.id)),
            "individualCount" => Ok(Value::int(i64::try_from(self.len()).unwrap_or(i64::MAX))),
            "individuals" => self.individuals_value(),
            "tag" => self.tag.lock().map(Value::int).ok_or_else(|| {
                property_not_available("tag", "Subpopulation", "accessed on subpopulation before being set")
            }),
            _ => root_get_property(self.class(), property),
        }
    }

    fn set_property(&self, property: &str, value: &Value) -> Result<(), EvalError> {
        match property {
            "tag" => {
                *self.tag.lock() = Some(value.int_at(0)?);
                Ok(())
            }
            _ => root_set_property(self.class(), property),
        }
    }
}
