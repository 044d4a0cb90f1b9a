//! `Individual`: the class scripts touch most, so most of its properties
//! carry accelerated getters and setters (see `bulk`).
//!
//! Several properties are lazily invalid: `tag` and `tagF` until first set,
//! `age` in Wright-Fisher models, and the pedigree properties when pedigree
//! tracking is off. Both access paths report these identically.

mod bulk;
mod pedigree;


use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use rill_value::errors::{invalid_property_value, property_not_available};
use rill_value::{
    downcast, root_get_property, root_instance_method, root_set_property, CallContext,
    ClassDescriptor, EvalError, EvalResult, MethodSignature, ObjectRef, PropertySignature,
    ScriptObject, TypeMask, Value,
};

use crate::context::{HostContext, HostFlag};
use crate::dictionary::{Entries, DICTIONARY_CLASS};
use crate::genome::{Genome, GENOME_CLASS};

pub use pedigree::Pedigree;

pub static INDIVIDUAL_CLASS: ClassDescriptor = ClassDescriptor::new(
    "Individual",
    Some(&DICTIONARY_CLASS),
    individual_properties,
    individual_methods,
);

fn individual_properties() -> Vec<PropertySignature> {
    let int1 = TypeMask::INT.singleton();
    let float1 = TypeMask::FLOAT.singleton();
    let genome1 = TypeMask::OBJECT.singleton();
    vec![
        PropertySignature::read_write("age", int1)
            .accelerated_get(bulk::get_age)
            .accelerated_set(bulk::set_age),
        PropertySignature::read_write("color", TypeMask::STRING.singleton())
            .accelerated_set(bulk::set_color),
        PropertySignature::read_write("fitnessScaling", float1)
            .accelerated_get(bulk::get_fitness_scaling)
            .accelerated_set(bulk::set_fitness_scaling),
        PropertySignature::read_only("genome1", genome1)
            .with_class(&GENOME_CLASS)
            .accelerated_get(bulk::get_genome1),
        PropertySignature::read_only("genome2", genome1)
            .with_class(&GENOME_CLASS)
            .accelerated_get(bulk::get_genome2),
        PropertySignature::read_only("genomes", TypeMask::OBJECT).with_class(&GENOME_CLASS),
        PropertySignature::read_only("index", int1).accelerated_get(bulk::get_index),
        PropertySignature::read_only("migrant", TypeMask::LOGICAL.singleton())
            .accelerated_get(bulk::get_migrant),
        PropertySignature::read_only("pedigreeGrandparentIDs", TypeMask::INT),
        PropertySignature::read_only("pedigreeID", int1).accelerated_get(bulk::get_pedigree_id),
        PropertySignature::read_only("pedigreeParentIDs", TypeMask::INT),
        PropertySignature::read_only("sex", TypeMask::STRING.singleton()),
        PropertySignature::read_only("subpopulationID", int1),
        PropertySignature::read_write("tag", int1)
            .accelerated_get(bulk::get_tag)
            .accelerated_set(bulk::set_tag),
        PropertySignature::read_write("tagF", float1)
            .accelerated_get(bulk::get_tag_f)
            .accelerated_set(bulk::set_tag_f),
        PropertySignature::read_write("x", float1)
            .accelerated_get(bulk::get_x)
            .accelerated_set(bulk::set_x),
        PropertySignature::read_write("y", float1)
            .accelerated_get(bulk::get_y)
            .accelerated_set(bulk::set_y),
        PropertySignature::read_write("z", float1)
            .accelerated_get(bulk::get_z)
            .accelerated_set(bulk::set_z),
    ]
}

fn individual_methods() -> Vec<MethodSignature> {
    let mut_type = TypeMask::INT.singleton();
    vec![
        MethodSignature::instance("countOfMutationsOfType", TypeMask::INT.singleton())
            .arg("mutType", mut_type),
        MethodSignature::instance("relatedness", TypeMask::FLOAT).arg_object(
            "individuals",
            TypeMask::OBJECT,
            &INDIVIDUAL_CLASS,
        ),
        MethodSignature::class_method("setSpatialPosition", TypeMask::NULL, bulk::set_spatial_position)
            .arg("position", TypeMask::FLOAT),
        MethodSignature::instance("sumOfMutationsOfType", TypeMask::FLOAT.singleton())
            .arg("mutType", mut_type)
            .accelerated(bulk::sum_of_mutations_of_type),
    ]
}

/// Hermaphrodite, female or male.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sex {
    Hermaphrodite,
    Female,
    Male,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Sex::Hermaphrodite => "H",
            Sex::Female => "F",
            Sex::Male => "M",
        }
    }
}

#[derive(Debug)]
struct IndividualState {
    age: i64,
    tag: Option<i64>,
    tag_f: Option<f64>,
    fitness_scaling: f64,
    position: [f64; 3],
    color: String,
}

impl Default for IndividualState {
    fn default() -> Self {
        IndividualState {
            age: 0,
            tag: None,
            tag_f: None,
            fitness_scaling: 1.0,
            position: [0.0; 3],
            color: String::new(),
        }
    }
}

#[derive(Debug)]
pub struct Individual {
    index: usize,
    subpopulation_id: i64,
    sex: Sex,
    migrant: bool,
    pedigree: Option<Pedigree>,
    genomes: [Arc<Genome>; 2],
    state: Mutex<IndividualState>,
    entries: Entries,
    context: Arc<HostContext>,
}

/// Where a new individual sits and what it inherits.
pub(crate) struct Placement {
    pub(crate) index: usize,
    pub(crate) subpopulation_id: i64,
    pub(crate) sex: Sex,
    pub(crate) migrant: bool,
    pub(crate) pedigree: Option<Pedigree>,
}

impl Individual {
    pub(crate) fn new(placement: Placement, genomes: [Arc<Genome>; 2], context: &Arc<HostContext>) -> Self {
        Individual {
            index: placement.index,
            subpopulation_id: placement.subpopulation_id,
            sex: placement.sex,
            migrant: placement.migrant,
            pedigree: placement.pedigree,
            genomes,
            state: Mutex::new(IndividualState::default()),
            entries: Entries::default(),
            context: Arc::clone(context),
        }
    }

    /// Position within its subpopulation.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn subpopulation_id(&self) -> i64 {
        self.subpopulation_id
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// `None` when pedigree tracking is off.
    pub fn pedigree(&self) -> Option<&Pedigree> {
        self.pedigree.as_ref()
    }

    /// Genome 0 or 1.
    pub fn genome(&self, which: usize) -> Option<&Arc<Genome>> {
        self.genomes.get(which)
    }

    pub fn tag(&self) -> Option<i64> {
        self.state.lock().tag
    }

    pub fn fitness_scaling(&self) -> f64 {
        self.state.lock().fitness_scaling
    }

    /// Spatial coordinates; axes beyond the model's dimensionality stay 0.
    pub fn position(&self) -> [f64; 3] {
        self.state.lock().position
    }

    fn index_value(&self) -> i64 {
        i64::try_from(self.index).unwrap_or(i64::MAX)
    }

    fn pedigree_or_unavailable(&self, property: &str) -> Result<&Pedigree, EvalError> {
        self.pedigree.as_ref().ok_or_else(|| {
            property_not_available(property, "Individual", "pedigree tracking is not enabled")
        })
    }

    fn age_or_unavailable(&self) -> Result<i64, EvalError> {
        if self.context.is_wright_fisher() {
            return Err(wf_age_error());
        }
        Ok(self.state.lock().age)
    }

    fn tag_or_unavailable(&self) -> Result<i64, EvalError> {
        self.state.lock().tag.ok_or_else(|| unset_error("tag"))
    }

    fn tag_f_or_unavailable(&self) -> Result<f64, EvalError> {
        self.state.lock().tag_f.ok_or_else(|| unset_error("tagF"))
    }

    fn genome_value(&self, which: usize) -> Value {
        Value::object(Arc::clone(&self.genomes[which]) as ObjectRef)
    }

    /// Mutations of one type across both genomes.
    fn count_of_type(&self, mutation_type: i64) -> i64 {
        let count: usize = self.genomes.iter().map(|g| g.count_of_type(mutation_type)).sum();
        i64::try_from(count).unwrap_or(i64::MAX)
    }

    fn sum_of_type(&self, mutation_type: i64) -> f64 {
        self.genomes.iter().map(|g| g.sum_of_type(mutation_type)).sum()
    }

    /// Relatedness to each of `others`.
    fn relatedness_to(&self, others: &[ObjectRef]) -> EvalResult {
        let mut out = Vec::with_capacity(others.len());
        for other in others {
            let other = downcast::<Individual>(other)?;
            let coefficient = match (&self.pedigree, &other.pedigree) {
                (Some(a), Some(b)) => a.relatedness(b),
                _ if std::ptr::eq(self, other) => 1.0,
                _ => 0.0,
            };
            out.push(coefficient);
        }
        Ok(Value::float_vec(out))
    }
}

fn unset_error(property: &str) -> EvalError {
    property_not_available(property, "Individual", "accessed on individual before being set")
}

fn wf_age_error() -> EvalError {
    property_not_available("age", "Individual", "not available in WF models")
}

fn valid_fitness_scaling(value: f64) -> Result<f64, EvalError> {
    if value.is_nan() || value < 0.0 {
        return Err(invalid_property_value(
            "fitnessScaling",
            format!("must be >= 0.0 and not NAN (got {value})"),
        ));
    }
    Ok(value)
}

impl ScriptObject for Individual {
    fn class(&self) -> &'static ClassDescriptor {
        &INDIVIDUAL_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn print_form(&self) -> String {
        format!("Individual<p{}:{}>", self.subpopulation_id, self.index)
    }

    fn get_property(&self, property: &str) -> EvalResult {
        match property {
            "age" => self.age_or_unavailable().map(Value::int),
            "color" => Ok(Value::string(self.state.lock().color.clone())),
            "fitnessScaling" => Ok(Value::float(self.fitness_scaling())),
            "genome1" => Ok(self.genome_value(0)),
            "genome2" => Ok(self.genome_value(1)),
            "genomes" => Value::object_vec(
                &GENOME_CLASS,
                self.genomes.iter().map(|g| Arc::clone(g) as ObjectRef).collect(),
            ),
            "index" => Ok(Value::int(self.index_value())),
            "migrant" => Ok(Value::logical(self.migrant)),
            "pedigreeGrandparentIDs" => {
                let pedigree = self.pedigree_or_unavailable(property)?;
                Ok(Value::int_vec(pedigree.grandparents.to_vec()))
            }
            "pedigreeID" => Ok(Value::int(self.pedigree_or_unavailable(property)?.id)),
            "pedigreeParentIDs" => {
                let pedigree = self.pedigree_or_unavailable(property)?;
                Ok(Value::int_vec(pedigree.parents.to_vec()))
            }
            "sex" => Ok(Value::string(self.sex.code())),
            "subpopulationID" => Ok(Value::int(self.subpopulation_id)),
            "tag" => self.tag_or_unavailable().map(Value::int),
            "tagF" => self.tag_f_or_unavailable().map(Value::float),
            "x" => Ok(Value::float(self.position()[0])),
            "y" => Ok(Value::float(self.position()[1])),
            "z" => Ok(Value::float(self.position()[2])),
            _ => root_get_property(self.class(), property),
        }
    }

    fn set_property(&self, property: &str, value: &Value) -> Result<(), EvalError> {
        match property {
            "age" => {
                if self.context.is_wright_fisher() {
                    return Err(wf_age_error());
                }
                self.state.lock().age = value.int_at(0)?;
            }
            "color" => {
                self.state.lock().color = value.string_at(0)?;
                self.context.mark(HostFlag::Color);
            }
            "fitnessScaling" => {
                self.state.lock().fitness_scaling = valid_fitness_scaling(value.float_at(0)?)?;
                self.context.mark(HostFlag::FitnessScaling);
            }
            "tag" => {
                self.state.lock().tag = Some(value.int_at(0)?);
                self.context.mark(HostFlag::Tag);
            }
            "tagF" => {
                self.state.lock().tag_f = Some(value.float_at(0)?);
                self.context.mark(HostFlag::Tag);
            }
            "x" => self.state.lock().position[0] = value.float_at(0)?,
            "y" => self.state.lock().position[1] = value.float_at(0)?,
            "z" => self.state.lock().position[2] = value.float_at(0)?,
            _ => return root_set_property(self.class(), property),
        }
        Ok(())
    }

    fn execute_instance_method(&self, method: &str, args: &[Value], ctx: &mut dyn CallContext) -> EvalResult {
        match method {
            "countOfMutationsOfType" => Ok(Value::int(self.count_of_type(args[0].int_at(0)?))),
            "relatedness" => self.relatedness_to(args[0].as_objects().unwrap_or_default()),
            "sumOfMutationsOfType" => Ok(Value::float(self.sum_of_type(args[0].int_at(0)?))),
            _ => match self.entries.execute(&self.context, method, args) {
                Some(result) => result,
                None => root_instance_method(self.class(), &|p| self.get_property(p), method, ctx),
            },
        }
    }
}
