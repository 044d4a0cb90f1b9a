//! `Genome`: one haploid set of mutations.
//!
//! Genomes only implement the scalar property path, so reads over a genome
//! vector always go element by element.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use rill_value::errors::{invalid_argument, property_not_available};
use rill_value::{
    root_get_property, root_instance_method, root_set_property, CallContext, ClassDescriptor,
    EvalError, EvalResult, MethodSignature, PropertySignature, ScriptObject, TypeMask, Value,
    OBJECT_CLASS,
};

use crate::context::{HostContext, HostFlag};

pub static GENOME_CLASS: ClassDescriptor = ClassDescriptor::new(
    "Genome",
    Some(&OBJECT_CLASS),
    genome_properties,
    genome_methods,
);

fn genome_properties() -> Vec<PropertySignature> {
    vec![
        PropertySignature::read_only("genomeType", TypeMask::STRING.singleton()),
        PropertySignature::read_only("isNullGenome", TypeMask::LOGICAL.singleton()),
        PropertySignature::read_only("mutationCount", TypeMask::INT.singleton()),
        PropertySignature::read_write("tag", TypeMask::INT.singleton()),
    ]
}

fn genome_methods() -> Vec<MethodSignature> {
    vec![MethodSignature::instance("countOfMutationsOfType", TypeMask::INT.singleton())
        .arg("mutType", TypeMask::INT.singleton())]
}

/// Which chromosome a genome carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenomeType {
    Autosome,
    XChromosome,
    YChromosome,
}

impl GenomeType {
    pub fn code(self) -> &'static str {
        match self {
            GenomeType::Autosome => "A",
            GenomeType::XChromosome => "X",
            GenomeType::YChromosome => "Y",
        }
    }
}

/// A mutation carried by a genome.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mutation {
    /// Identifier of the mutation type (`m1` is 1).
    pub mutation_type: i64,
    pub selection_coeff: f64,
}

#[derive(Debug, Default)]
struct GenomeState {
    mutations: Vec<Mutation>,
    tag: Option<i64>,
}

#[derive(Debug)]
pub struct Genome {
    genome_type: GenomeType,
    is_null: bool,
    state: Mutex<GenomeState>,
    context: Arc<HostContext>,
}

impl Genome {
    pub fn new(genome_type: GenomeType, context: &Arc<HostContext>) -> Self {
        Self::with_null(genome_type, false, context)
    }

    /// A placeholder genome that carries nothing (the Y of an X-modelled male).
    pub fn null(genome_type: GenomeType, context: &Arc<HostContext>) -> Self {
        Self::with_null(genome_type, true, context)
    }

    fn with_null(genome_type: GenomeType, is_null: bool, context: &Arc<HostContext>) -> Self {
        Genome {
            genome_type,
            is_null,
            state: Mutex::new(GenomeState::default()),
            context: Arc::clone(context),
        }
    }

    pub fn genome_type(&self) -> GenomeType {
        self.genome_type
    }

    pub fn is_null(&self) -> bool {
        self.is_null
    }

    pub fn context(&self) -> &Arc<HostContext> {
        &self.context
    }

    /// Add a mutation. Null genomes cannot carry mutations.
    pub fn add_mutation(&self, mutation: Mutation) -> Result<(), EvalError> {
        if self.is_null {
            return Err(EvalError::new("a null genome cannot carry mutations"));
        }
        self.state.lock().mutations.push(mutation);
        Ok(())
    }

    pub fn mutation_count(&self) -> usize {
        self.state.lock().mutations.len()
    }

    /// Mutations of one type; zero for a null genome.
    pub fn count_of_type(&self, mutation_type: i64) -> usize {
        self.state
            .lock()
            .mutations
            .iter()
            .filter(|m| m.mutation_type == mutation_type)
            .count()
    }

    /// Summed selection coefficients of one mutation type.
    pub fn sum_of_type(&self, mutation_type: i64) -> f64 {
        self.state
            .lock()
            .mutations
            .iter()
            .filter(|m| m.mutation_type == mutation_type)
            .map(|m| m.selection_coeff)
            .sum()
    }

    fn count_value(count: usize) -> Value {
        Value::int(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

impl ScriptObject for Genome {
    fn class(&self) -> &'static ClassDescriptor {
        &GENOME_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn print_form(&self) -> String {
        if self.is_null {
            format!("Genome<{}:null>", self.genome_type.code())
        } else {
            format!("Genome<{}:{}>", self.genome_type.code(), self.mutation_count())
        }
    }

    fn get_property(&self, property: &str) -> EvalResult {
        match property {
            "genomeType" => Ok(Value::string(self.genome_type.code())),
            "isNullGenome" => Ok(Value::logical(self.is_null)),
            "mutationCount" => {
                if self.is_null {
                    return Err(property_not_available(
                        "mutationCount",
                        "Genome",
                        "cannot be accessed on a null genome",
                    ));
                }
                Ok(Self::count_value(self.mutation_count()))
            }
            "tag" => self.state.lock().tag.map(Value::int).ok_or_else(|| {
                property_not_available("tag", "Genome", "accessed on genome before being set")
            }),
            _ => root_get_property(self.class(), property),
        }
    }

    fn set_property(&self, property: &str, value: &Value) -> Result<(), EvalError> {
        match property {
            "tag" => {
                self.state.lock().tag = Some(value.int_at(0)?);
                self.context.mark(HostFlag::Tag);
                Ok(())
            }
            _ => root_set_property(self.class(), property),
        }
    }

    fn execute_instance_method(&self, method: &str, args: &[Value], ctx: &mut dyn CallContext) -> EvalResult {
        match method {
            "countOfMutationsOfType" => {
                if self.is_null {
                    return Err(invalid_argument(
                        "method countOfMutationsOfType()",
                        "cannot be called on a null genome",
                    ));
                }
                Ok(Self::count_value(self.count_of_type(args[0].int_at(0)?)))
            }
            _ => root_instance_method(self.class(), &|p| self.get_property(p), method, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

    use super::*;
    use crate::test_helpers::CaptureContext;
    use pretty_assertions::assert_eq;
    use rill_value::EvalErrorKind;

    fn genome() -> Genome {
        let g = Genome::new(GenomeType::Autosome, &Arc::new(HostContext::default()));
        for (mutation_type, selection_coeff) in [(1, 0.1), (2, -0.5), (1, 0.25)] {
            g.add_mutation(Mutation {
                mutation_type,
                selection_coeff,
            })
            .unwrap();
        }
        g
    }

    #[test]
    fn counts_and_sums_by_type() {
        let g = genome();
        assert_eq!(g.count_of_type(1), 2);
        assert_eq!(g.count_of_type(3), 0);
        assert!((g.sum_of_type(1) - 0.35).abs() < 1e-12);
        assert_eq!(g.get_property("mutationCount").unwrap(), Value::int(3));
        assert_eq!(g.print_form(), "Genome<A:3>");

        let mut ctx = CaptureContext::default();
        let count = g
            .execute_instance_method("countOfMutationsOfType", &[Value::int(2)], &mut ctx)
            .unwrap();
        assert_eq!(count, Value::int(1));
    }

    #[test]
    fn tag_is_unavailable_until_set() {
        let g = genome();
        let err = g.get_property("tag").unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::PropertyNotAvailable { .. }));
        assert!(!g.context().is_set(HostFlag::Tag));
        g.set_property("tag", &Value::int(9)).unwrap();
        assert_eq!(g.get_property("tag").unwrap(), Value::int(9));
        assert!(g.context().is_set(HostFlag::Tag));
    }

    #[test]
    fn null_genomes_refuse_mutation_queries() {
        let g = Genome::null(GenomeType::YChromosome, &Arc::new(HostContext::default()));
        assert_eq!(g.get_property("isNullGenome").unwrap(), Value::logical(true));
        assert_eq!(g.get_property("genomeType").unwrap(), Value::string("Y"));
        assert!(g.get_property("mutationCount").is_err());
        assert!(g
            .add_mutation(Mutation {
                mutation_type: 1,
                selection_coeff: 0.0
            })
            .is_err());

        let mut ctx = CaptureContext::default();
        let err = g
            .execute_instance_method("countOfMutationsOfType", &[Value::int(1)], &mut ctx)
            .unwrap_err();
        assert_eq!(err.message, "method countOfMutationsOfType() cannot be called on a null genome");
        assert_eq!(g.print_form(), "Genome<Y:null>");
    }
}
