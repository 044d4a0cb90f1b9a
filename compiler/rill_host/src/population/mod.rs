//! Building populations of host objects.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use rill_value::errors::undefined_identifier;
use rill_value::EvalError;

use crate::context::{HostContext, ModelSettings, ModelType};
use crate::genome::{Genome, GenomeType};
use crate::individual::{Individual, Pedigree, Placement, Sex};
use crate::subpopulation::Subpopulation;

#[derive(Copy, Clone, Debug)]
enum Founders {
    Hermaphrodites(usize),
    Sexual { females: usize, males: usize },
}

/// Builder for [`Population`].
#[derive(Debug, Default)]
#[must_use]
pub struct PopulationBuilder {
    settings: ModelSettings,
    subpopulations: Vec<(i64, Founders)>,
}

impl PopulationBuilder {
    pub fn pedigrees(mut self, enabled: bool) -> Self {
        self.settings.pedigrees = enabled;
        self
    }

    pub fn dimensionality(mut self, dimensions: usize) -> Self {
        self.settings.dimensionality = dimensions;
        self
    }

    pub fn model(mut self, model: ModelType) -> Self {
        self.settings.model = model;
        self
    }

    pub fn sex_chromosomes(mut self, enabled: bool) -> Self {
        self.settings.sex_chromosomes = enabled;
        self
    }

    /// Add subpopulation `p{id}` of hermaphroditic founders.
    pub fn subpopulation(mut self, id: i64, size: usize) -> Self {
        self.subpopulations.push((id, Founders::Hermaphrodites(size)));
        self
    }

    /// Add subpopulation `p{id}` with `females` females followed by `males` males.
    pub fn sexual_subpopulation(mut self, id: i64, females: usize, males: usize) -> Self {
        self.subpopulations.push((id, Founders::Sexual { females, males }));
        self
    }

    pub fn build(self) -> Population {
        let mut population = Population {
            context: Arc::new(HostContext::new(self.settings)),
            subpopulations: Vec::new(),
        };
        for (id, founders) in self.subpopulations {
            let subpopulation = Arc::new(Subpopulation::new(id, &population.context));
            let sexes: Vec<Sex> = match founders {
                Founders::Hermaphrodites(size) => vec![Sex::Hermaphrodite; size],
                Founders::Sexual { females, males } => std::iter::repeat(Sex::Female)
                    .take(females)
                    .chain(std::iter::repeat(Sex::Male).take(males))
                    .collect(),
            };
            for sex in sexes {
                let pedigree = population.new_pedigree(Pedigree::founder);
                population.place(&subpopulation, sex, false, pedigree);
            }
            tracing::debug!(subpopulation = id, size = subpopulation.len(), "created subpopulation");
            population.subpopulations.push(subpopulation);
        }
        population
    }
}

/// Subpopulations sharing one host context.
#[derive(Debug)]
pub struct Population {
    context: Arc<HostContext>,
    subpopulations: Vec<Arc<Subpopulation>>,
}

impl Population {
    pub fn builder() -> PopulationBuilder {
        PopulationBuilder::default()
    }

    pub fn context(&self) -> &Arc<HostContext> {
        &self.context
    }

    pub fn subpopulations(&self) -> &[Arc<Subpopulation>] {
        &self.subpopulations
    }

    /// Subpopulation `p{id}`.
    pub fn subpopulation(&self, id: i64) -> Result<&Arc<Subpopulation>, EvalError> {
        self.subpopulations
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| undefined_identifier(&format!("p{id}")))
    }

    /// Add the offspring of two parents to subpopulation `p{id}`.
    ///
    /// The offspring is a migrant when it lands outside its first parent's
    /// subpopulation.
    pub fn add_offspring(
        &self,
        id: i64,
        parent1: &Individual,
        parent2: &Individual,
        sex: Sex,
    ) -> Result<Arc<Individual>, EvalError> {
        let subpopulation = self.subpopulation(id)?;
        let pedigree = match (parent1.pedigree(), parent2.pedigree()) {
            (Some(p1), Some(p2)) => self.new_pedigree(|child| Pedigree::offspring(child, p1, p2)),
            _ => None,
        };
        let migrant = parent1.subpopulation_id() != id;
        Ok(self.place(subpopulation, sex, migrant, pedigree))
    }

    fn new_pedigree(&self, make: impl FnOnce(i64) -> Pedigree) -> Option<Pedigree> {
        self.context
            .tracks_pedigrees()
            .then(|| make(self.context.next_pedigree_id()))
    }

    fn place(
        &self,
        subpopulation: &Subpopulation,
        sex: Sex,
        migrant: bool,
        pedigree: Option<Pedigree>,
    ) -> Arc<Individual> {
        let placement = Placement {
            index: subpopulation.len(),
            subpopulation_id: subpopulation.id(),
            sex,
            migrant,
            pedigree,
        };
        let individual = Arc::new(Individual::new(placement, self.genomes_for(sex), &self.context));
        subpopulation.push(Arc::clone(&individual));
        individual
    }

    /// Two autosomes, or an X pair / X plus null Y when sex chromosomes are modelled.
    fn genomes_for(&self, sex: Sex) -> [Arc<Genome>; 2] {
        let ctx = &self.context;
        let genome = |genome_type| Arc::new(Genome::new(genome_type, ctx));
        match (ctx.settings().sex_chromosomes, sex) {
            (true, Sex::Female) => [genome(GenomeType::XChromosome), genome(GenomeType::XChromosome)],
            (true, Sex::Male) => [
                genome(GenomeType::XChromosome),
                Arc::new(Genome::null(GenomeType::YChromosome, ctx)),
            ],
            _ => [genome(GenomeType::Autosome), genome(GenomeType::Autosome)],
        }
    }
}
