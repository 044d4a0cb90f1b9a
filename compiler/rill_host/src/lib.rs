#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add complexity across the crate"
)]
//! Rill Host - a reference population-genetics host for the Rill evaluator.
//!
//! This crate registers a small class hierarchy through the `rill_value`
//! object protocol:
//!
//! - `Dictionary`: a key/value store, superclass of `Individual`
//! - `Individual`: the hot-path class, with accelerated getters, setters and
//!   methods for most of its properties
//! - `Genome`: scalar-only properties and one instance method
//! - `Subpopulation`: a collection of individuals
//!
//! # Shared state
//!
//! Every host object holds an `Arc<HostContext>`: the model settings plus
//! the "ever set" flags a simulation checks to skip work (no colors assigned
//! means no color lookups). Flags are atomics so bulk setters can mark them
//! without locking.
//!
//! `Population` builds subpopulations of individuals for tests and demos.

mod context;
mod dictionary;
mod genome;
mod individual;
mod population;
mod subpopulation;

pub use context::{HostContext, HostFlag, ModelSettings, ModelType};
pub use dictionary::{Dictionary, DICTIONARY_CLASS};
pub use genome::{Genome, GenomeType, Mutation, GENOME_CLASS};
pub use individual::{Individual, Pedigree, Sex, INDIVIDUAL_CLASS};
pub use population::{Population, PopulationBuilder};
pub use subpopulation::{Subpopulation, SUBPOPULATION_CLASS};

#[cfg(test)]
mod test_helpers;
