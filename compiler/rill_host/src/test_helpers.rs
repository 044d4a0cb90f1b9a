//! Shared fixtures for host class tests.

use rill_value::{CallContext, DisplayOptions, ObjectRef};

use crate::population::Population;

/// A `CallContext` that captures output.
#[derive(Default)]
pub(crate) struct CaptureContext {
    pub(crate) output: String,
}

impl CallContext for CaptureContext {
    fn write_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn display_options(&self) -> DisplayOptions {
        DisplayOptions::default()
    }
}

/// Every individual of subpopulation `p{id}`, as protocol elements.
pub(crate) fn elements_of(population: &Population, id: i64) -> Vec<ObjectRef> {
    population
        .subpopulation(id)
        .ok()
        .and_then(|s| s.individuals_value().ok())
        .and_then(|v| v.as_objects().map(<[ObjectRef]>::to_vec))
        .unwrap_or_default()
}
