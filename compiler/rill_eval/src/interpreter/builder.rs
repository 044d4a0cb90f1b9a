//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use super::Interpreter;
use crate::function_table::FunctionTable;
use crate::output::{handler_for, SharedOutput};
use crate::rng::{generate_seed, ScriptRng};
use crate::{Environment, EvalConfig};

/// Builder for creating Interpreter instances.
///
/// The configuration decides the default output handler and seed; an
/// explicit handler or environment overrides it.
#[derive(Default)]
pub struct InterpreterBuilder {
    config: EvalConfig,
    output: Option<SharedOutput>,
    env: Option<Environment>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the output handler, e.g. a buffer shared with the host.
    ///
    /// Overrides the handler implied by the configured output mode.
    #[must_use]
    pub fn output(mut self, handler: SharedOutput) -> Self {
        self.output = Some(handler);
        self
    }

    /// Start from an existing symbol table instead of a fresh one.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    pub fn build(self) -> Interpreter {
        let seed = self.config.seed.unwrap_or_else(generate_seed);
        tracing::debug!(seed, precision = self.config.float_precision, "building interpreter");
        Interpreter {
            display: self.config.display_options(),
            env: self.env.unwrap_or_default(),
            rng: ScriptRng::new(seed),
            output: self.output.unwrap_or_else(|| handler_for(self.config.output)),
            host_functions: FunctionTable::new(),
            config: self.config,
        }
    }
}
