//! Interpreter configuration.
//!
//! Defaults can be overlaid from the environment with [`EvalConfig::from_env`]:
//!
//! | Variable | Effect |
//! |---|---|
//! | `RILL_FLOAT_PRECISION` | significant digits used to display floats (1-17) |
//! | `RILL_SEED` | seed for the random generator |
//!
//! Malformed values are ignored with a warning.

use rill_value::DisplayOptions;

/// Where script output goes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Stdout,
    Buffer,
    Silent,
}

/// Settings fixed when an interpreter is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Significant digits for float display; never affects stored values.
    pub float_precision: usize,
    /// Random seed; `None` derives one from the clock and process id.
    pub seed: Option<u64>,
    pub output: OutputMode,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            float_precision: DisplayOptions::DEFAULT_PRECISION,
            seed: None,
            output: OutputMode::Stdout,
        }
    }
}

impl EvalConfig {
    /// Defaults overlaid with `RILL_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("RILL_FLOAT_PRECISION") {
            match raw.trim().parse::<usize>() {
                Ok(precision) => self = self.with_float_precision(precision),
                Err(err) => tracing::warn!(value = %raw, %err, "ignoring RILL_FLOAT_PRECISION"),
            }
        }
        if let Some(raw) = lookup("RILL_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(err) => tracing::warn!(value = %raw, %err, "ignoring RILL_SEED"),
            }
        }
        self
    }

    /// Set float display precision, clamped to `1..=17`.
    #[must_use]
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = DisplayOptions::with_float_precision(precision).float_precision;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions::with_float_precision(self.float_precision)
    }
}
