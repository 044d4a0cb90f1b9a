#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add complexity across the crate"
)]
//! Rill Eval - function dispatch and the built-in library for the Rill evaluator.
//!
//! This crate provides the engine an evaluator calls once it has resolved a
//! call name and evaluated the arguments.
//!
//! # Architecture
//!
//! - `Interpreter`: per-execution state and the dispatch entry points
//!   (`execute_function_call`, `execute_method_call`, `get_property`,
//!   `set_property`)
//! - `FunctionTable`: flat name to signature maps; built-ins are built once
//!   per process, host functions are registered per interpreter
//! - `builtins`: native implementations of every built-in function
//! - `Environment`: nested symbol tables with the intrinsic constants
//! - `ScriptRng`: the seeded random generator behind `sample`, `rnorm`, ...
//! - `OutputHandler`: where `print`, `cat` and listings write
//!
//! # Re-exports
//!
//! Value, signature and class types come from `rill_value` and are
//! re-exported here for convenience.

mod builtins;
mod config;
mod environment;
mod function_table;
pub mod interpreter;
mod output;
mod rng;
mod test_element;

use std::sync::Once;

pub use config::{EvalConfig, OutputMode};
pub use environment::{Environment, LocalScope, Mutability, Scope};
pub use function_table::{
    builtin_functions, BuiltinFn, FunctionBody, FunctionEntry, FunctionTable, HostFn,
};
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use output::{
    buffer_handler, handler_for, silent_handler, stdout_handler, OutputHandler, SharedOutput,
};
pub use rng::{generate_seed, ScriptRng};
pub use test_element::{TestElement, TEST_ELEMENT_CLASS};

pub use rill_value::{
    CallContext, CallSignature, ClassDescriptor, DefaultValue, DisplayOptions, EvalError,
    EvalErrorKind, EvalResult, MethodSignature, ObjectRef, PropertySignature, ScriptObject,
    TypeMask, Value, ValueType,
};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber, once per process.
///
/// Does nothing unless `RUST_LOG` is set. With `RILL_LOG_TREE` also set,
/// spans render as an indented tree instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let tree = std::env::var_os("RILL_LOG_TREE").is_some();
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(tree.then(|| tracing_tree::HierarchicalLayer::new(2).with_targets(true)))
                .with((!tree).then(|| fmt::layer().with_target(true).with_level(true)))
                .init();
        }
    });
}
