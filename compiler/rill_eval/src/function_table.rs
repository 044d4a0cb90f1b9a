//! Name to signature tables for free functions.
//!
//! Built-in functions live in one process-wide table built on first use and
//! never mutated afterwards. Each interpreter also owns a table of
//! host-registered functions; a host function may not reuse a built-in name.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rill_value::errors::duplicate_function;
use rill_value::{CallContext, CallSignature, EvalError, EvalResult, Value};
use rustc_hash::FxHashMap;

use crate::builtins;
use crate::Interpreter;

/// Body of a built-in: gets the whole interpreter (symbol table, generator, output).
pub type BuiltinFn = fn(&mut Interpreter, &[Value]) -> EvalResult;

/// Body of a host-registered function: gets only the call context.
pub type HostFn = fn(&[Value], &mut dyn CallContext) -> EvalResult;

/// Native implementation behind a signature.
#[derive(Copy, Clone)]
pub enum FunctionBody {
    Builtin(BuiltinFn),
    Host(HostFn),
}

/// A resolved function: its signature and its body.
pub struct FunctionEntry {
    pub signature: CallSignature,
    pub body: FunctionBody,
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.body {
            FunctionBody::Builtin(_) => "builtin",
            FunctionBody::Host(_) => "host",
        };
        write!(f, "FunctionEntry({kind} {})", self.signature)
    }
}

/// Flat name to entry map.
#[derive(Debug, Default)]
pub struct FunctionTable {
    entries: FxHashMap<&'static str, Arc<FunctionEntry>>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; names are unique within one table.
    pub fn insert(&mut self, signature: CallSignature, body: FunctionBody) -> Result<(), EvalError> {
        let name = signature.name;
        if self.entries.contains_key(name) {
            return Err(duplicate_function(name));
        }
        self.entries
            .insert(name, Arc::new(FunctionEntry { signature, body }));
        Ok(())
    }

    /// Register a built-in while the process-wide table is being built.
    pub(crate) fn builtin(&mut self, signature: CallSignature, body: BuiltinFn) {
        let name = signature.name;
        if let Err(err) = self.insert(signature, FunctionBody::Builtin(body)) {
            tracing::error!(name, %err, "built-in registered twice; keeping the first");
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<FunctionEntry>> {
        self.entries.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Every signature, sorted by name.
    pub fn signatures(&self) -> Vec<&CallSignature> {
        let mut signatures: Vec<_> = self.entries.values().map(|e| &e.signature).collect();
        signatures.sort_by_key(|s| s.name);
        signatures
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static BUILTINS: OnceLock<FunctionTable> = OnceLock::new();

/// The process-wide built-in function table.
pub fn builtin_functions() -> &'static FunctionTable {
    BUILTINS.get_or_init(|| {
        let mut table = FunctionTable::new();
        builtins::register_all(&mut table);
        tracing::debug!(count = table.len(), "built-in function table constructed");
        table
    })
}
