//! The dispatch engine.
//!
//! An [`Interpreter`] owns everything one script execution needs: the
//! symbol table, the random generator, the output handler and the table of
//! host-registered functions. The evaluator above it hands over resolved
//! call names and already-evaluated arguments; every call runs the same
//! sequence:
//!
//! 1. resolve the signature (function tables, or the receiver's class chain)
//! 2. check the arguments, filling in defaults
//! 3. run the native body
//! 4. check the result against the declared return contract
//!
//! Any failure is returned as `Err` and unwinds with `?` to whatever
//! boundary started the script execution.

mod builder;

#[cfg(test)]
mod tests;

pub use builder::InterpreterBuilder;

use rill_value::accelerated::{
    call_method_of_elements, get_property_of_elements, resolve_method, set_property_of_elements,
};
use rill_value::errors::{undefined_method, undefined_property, unrecognized_function};
use rill_value::{
    CallContext, CallSignature, ClassDescriptor, DisplayOptions, EvalError, EvalResult, MethodKind,
    ObjectRef, Value, OBJECT_CLASS,
};

use crate::function_table::{builtin_functions, FunctionBody, FunctionEntry, FunctionTable, HostFn};
use crate::output::SharedOutput;
use crate::rng::ScriptRng;
use crate::{Environment, EvalConfig};

/// One evaluation context.
pub struct Interpreter {
    config: EvalConfig,
    display: DisplayOptions,
    pub(crate) env: Environment,
    pub(crate) rng: ScriptRng,
    output: SharedOutput,
    host_functions: FunctionTable,
}

impl Interpreter {
    /// An interpreter with default configuration writing to stdout.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    #[inline]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    #[inline]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    #[inline]
    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    #[inline]
    pub fn rng_mut(&mut self) -> &mut ScriptRng {
        &mut self.rng
    }

    /// The output handler; hosts read captured output through it.
    #[inline]
    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    /// Register a host function. Built-in names and earlier host names are taken.
    pub fn register_function(&mut self, signature: CallSignature, body: HostFn) -> Result<(), EvalError> {
        if builtin_functions().contains(signature.name) {
            return Err(rill_value::errors::duplicate_function(signature.name));
        }
        tracing::debug!(name = signature.name, "registering host function");
        self.host_functions.insert(signature, FunctionBody::Host(body))
    }

    /// Built-in and host signatures together, sorted by name.
    pub fn function_signatures(&self) -> Vec<&CallSignature> {
        let mut signatures = builtin_functions().signatures();
        signatures.extend(self.host_functions.signatures());
        signatures.sort_by_key(|s| s.name);
        signatures
    }

    /// Look up a function by name, built-ins first.
    pub fn resolve_function(&self, name: &str) -> Option<std::sync::Arc<FunctionEntry>> {
        builtin_functions()
            .get(name)
            .or_else(|| self.host_functions.get(name))
            .cloned()
    }

    /// Call the free function `name` with positional `args`.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.len()))]
    pub fn execute_function_call(&mut self, name: &str, args: &[Value]) -> EvalResult {
        let entry = self
            .resolve_function(name)
            .ok_or_else(|| unrecognized_function(name))?;
        let checked = entry.signature.check_arguments(args)?;
        let result = match entry.body {
            FunctionBody::Builtin(body) => body(self, &checked)?,
            FunctionBody::Host(body) => body(&checked, self)?,
        };
        entry.signature.check_return(&result)?;
        Ok(result)
    }

    /// Call `method` on every element of `receiver`.
    ///
    /// Class methods run once over the whole receiver; instance methods run
    /// per element (or through an accelerated body) and concatenate.
    #[tracing::instrument(level = "debug", skip(self, receiver, args), fields(receivers = receiver.count()))]
    pub fn execute_method_call(&mut self, receiver: &Value, method: &str, args: &[Value]) -> EvalResult {
        let (class, elements) = receiver_parts(receiver)
            .ok_or_else(|| undefined_method(method, receiver.type_name()))?;
        let signature = resolve_method(class, method)?;
        let checked = signature.call.check_arguments(args)?;
        let result = call_method_of_elements(class, signature, elements, &checked, self)?;
        match signature.dispatch_kind()? {
            MethodKind::Class => signature.call.check_return(&result)?,
            MethodKind::Instance => signature
                .call
                .check_vectorized_return(&result, elements.len())?,
        }
        Ok(result)
    }

    /// Read `property` from every element of `receiver`.
    pub fn get_property(&self, receiver: &Value, property: &str) -> EvalResult {
        let (class, elements) = receiver_parts(receiver)
            .ok_or_else(|| undefined_property(property, receiver.type_name()))?;
        get_property_of_elements(class, elements, property)
    }

    /// Assign `value` to `property` on every element of `receiver`.
    pub fn set_property(&mut self, receiver: &Value, property: &str, value: &Value) -> Result<(), EvalError> {
        let (class, elements) = receiver_parts(receiver)
            .ok_or_else(|| undefined_property(property, receiver.type_name()))?;
        set_property_of_elements(class, elements, property, value)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl CallContext for Interpreter {
    fn write_output(&mut self, text: &str) {
        self.output.write(text);
    }

    fn display_options(&self) -> DisplayOptions {
        self.display
    }
}

/// Class and elements of an object receiver; an untagged empty vector
/// resolves against the root class.
fn receiver_parts(receiver: &Value) -> Option<(&'static ClassDescriptor, &[ObjectRef])> {
    match receiver {
        Value::Object(objects) => Some((objects.class().unwrap_or(&OBJECT_CLASS), objects.elements())),
        _ => None,
    }
}
