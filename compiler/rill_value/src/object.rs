//! The host object extension trait.
//!
//! A host type becomes a script value by implementing [`ScriptObject`] and
//! pointing at a static [`ClassDescriptor`]. Script values hold host objects
//! as [`ObjectRef`] (`Arc<dyn ScriptObject>`); hosts keep mutable state
//! behind interior mutability, because many script values can reference the
//! same object at once.
//!
//! # Delegation
//!
//! `get_property`, `set_property` and `execute_instance_method` each handle
//! the names their class declares and hand anything else to the superclass
//! implementation. The provided defaults are the root of that chain: a name
//! that reaches them was declared in a signature but never implemented, which
//! is an internal error.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

use crate::class::{root_get_property, root_instance_method, root_set_property};
use crate::errors::class_mismatch;
use crate::{ClassDescriptor, DisplayOptions, EvalError, EvalResult, Value};

/// Shared reference to a host object.
pub type ObjectRef = Arc<dyn ScriptObject>;

/// Services the evaluator lends to native function and method bodies.
pub trait CallContext {
    /// Append text to the script's output stream.
    fn write_output(&mut self, text: &str);

    /// Current display options (float precision).
    fn display_options(&self) -> DisplayOptions;
}

/// A host object visible to scripts.
pub trait ScriptObject: Any + Send + Sync + fmt::Debug {
    /// The concrete class of this object.
    fn class(&self) -> &'static ClassDescriptor;

    /// Upcast for checked downcasting in bulk implementations.
    fn as_any(&self) -> &dyn Any;

    /// Text used when this element is printed.
    fn print_form(&self) -> String {
        self.class().name().to_string()
    }

    /// Read one property of this element (the scalar path).
    fn get_property(&self, property: &str) -> EvalResult {
        root_get_property(self.class(), property)
    }

    /// Write one property of this element (the scalar path).
    ///
    /// `value` has already been checked against the property signature.
    fn set_property(&self, property: &str, value: &Value) -> Result<(), EvalError> {
        let _ = value;
        root_set_property(self.class(), property)
    }

    /// Run an instance method on this element.
    ///
    /// `args` have already been checked against the method signature.
    fn execute_instance_method(
        &self,
        method: &str,
        args: &[Value],
        ctx: &mut dyn CallContext,
    ) -> EvalResult {
        let _ = args;
        root_instance_method(self.class(), &|property| self.get_property(property), method, ctx)
    }
}

/// Checked downcast of one element to its concrete host type.
///
/// Bulk implementations call this per element; a mismatch means the caller
/// broke the homogeneity precondition and is reported as an internal error.
pub fn downcast<T: ScriptObject>(element: &ObjectRef) -> Result<&T, EvalError> {
    element
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| class_mismatch(any::type_name::<T>(), element.class().name()))
}
