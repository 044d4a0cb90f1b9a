//! Evaluation errors.
//!
//! Two disjoint classes of failure share one type:
//!
//! - **Script-level errors** describe a mistake in the running script (a bad
//!   argument, a property read before it is valid). They abort the current
//!   script execution; the host keeps running.
//! - **Internal errors** describe a defect in the engine or in a host class
//!   (a native implementation returning a value outside its declared mask,
//!   an out-of-range element access). They travel the same path but render
//!   with an `(internal error)` prefix so they are triaged differently.
//!
//! Both propagate as `Err(EvalError)` through `?` up to whatever boundary
//! started the script execution.
//!
//! Construct errors through the `#[cold]` factory functions at the bottom of
//! this module rather than formatting messages at call sites.

use std::fmt;

use crate::Value;

/// Result of evaluating a call or property access.
pub type EvalResult = Result<Value, EvalError>;

/// Structured error category.
///
/// The `Display` output of the kind is the user-facing message.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalErrorKind {
    // Dispatch
    #[error("unrecognized function name {name}")]
    UnrecognizedFunction { name: String },
    #[error("method {method}() is not defined on object element type {class}")]
    UndefinedMethod { method: String, class: String },
    #[error("property {property} is not defined for object element type {class}")]
    UndefinedProperty { property: String, class: String },
    #[error("function {name}() is already defined")]
    DuplicateFunction { name: String },

    // Argument checking
    #[error("{callable} missing required argument {param}")]
    MissingArgument { callable: String, param: String },
    #[error("{callable} requires at most {max} argument(s), but {got} are supplied")]
    TooManyArguments {
        callable: String,
        max: usize,
        got: usize,
    },
    #[error("argument {position} ({param}) of {callable} cannot be type {got}")]
    ArgumentTypeMismatch {
        callable: String,
        position: usize,
        param: String,
        got: &'static str,
    },
    #[error(
        "argument {position} ({param}) of {callable} must be a singleton (size() == 1), but size() == {count}"
    )]
    ArgumentNotSingleton {
        callable: String,
        position: usize,
        param: String,
        count: usize,
    },
    #[error("argument {position} ({param}) of {callable} must be object element type {expected}, not {got}")]
    ArgumentClassMismatch {
        callable: String,
        position: usize,
        param: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("{callable} {reason}")]
    InvalidArgument { callable: String, reason: String },

    // Properties
    #[error("property {property} of {class} is read-only")]
    ReadOnlyProperty { property: String, class: String },
    #[error("invalid value for property {property}: {reason}")]
    InvalidPropertyValue { property: String, reason: String },
    #[error("property {property} is not available on {class}: {reason}")]
    PropertyNotAvailable {
        property: String,
        class: String,
        reason: String,
    },
    #[error(
        "assignment to {target} requires a singleton value or one of size {targets}, but the value has size {values}"
    )]
    AssignmentLengthMismatch {
        target: String,
        targets: usize,
        values: usize,
    },

    // Values
    #[error("object and non-object types cannot be mixed")]
    ObjectScalarMix,
    #[error("objects of different types cannot be mixed ({left} and {right})")]
    MixedObjectClasses {
        left: &'static str,
        right: &'static str,
    },
    #[error("{from} value {value} cannot be converted to type {to}")]
    Conversion {
        from: &'static str,
        to: &'static str,
        value: String,
    },
    #[error("type object cannot be converted to type {to}")]
    ObjectConversion { to: &'static str },

    // Symbols
    #[error("identifier {name} is a constant and cannot be redefined or removed")]
    ConstantRedefinition { name: String },
    #[error("undefined identifier {name}")]
    UndefinedIdentifier { name: String },

    // Control
    #[error("stop() called")]
    StopCalled,
    #[error("{operation} {path} failed: {reason}")]
    Io {
        operation: &'static str,
        path: String,
        reason: String,
    },
    #[error("{message}")]
    Custom { message: String },

    // Internal
    #[error("(internal error) return value of {callable} {reason}")]
    ReturnViolation { callable: String, reason: String },
    #[error("(internal error) method {method}() must be exactly one of a class method or an instance method")]
    InvalidDispatchFlags { method: String },
    #[error("(internal error) index {index} out of range for value of size {count}")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("(internal error) property {property} was not resolved by class {class} or its superclasses")]
    UnrecognizedPropertyId { property: String, class: String },
    #[error("(internal error) method {method}() was not resolved by class {class} or its superclasses")]
    UnrecognizedMethodId { method: String, class: String },
    #[error("(internal error) implementation for class {expected} received an element of class {got}")]
    ClassMismatch {
        expected: &'static str,
        got: &'static str,
    },
}

impl EvalErrorKind {
    /// Whether this kind signals an engine or host defect rather than a
    /// script mistake.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::ReturnViolation { .. }
                | Self::InvalidDispatchFlags { .. }
                | Self::IndexOutOfRange { .. }
                | Self::UnrecognizedPropertyId { .. }
                | Self::UnrecognizedMethodId { .. }
                | Self::ClassMismatch { .. }
        )
    }
}

/// An error raised during evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    /// Structured error category, for programmatic matching.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-built errors.
    pub message: String,
    /// Secondary context lines, innermost first.
    pub notes: Vec<String>,
}

impl EvalError {
    /// Create a script-level error with just a message.
    ///
    /// Prefer a specific factory function when one fits.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            notes: Vec::new(),
        }
    }

    /// Create an error from a structured kind.
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            notes: Vec::new(),
        }
    }

    /// Whether this is an internal (engine or host defect) error.
    #[inline]
    pub fn is_internal(&self) -> bool {
        self.kind.is_internal()
    }

    /// Attach a context note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::from_kind(kind)
    }
}

// Dispatch

#[cold]
pub fn unrecognized_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnrecognizedFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_method(method: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedMethod {
        method: method.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn undefined_property(property: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedProperty {
        property: property.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn duplicate_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateFunction {
        name: name.to_string(),
    })
}

// Argument checking

#[cold]
pub fn missing_argument(callable: &str, param: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArgument {
        callable: callable.to_string(),
        param: param.to_string(),
    })
}

#[cold]
pub fn too_many_arguments(callable: &str, max: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyArguments {
        callable: callable.to_string(),
        max,
        got,
    })
}

/// `position` is zero-based; messages count from one.
#[cold]
pub fn argument_type_mismatch(
    callable: &str,
    position: usize,
    param: &str,
    got: &'static str,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentTypeMismatch {
        callable: callable.to_string(),
        position: position.saturating_add(1),
        param: param.to_string(),
        got,
    })
}

#[cold]
pub fn argument_not_singleton(
    callable: &str,
    position: usize,
    param: &str,
    count: usize,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentNotSingleton {
        callable: callable.to_string(),
        position: position.saturating_add(1),
        param: param.to_string(),
        count,
    })
}

#[cold]
pub fn argument_class_mismatch(
    callable: &str,
    position: usize,
    param: &str,
    expected: &'static str,
    got: &'static str,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArgumentClassMismatch {
        callable: callable.to_string(),
        position: position.saturating_add(1),
        param: param.to_string(),
        expected,
        got,
    })
}

/// A semantically invalid argument value, e.g. `function seq() requires by != 0`.
///
/// `callable` is the display form (`function seq()`), `reason` the rest.
#[cold]
pub fn invalid_argument(callable: &str, reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgument {
        callable: callable.to_string(),
        reason: reason.into(),
    })
}

// Properties

#[cold]
pub fn read_only_property(property: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyProperty {
        property: property.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn invalid_property_value(property: &str, reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidPropertyValue {
        property: property.to_string(),
        reason: reason.into(),
    })
}

/// A property that exists but cannot be read in the current state.
#[cold]
pub fn property_not_available(property: &str, class: &str, reason: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PropertyNotAvailable {
        property: property.to_string(),
        class: class.to_string(),
        reason: reason.to_string(),
    })
}

#[cold]
pub fn assignment_length_mismatch(target: &str, targets: usize, values: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignmentLengthMismatch {
        target: target.to_string(),
        targets,
        values,
    })
}

// Values

#[cold]
pub fn object_scalar_mix() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ObjectScalarMix)
}

#[cold]
pub fn mixed_object_classes(left: &'static str, right: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MixedObjectClasses { left, right })
}

#[cold]
pub fn conversion_failed(from: &'static str, to: &'static str, value: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Conversion {
        from,
        to,
        value: value.into(),
    })
}

#[cold]
pub fn object_conversion(to: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ObjectConversion { to })
}

// Symbols

#[cold]
pub fn constant_redefinition(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstantRedefinition {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_identifier(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedIdentifier {
        name: name.to_string(),
    })
}

// Control

#[cold]
pub fn stop_called() -> EvalError {
    EvalError::from_kind(EvalErrorKind::StopCalled)
}

#[cold]
pub fn io_failure(operation: &'static str, path: &str, err: &std::io::Error) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Io {
        operation,
        path: path.to_string(),
        reason: err.to_string(),
    })
}

// Internal

#[cold]
pub fn return_violation(callable: &str, reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReturnViolation {
        callable: callable.to_string(),
        reason: reason.into(),
    })
}

#[cold]
pub fn invalid_dispatch_flags(method: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidDispatchFlags {
        method: method.to_string(),
    })
}

#[cold]
pub fn index_out_of_range(index: usize, count: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfRange { index, count })
}

#[cold]
pub fn unrecognized_property_id(property: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnrecognizedPropertyId {
        property: property.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn unrecognized_method_id(method: &str, class: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnrecognizedMethodId {
        method: method.to_string(),
        class: class.to_string(),
    })
}

#[cold]
pub fn class_mismatch(expected: &'static str, got: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ClassMismatch { expected, got })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn factory_message_matches_kind_display() {
        let err = unrecognized_function("frobnicate");
        assert_eq!(err.message, "unrecognized function name frobnicate");
        assert_eq!(err.message, err.kind.to_string());
        assert!(!err.is_internal());
    }

    #[test]
    fn argument_positions_are_reported_one_based() {
        let err = argument_type_mismatch("function seq()", 1, "to", "string");
        assert_eq!(
            err.message,
            "argument 2 (to) of function seq() cannot be type string"
        );
    }

    #[test]
    fn internal_errors_are_prefixed() {
        let err = return_violation("function sum()", "cannot be type string");
        assert!(err.is_internal());
        assert!(err.message.starts_with("(internal error) "));

        let err = index_out_of_range(5, 3);
        assert!(err.is_internal());
    }

    #[test]
    fn notes_render_after_message() {
        let err = EvalError::new("bad thing").with_note("while setting element 3");
        assert_eq!(err.to_string(), "bad thing\n  note: while setting element 3");
        assert_eq!(err.message, "bad thing");
    }
}
