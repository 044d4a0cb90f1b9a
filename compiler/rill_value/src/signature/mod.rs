//! Call signatures for functions and methods.
//!
//! A signature is immutable metadata built once when a function table or
//! class descriptor is first used. It declares the return mask and the
//! ordered parameters (type mask, optional object class, default), plus an
//! optional variadic tail. The dispatch engine runs every call through
//! [`CallSignature::check_arguments`] before executing it and through
//! [`CallSignature::check_return`] afterwards.
//!
//! Argument failures are script-level errors naming the callable and the
//! parameter. Return failures are internal errors: the native
//! implementation broke its own contract.

use std::fmt;
use std::ptr;

use smallvec::SmallVec;

use crate::errors::{
    argument_class_mismatch, argument_not_singleton, argument_type_mismatch,
    invalid_dispatch_flags, missing_argument, return_violation, too_many_arguments,
};
use crate::value::format_float;
use crate::{CallContext, ClassDescriptor, DisplayOptions, EvalError, EvalResult, ObjectRef, TypeMask, Value};

/// Checked arguments: one entry per declared parameter (defaults filled in),
/// followed by any variadic arguments.
pub type Args = SmallVec<[Value; 4]>;

/// Default for an optional parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    Null,
    Logical(bool),
    Int(i64),
    Float(f64),
    String(&'static str),
}

impl DefaultValue {
    pub fn to_value(&self) -> Value {
        match self {
            DefaultValue::Null => Value::null(),
            DefaultValue::Logical(v) => Value::logical(*v),
            DefaultValue::Int(v) => Value::int(*v),
            DefaultValue::Float(v) => Value::float(*v),
            DefaultValue::String(v) => Value::string(*v),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Null => f.write_str("NULL"),
            DefaultValue::Logical(v) => f.write_str(if *v { "T" } else { "F" }),
            DefaultValue::Int(v) => write!(f, "{v}"),
            DefaultValue::Float(v) => {
                f.write_str(&format_float(*v, DisplayOptions::DEFAULT_PRECISION))
            }
            DefaultValue::String(v) => write!(f, "{v:?}"),
        }
    }
}

/// One declared parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: &'static str,
    pub mask: TypeMask,
    /// Required element class for object arguments.
    pub class: Option<&'static ClassDescriptor>,
    /// Present exactly when the parameter is optional.
    pub default: Option<DefaultValue>,
}

impl Param {
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(default) = &self.default {
            f.write_str("[")?;
            write_mask(f, self.mask, self.class)?;
            write!(f, " {} = {default}]", self.name)
        } else {
            write_mask(f, self.mask, self.class)?;
            write!(f, " {}", self.name)
        }
    }
}

/// Whether a signature belongs to a free function or a method.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Method,
}

/// Parameters and return contract of one callable.
#[derive(Clone, Debug)]
pub struct CallSignature {
    pub name: &'static str,
    pub kind: CallableKind,
    pub return_mask: TypeMask,
    pub return_class: Option<&'static ClassDescriptor>,
    pub params: Vec<Param>,
    /// Accepted mask for any number of trailing arguments.
    pub ellipsis: Option<TypeMask>,
}

impl CallSignature {
    pub fn function(name: &'static str, return_mask: TypeMask) -> Self {
        Self::new(name, CallableKind::Function, return_mask)
    }

    pub fn method(name: &'static str, return_mask: TypeMask) -> Self {
        Self::new(name, CallableKind::Method, return_mask)
    }

    fn new(name: &'static str, kind: CallableKind, return_mask: TypeMask) -> Self {
        CallSignature {
            name,
            kind,
            return_mask,
            return_class: None,
            params: Vec::new(),
            ellipsis: None,
        }
    }

    #[must_use]
    pub fn returns_class(mut self, class: &'static ClassDescriptor) -> Self {
        self.return_class = Some(class);
        self
    }

    /// Add a required parameter.
    #[must_use]
    pub fn arg(self, name: &'static str, mask: TypeMask) -> Self {
        self.param(name, mask, None, None)
    }

    /// Add a required object parameter constrained to `class`.
    #[must_use]
    pub fn arg_object(self, name: &'static str, mask: TypeMask, class: &'static ClassDescriptor) -> Self {
        self.param(name, mask, Some(class), None)
    }

    /// Add an optional parameter.
    #[must_use]
    pub fn optional(self, name: &'static str, mask: TypeMask, default: DefaultValue) -> Self {
        self.param(name, mask, None, Some(default))
    }

    /// Accept any number of trailing arguments matching `mask`.
    #[must_use]
    pub fn ellipsis(mut self, mask: TypeMask) -> Self {
        self.ellipsis = Some(mask);
        self
    }

    fn param(
        mut self,
        name: &'static str,
        mask: TypeMask,
        class: Option<&'static ClassDescriptor>,
        default: Option<DefaultValue>,
    ) -> Self {
        self.params.push(Param {
            name,
            mask,
            class,
            default,
        });
        self
    }

    /// Display form used in error messages: `function seq()`.
    pub fn callable_name(&self) -> String {
        match self.kind {
            CallableKind::Function => format!("function {}()", self.name),
            CallableKind::Method => format!("method {}()", self.name),
        }
    }

    /// Number of parameters without a default.
    pub fn min_args(&self) -> usize {
        self.params.iter().filter(|p| !p.is_optional()).count()
    }

    /// Validate `args` and fill in defaults for absent optional parameters.
    pub fn check_arguments(&self, args: &[Value]) -> Result<Args, EvalError> {
        if args.len() > self.params.len() && self.ellipsis.is_none() {
            return Err(too_many_arguments(
                &self.callable_name(),
                self.params.len(),
                args.len(),
            ));
        }

        let mut checked = Args::with_capacity(args.len().max(self.params.len()));
        for (position, param) in self.params.iter().enumerate() {
            match args.get(position) {
                Some(arg) => {
                    self.check_argument(position, param.name, param.mask, param.class, arg)?;
                    checked.push(arg.clone());
                }
                None => match &param.default {
                    Some(default) => checked.push(default.to_value()),
                    None => return Err(missing_argument(&self.callable_name(), param.name)),
                },
            }
        }

        if let Some(mask) = self.ellipsis {
            for (position, arg) in args.iter().enumerate().skip(self.params.len()) {
                self.check_argument(position, "...", mask, None, arg)?;
                checked.push(arg.clone());
            }
        }
        Ok(checked)
    }

    fn check_argument(
        &self,
        position: usize,
        param: &str,
        mask: TypeMask,
        class: Option<&'static ClassDescriptor>,
        arg: &Value,
    ) -> Result<(), EvalError> {
        if !mask.accepts(arg.value_type()) {
            return Err(argument_type_mismatch(
                &self.callable_name(),
                position,
                param,
                arg.type_name(),
            ));
        }
        if mask.is_singleton() && !arg.is_null() && arg.count() != 1 {
            return Err(argument_not_singleton(
                &self.callable_name(),
                position,
                param,
                arg.count(),
            ));
        }
        if let (Some(expected), Some(got)) = (class, arg.object_class()) {
            if !arg.is_empty() && !got.is_subclass_of(expected) {
                return Err(argument_class_mismatch(
                    &self.callable_name(),
                    position,
                    param,
                    expected.name(),
                    got.name(),
                ));
            }
        }
        Ok(())
    }

    /// Validate a produced result against the declared return contract.
    ///
    /// A violation is an internal error in the implementation.
    pub fn check_return(&self, result: &Value) -> Result<(), EvalError> {
        if !self.return_mask.accepts(result.value_type()) {
            return Err(return_violation(
                &self.callable_name(),
                format!("cannot be type {}", result.type_name()),
            ));
        }
        if self.return_mask.is_singleton() && !result.is_null() && result.count() != 1 {
            return Err(return_violation(
                &self.callable_name(),
                format!(
                    "must be a singleton (size() == 1), but size() == {}",
                    result.count()
                ),
            ));
        }
        if let (Some(expected), Some(got)) = (self.return_class, result.object_class()) {
            if !result.is_empty() && !got.is_subclass_of(expected) {
                return Err(return_violation(
                    &self.callable_name(),
                    format!("must be object element type {}, not {}", expected.name(), got.name()),
                ));
            }
        }
        Ok(())
    }

    /// Validate the concatenated result of an instance method dispatched over
    /// `receivers` elements.
    ///
    /// A singleton return mask means one element per receiver, so the
    /// concatenation must hold exactly `receivers` values (NULL aside). An
    /// empty receiver produces NULL whatever the declared mask.
    pub fn check_vectorized_return(&self, result: &Value, receivers: usize) -> Result<(), EvalError> {
        if receivers == 0 && result.is_null() {
            return Ok(());
        }
        if !self.return_mask.accepts(result.value_type()) {
            return Err(return_violation(
                &self.callable_name(),
                format!("cannot be type {}", result.type_name()),
            ));
        }
        if self.return_mask.is_singleton() && !result.is_null() && result.count() != receivers {
            return Err(return_violation(
                &self.callable_name(),
                format!(
                    "must produce one value per receiver ({receivers}), but produced {}",
                    result.count()
                ),
            ));
        }
        if let (Some(expected), Some(got)) = (self.return_class, result.object_class()) {
            if !result.is_empty() && !got.is_subclass_of(expected) {
                return Err(return_violation(
                    &self.callable_name(),
                    format!("must be object element type {}, not {}", expected.name(), got.name()),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for CallSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_mask(f, self.return_mask, self.return_class)?;
        write!(f, "){}(", self.name)?;
        let mut first = true;
        for param in &self.params {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{param}")?;
        }
        if self.ellipsis.is_some() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str("...")?;
        }
        f.write_str(")")
    }
}

/// Render a mask, spelling out the class for object-only masks.
pub(crate) fn write_mask(
    f: &mut fmt::Formatter<'_>,
    mask: TypeMask,
    class: Option<&'static ClassDescriptor>,
) -> fmt::Result {
    match class {
        Some(class) if mask.types() == TypeMask::OBJECT => {
            write!(f, "object<{}>", class.name())?;
            if mask.is_singleton() {
                f.write_str("$")?;
            }
            Ok(())
        }
        _ => write!(f, "{mask}"),
    }
}

/// Class method body: receives the receiver's class and every receiver element.
pub type ClassMethodFn =
    fn(&'static ClassDescriptor, &[ObjectRef], &[Value], &mut dyn CallContext) -> EvalResult;

/// Bulk instance method body over a homogeneous element slice.
pub type AcceleratedMethodFn = fn(&[ObjectRef], &[Value], &mut dyn CallContext) -> EvalResult;

/// How a method is dispatched once its flags are validated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Called once with the whole receiver vector.
    Class,
    /// Called per receiver element (or once through an accelerated body).
    Instance,
}

/// Signature of a method, with its dispatch flags.
///
/// Exactly one of `is_class_method` and `is_instance_method` must be set;
/// [`MethodSignature::dispatch_kind`] rejects anything else.
#[derive(Clone, Debug)]
pub struct MethodSignature {
    pub call: CallSignature,
    pub is_class_method: bool,
    pub is_instance_method: bool,
    pub class_impl: Option<ClassMethodFn>,
    pub accelerated: Option<AcceleratedMethodFn>,
}

impl MethodSignature {
    /// An instance method, executed by each element's `execute_instance_method`.
    pub fn instance(name: &'static str, return_mask: TypeMask) -> Self {
        MethodSignature {
            call: CallSignature::method(name, return_mask),
            is_class_method: false,
            is_instance_method: true,
            class_impl: None,
            accelerated: None,
        }
    }

    /// A class method with its body.
    pub fn class_method(name: &'static str, return_mask: TypeMask, body: ClassMethodFn) -> Self {
        MethodSignature {
            call: CallSignature::method(name, return_mask),
            is_class_method: true,
            is_instance_method: false,
            class_impl: Some(body),
            accelerated: None,
        }
    }

    /// Attach a bulk body used for homogeneous receivers.
    #[must_use]
    pub fn accelerated(mut self, body: AcceleratedMethodFn) -> Self {
        self.accelerated = Some(body);
        self
    }

    #[must_use]
    pub fn arg(mut self, name: &'static str, mask: TypeMask) -> Self {
        self.call = self.call.arg(name, mask);
        self
    }

    #[must_use]
    pub fn arg_object(mut self, name: &'static str, mask: TypeMask, class: &'static ClassDescriptor) -> Self {
        self.call = self.call.arg_object(name, mask, class);
        self
    }

    #[must_use]
    pub fn optional(mut self, name: &'static str, mask: TypeMask, default: DefaultValue) -> Self {
        self.call = self.call.optional(name, mask, default);
        self
    }

    #[must_use]
    pub fn returns_class(mut self, class: &'static ClassDescriptor) -> Self {
        self.call = self.call.returns_class(class);
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.call.name
    }

    /// Validated dispatch kind; an internal error unless exactly one flag is set.
    pub fn dispatch_kind(&self) -> Result<MethodKind, EvalError> {
        match (self.is_class_method, self.is_instance_method) {
            (true, false) => Ok(MethodKind::Class),
            (false, true) => Ok(MethodKind::Instance),
            _ => Err(invalid_dispatch_flags(self.call.name)),
        }
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_class_method { '+' } else { '-' };
        write!(f, "{marker} {}", self.call)
    }
}

/// Whether two class references are the same class.
#[inline]
pub(crate) fn same_class(a: &ClassDescriptor, b: &ClassDescriptor) -> bool {
    ptr::eq(a, b)
}
