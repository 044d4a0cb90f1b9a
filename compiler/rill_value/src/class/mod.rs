//! Class descriptors and property signatures.
//!
//! Every host object type registers one `ClassDescriptor`, normally as a
//! `static`. A descriptor names its class, links to at most one superclass,
//! and supplies two builder functions for the properties and methods it
//! declares itself.
//!
//! # Merging
//!
//! [`ClassDescriptor::properties`] and [`ClassDescriptor::methods`] return the
//! superclass's merged list extended by the class's own signatures, sorted by
//! name. A signature whose name already exists in the superclass replaces it
//! (an override). The merged lists are computed on first use and cached for
//! the life of the process; classes are static, so they are never rebuilt.
//!
//! The chain ends at the root class [`OBJECT_CLASS`], which provides the
//! `str()`, `property()` and `method()` methods every object understands.

mod root;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::OnceLock;

pub use root::{root_get_property, root_instance_method, root_set_property, OBJECT_CLASS};

use crate::errors::{invalid_property_value, return_violation};
use crate::signature::{same_class, write_mask};
use crate::{EvalError, EvalResult, MethodSignature, ObjectRef, TypeMask, Value};

/// Bulk getter over a homogeneous element slice; returns one result per element.
pub type AcceleratedGetter = fn(&[ObjectRef]) -> EvalResult;

/// Bulk setter over a homogeneous element slice.
///
/// The value has either one element (broadcast to every target) or exactly
/// one element per target.
pub type AcceleratedSetter = fn(&[ObjectRef], &Value) -> Result<(), EvalError>;

/// Declaration of one property.
#[derive(Clone, Debug)]
pub struct PropertySignature {
    pub name: &'static str,
    pub read_only: bool,
    /// Value types and cardinality, per element.
    pub mask: TypeMask,
    /// Element class for object-typed properties.
    pub value_class: Option<&'static ClassDescriptor>,
    pub getter: Option<AcceleratedGetter>,
    pub setter: Option<AcceleratedSetter>,
}

impl PropertySignature {
    pub fn read_only(name: &'static str, mask: TypeMask) -> Self {
        Self::new(name, true, mask)
    }

    pub fn read_write(name: &'static str, mask: TypeMask) -> Self {
        Self::new(name, false, mask)
    }

    fn new(name: &'static str, read_only: bool, mask: TypeMask) -> Self {
        PropertySignature {
            name,
            read_only,
            mask,
            value_class: None,
            getter: None,
            setter: None,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: &'static ClassDescriptor) -> Self {
        self.value_class = Some(class);
        self
    }

    #[must_use]
    pub fn accelerated_get(mut self, getter: AcceleratedGetter) -> Self {
        self.getter = Some(getter);
        self
    }

    #[must_use]
    pub fn accelerated_set(mut self, setter: AcceleratedSetter) -> Self {
        self.setter = Some(setter);
        self
    }

    /// The value a read over zero elements produces.
    pub fn empty_result(&self) -> Value {
        let types = self.mask.types();
        if types == TypeMask::OBJECT {
            return Value::empty_object(self.value_class);
        }
        for (flag, ty) in [
            (TypeMask::LOGICAL, crate::ValueType::Logical),
            (TypeMask::INT, crate::ValueType::Int),
            (TypeMask::FLOAT, crate::ValueType::Float),
            (TypeMask::STRING, crate::ValueType::String),
        ] {
            if types == flag {
                return Value::empty_of(ty);
            }
        }
        Value::null()
    }

    /// Check a value about to be assigned (type and class; length is the caller's concern).
    pub fn check_assignable(&self, value: &Value) -> Result<(), EvalError> {
        if !self.mask.accepts(value.value_type()) {
            return Err(invalid_property_value(
                self.name,
                format!("cannot be type {}", value.type_name()),
            ));
        }
        if let (Some(expected), Some(got)) = (self.value_class, value.object_class()) {
            if !value.is_empty() && !got.is_subclass_of(expected) {
                return Err(invalid_property_value(
                    self.name,
                    format!("must be object element type {}, not {}", expected.name(), got.name()),
                ));
            }
        }
        Ok(())
    }

    /// Check a read result covering `elements` receivers.
    ///
    /// A violation is an internal error in the class implementation.
    pub fn check_result(&self, result: &Value, elements: usize) -> Result<(), EvalError> {
        let callable = format!("property {}", self.name);
        if !self.mask.accepts(result.value_type()) && !(result.is_null() && elements == 0) {
            return Err(return_violation(
                &callable,
                format!("cannot be type {}", result.type_name()),
            ));
        }
        if self.mask.is_singleton() && result.count() != elements {
            return Err(return_violation(
                &callable,
                format!(
                    "must have one element per receiver ({elements}), but size() == {}",
                    result.count()
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for PropertySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.read_only { "=>" } else { "<->" };
        write!(f, "{} {arrow} (", self.name)?;
        write_mask(f, self.mask, self.value_class)?;
        f.write_str(")")
    }
}

/// Builds the signatures a class declares itself.
pub type SignatureBuilder<T> = fn() -> Vec<T>;

/// Reflection record for one host object type.
pub struct ClassDescriptor {
    name: &'static str,
    superclass: Option<&'static ClassDescriptor>,
    own_properties: SignatureBuilder<PropertySignature>,
    own_methods: SignatureBuilder<MethodSignature>,
    properties: OnceLock<Vec<PropertySignature>>,
    methods: OnceLock<Vec<MethodSignature>>,
}

impl ClassDescriptor {
    /// Declare a class. Intended for `static` items.
    pub const fn new(
        name: &'static str,
        superclass: Option<&'static ClassDescriptor>,
        own_properties: SignatureBuilder<PropertySignature>,
        own_methods: SignatureBuilder<MethodSignature>,
    ) -> Self {
        ClassDescriptor {
            name,
            superclass,
            own_properties,
            own_methods,
            properties: OnceLock::new(),
            methods: OnceLock::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn superclass(&self) -> Option<&'static ClassDescriptor> {
        self.superclass
    }

    /// Whether this class is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &ClassDescriptor) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if same_class(class, other) {
                return true;
            }
            current = class.superclass;
        }
        false
    }

    /// All properties, superclass-merged and sorted by name.
    pub fn properties(&self) -> &[PropertySignature] {
        self.properties.get_or_init(|| {
            let inherited = self.superclass.map_or(&[][..], ClassDescriptor::properties);
            let merged = merge(self.name, inherited, (self.own_properties)(), |p| p.name, |a, b| {
                a.mask.is_singleton() == b.mask.is_singleton()
            });
            tracing::debug!(class = self.name, count = merged.len(), "built property table");
            merged
        })
    }

    /// All methods, superclass-merged and sorted by name.
    pub fn methods(&self) -> &[MethodSignature] {
        self.methods.get_or_init(|| {
            let inherited = self.superclass.map_or(&[][..], ClassDescriptor::methods);
            let merged = merge(self.name, inherited, (self.own_methods)(), MethodSignature::name, |a, b| {
                a.call.return_mask.is_singleton() == b.call.return_mask.is_singleton()
            });
            tracing::debug!(class = self.name, count = merged.len(), "built method table");
            merged
        })
    }

    pub fn property(&self, name: &str) -> Option<&PropertySignature> {
        let properties = self.properties();
        properties
            .binary_search_by(|p| p.name.cmp(name))
            .ok()
            .map(|index| &properties[index])
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        let methods = self.methods();
        methods
            .binary_search_by(|m| m.name().cmp(name))
            .ok()
            .map(|index| &methods[index])
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("superclass", &self.superclass.map(ClassDescriptor::name))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn merge<T: Clone>(
    class: &'static str,
    inherited: &[T],
    own: Vec<T>,
    name_of: fn(&T) -> &'static str,
    compatible: fn(&T, &T) -> bool,
) -> Vec<T> {
    let mut merged = inherited.to_vec();
    for signature in own {
        let name = name_of(&signature);
        match merged.iter_mut().find(|existing| name_of(existing) == name) {
            Some(existing) => {
                if !compatible(existing, &signature) {
                    tracing::warn!(class, name, "override changes singleton cardinality");
                }
                *existing = signature;
            }
            None => merged.push(signature),
        }
    }
    merged.sort_by(|a, b| name_of(a).cmp(name_of(b)));
    merged
}
