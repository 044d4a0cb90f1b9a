//! Runtime values for the Rill evaluator.
//!
//! Every value is "zero or more elements of one type". The six variants are
//! closed: NULL, logical, integer, float, string and object. Each non-NULL
//! variant stores its elements in [`Elements`], which is either a dedicated
//! singleton or a shared vector; the two forms are interchangeable and only
//! `count()` and the accessors are part of the contract.
//!
//! # Ownership
//!
//! Vector storage lives behind [`Heap`], a copy-on-write `Arc`. Storing a value
//! in a symbol table is a cheap clone; a later mutation through one holder
//! copies the storage and never leaks into the other. Canonical constants
//! (`T`, `F`, `NULL`) are plain values and are never mutated in place.
//!
//! # Coercion
//!
//! Positional accessors (`logical_at`, `int_at`, `float_at`, `string_at`)
//! convert between the scalar types with fixed rules:
//!
//! | from \ to | logical | integer | float | string |
//! |---|---|---|---|---|
//! | logical | - | 0/1 | 0.0/1.0 | `T`/`F` |
//! | integer | `!= 0` | - | widen | decimal |
//! | float | `!= 0.0` (NaN fails) | truncate (non-finite fails) | - | `%g` |
//! | string | `T`/`true`/`TRUE`, `F`/`false`/`FALSE` | parse | parse | - |
//!
//! Object values never convert to scalar types and scalars never convert to
//! objects. An index outside `0..count()` is an internal error.

mod compare;
mod concat;
mod elements;
mod format;
mod heap;
mod reduce;


use std::fmt;
use std::ptr;

pub use elements::Elements;
pub use format::{format_float, DisplayOptions};
pub use heap::Heap;
pub use reduce::{checked_product, checked_sum};

use crate::errors::{
    conversion_failed, index_out_of_range, mixed_object_classes, object_conversion,
};
use crate::{ClassDescriptor, EvalError, EvalResult, ObjectRef};

/// Type tag of a value.
///
/// The derived order is the concatenation promotion order for the scalar
/// types: `Null < Logical < Int < Float < String`. `Object` sorts last but
/// never mixes with the others.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    Null,
    Logical,
    Int,
    Float,
    String,
    Object,
}

impl ValueType {
    /// Script-visible name of this type.
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Null => "NULL",
            ValueType::Logical => "logical",
            ValueType::Int => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Object => "object",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Elements of an object value, all of one class.
///
/// An empty vector may carry a class tag, but that tag places no
/// constraint on what it can later be concatenated with.
#[derive(Clone, Debug)]
pub struct ObjectVector {
    class: Option<&'static ClassDescriptor>,
    elements: Elements<ObjectRef>,
}

impl ObjectVector {
    #[inline]
    pub fn class(&self) -> Option<&'static ClassDescriptor> {
        self.class
    }

    #[inline]
    pub fn elements(&self) -> &[ObjectRef] {
        self.elements.as_slice()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn push(&mut self, element: ObjectRef) -> Result<(), EvalError> {
        let class = element.class();
        match self.class {
            Some(existing) if !self.elements.is_empty() && !ptr::eq(existing, class) => {
                return Err(mixed_object_classes(existing.name(), class.name()));
            }
            _ => self.class = Some(class),
        }
        self.elements.push(element);
        Ok(())
    }
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// The absence of a value. `invisible` suppresses top-level auto-printing.
    Null { invisible: bool },
    Logical(Elements<bool>),
    Int(Elements<i64>),
    Float(Elements<f64>),
    String(Elements<String>),
    Object(ObjectVector),
}

// Factory methods
impl Value {
    pub const fn null() -> Self {
        Value::Null { invisible: false }
    }

    /// NULL that should not be echoed at the top level (result of `print`, `cat`, ...).
    pub const fn invisible_null() -> Self {
        Value::Null { invisible: true }
    }

    #[inline]
    pub fn logical(value: bool) -> Self {
        Value::Logical(Elements::one(value))
    }

    #[inline]
    pub fn int(value: i64) -> Self {
        Value::Int(Elements::one(value))
    }

    #[inline]
    pub fn float(value: f64) -> Self {
        Value::Float(Elements::one(value))
    }

    #[inline]
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(Elements::one(value.into()))
    }

    pub fn object(element: ObjectRef) -> Self {
        Value::Object(ObjectVector {
            class: Some(element.class()),
            elements: Elements::one(element),
        })
    }

    pub fn logical_vec(values: Vec<bool>) -> Self {
        Value::Logical(Elements::from_vec(values))
    }

    pub fn int_vec(values: Vec<i64>) -> Self {
        Value::Int(Elements::from_vec(values))
    }

    pub fn float_vec(values: Vec<f64>) -> Self {
        Value::Float(Elements::from_vec(values))
    }

    pub fn string_vec(values: Vec<String>) -> Self {
        Value::String(Elements::from_vec(values))
    }

    /// An object vector; every element must be of exactly `class`.
    pub fn object_vec(class: &'static ClassDescriptor, elements: Vec<ObjectRef>) -> EvalResult {
        if let Some(stray) = elements.iter().find(|e| !ptr::eq(e.class(), class)) {
            return Err(mixed_object_classes(class.name(), stray.class().name()));
        }
        Ok(Value::Object(ObjectVector {
            class: Some(class),
            elements: Elements::from_vec(elements),
        }))
    }

    /// A zero-length object value, optionally tagged with a class.
    pub fn empty_object(class: Option<&'static ClassDescriptor>) -> Self {
        Value::Object(ObjectVector {
            class,
            elements: Elements::empty(),
        })
    }

    /// A zero-length value of `ty` (NULL for `ValueType::Null`).
    pub fn empty_of(ty: ValueType) -> Self {
        match ty {
            ValueType::Null => Value::null(),
            ValueType::Logical => Value::Logical(Elements::empty()),
            ValueType::Int => Value::Int(Elements::empty()),
            ValueType::Float => Value::Float(Elements::empty()),
            ValueType::String => Value::String(Elements::empty()),
            ValueType::Object => Value::empty_object(None),
        }
    }
}

// Shape queries
impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null { .. } => ValueType::Null,
            Value::Logical(_) => ValueType::Logical,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::Object(_) => ValueType::Object,
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// Class name for object values with a class, type name otherwise.
    pub fn element_type_name(&self) -> &'static str {
        match self.object_class() {
            Some(class) => class.name(),
            None => self.type_name(),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Value::Null { .. } => 0,
            Value::Logical(e) => e.len(),
            Value::Int(e) => e.len(),
            Value::Float(e) => e.len(),
            Value::String(e) => e.len(),
            Value::Object(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Whether this value is backed by the dedicated singleton form.
    pub fn is_singleton(&self) -> bool {
        match self {
            Value::Null { .. } => false,
            Value::Logical(e) => e.is_singleton_form(),
            Value::Int(e) => e.is_singleton_form(),
            Value::Float(e) => e.is_singleton_form(),
            Value::String(e) => e.is_singleton_form(),
            Value::Object(v) => v.elements.is_singleton_form(),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null { .. })
    }

    #[inline]
    pub fn is_invisible(&self) -> bool {
        matches!(self, Value::Null { invisible: true })
    }

    pub fn object_class(&self) -> Option<&'static ClassDescriptor> {
        match self {
            Value::Object(v) => v.class,
            _ => None,
        }
    }

    pub fn as_logicals(&self) -> Option<&[bool]> {
        match self {
            Value::Logical(e) => Some(e.as_slice()),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            Value::Int(e) => Some(e.as_slice()),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Value::Float(e) => Some(e.as_slice()),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Value::String(e) => Some(e.as_slice()),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&[ObjectRef]> {
        match self {
            Value::Object(v) => Some(v.elements()),
            _ => None,
        }
    }
}

// Positional access with coercion
impl Value {
    #[inline]
    fn check_index(&self, index: usize) -> Result<(), EvalError> {
        let count = self.count();
        if index < count {
            Ok(())
        } else {
            Err(index_out_of_range(index, count))
        }
    }

    pub fn logical_at(&self, index: usize) -> Result<bool, EvalError> {
        self.check_index(index)?;
        match self {
            Value::Logical(e) => Ok(e.as_slice()[index]),
            Value::Int(e) => Ok(e.as_slice()[index] != 0),
            Value::Float(e) => {
                let v = e.as_slice()[index];
                if v.is_nan() {
                    Err(conversion_failed("float", "logical", "NAN"))
                } else {
                    Ok(v != 0.0)
                }
            }
            Value::String(e) => {
                let s = &e.as_slice()[index];
                parse_logical(s).ok_or_else(|| conversion_failed("string", "logical", quoted(s)))
            }
            Value::Object(_) => Err(object_conversion("logical")),
            Value::Null { .. } => Err(index_out_of_range(index, 0)),
        }
    }

    pub fn int_at(&self, index: usize) -> Result<i64, EvalError> {
        self.check_index(index)?;
        match self {
            Value::Logical(e) => Ok(i64::from(e.as_slice()[index])),
            Value::Int(e) => Ok(e.as_slice()[index]),
            Value::Float(e) => {
                let v = e.as_slice()[index];
                float_to_int(v).ok_or_else(|| {
                    conversion_failed("float", "integer", format_float(v, DisplayOptions::DEFAULT_PRECISION))
                })
            }
            Value::String(e) => {
                let s = &e.as_slice()[index];
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| parse_float(trimmed).and_then(float_to_int))
                    .ok_or_else(|| conversion_failed("string", "integer", quoted(s)))
            }
            Value::Object(_) => Err(object_conversion("integer")),
            Value::Null { .. } => Err(index_out_of_range(index, 0)),
        }
    }

    pub fn float_at(&self, index: usize) -> Result<f64, EvalError> {
        self.check_index(index)?;
        match self {
            Value::Logical(e) => Ok(if e.as_slice()[index] { 1.0 } else { 0.0 }),
            Value::Int(e) => Ok(e.as_slice()[index] as f64),
            Value::Float(e) => Ok(e.as_slice()[index]),
            Value::String(e) => {
                let s = &e.as_slice()[index];
                parse_float(s.trim()).ok_or_else(|| conversion_failed("string", "float", quoted(s)))
            }
            Value::Object(_) => Err(object_conversion("float")),
            Value::Null { .. } => Err(index_out_of_range(index, 0)),
        }
    }

    /// String coercion at the default display precision.
    #[inline]
    pub fn string_at(&self, index: usize) -> Result<String, EvalError> {
        self.string_at_with(index, DisplayOptions::default())
    }

    /// String coercion with explicit display options.
    pub fn string_at_with(&self, index: usize, opts: DisplayOptions) -> Result<String, EvalError> {
        self.check_index(index)?;
        match self {
            Value::Logical(e) => Ok(logical_text(e.as_slice()[index]).to_string()),
            Value::Int(e) => Ok(e.as_slice()[index].to_string()),
            Value::Float(e) => Ok(format_float(e.as_slice()[index], opts.float_precision)),
            Value::String(e) => Ok(e.as_slice()[index].clone()),
            Value::Object(_) => Err(object_conversion("string")),
            Value::Null { .. } => Err(index_out_of_range(index, 0)),
        }
    }

    pub fn object_at(&self, index: usize) -> Result<ObjectRef, EvalError> {
        self.check_index(index)?;
        match self {
            Value::Object(v) => Ok(v.elements()[index].clone()),
            other => Err(conversion_failed(
                other.type_name(),
                "object",
                other.element_text(index, DisplayOptions::default())?,
            )),
        }
    }

    /// Display text of one element: unquoted strings, objects by print form.
    ///
    /// This is the form `cat` and `paste` emit.
    pub fn element_text(&self, index: usize, opts: DisplayOptions) -> Result<String, EvalError> {
        match self {
            Value::Object(v) => {
                self.check_index(index)?;
                Ok(v.elements()[index].print_form())
            }
            _ => self.string_at_with(index, opts),
        }
    }

    /// Element `index` as a one-element value of the same type.
    pub fn element_value(&self, index: usize) -> EvalResult {
        self.check_index(index)?;
        Ok(match self {
            Value::Logical(e) => Value::logical(e.as_slice()[index]),
            Value::Int(e) => Value::int(e.as_slice()[index]),
            Value::Float(e) => Value::float(e.as_slice()[index]),
            Value::String(e) => Value::string(e.as_slice()[index].clone()),
            Value::Object(v) => Value::object(v.elements()[index].clone()),
            Value::Null { .. } => Value::null(),
        })
    }

    /// A value built from the elements at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> EvalResult {
        let mut result = self.new_matching_type();
        for &index in indices {
            result.push_value_from_index_of(index, self)?;
        }
        Ok(result)
    }
}

// Construction by example
impl Value {
    /// An empty value of the same variant; object values keep their class tag.
    pub fn new_matching_type(&self) -> Value {
        match self {
            Value::Object(v) => Value::empty_object(v.class),
            other => Value::empty_of(other.value_type()),
        }
    }

    /// Append element `index` of `other`, coerced to this value's type.
    ///
    /// This is the single primitive behind `rep`, `repEach`, `sample`, `rev`,
    /// `sort` and `ifelse`.
    pub fn push_value_from_index_of(&mut self, index: usize, other: &Value) -> Result<(), EvalError> {
        match self {
            Value::Null { .. } => {
                other.check_index(index)?;
                Err(conversion_failed(
                    other.type_name(),
                    "NULL",
                    other.element_text(index, DisplayOptions::default())?,
                ))
            }
            Value::Logical(e) => {
                e.push(other.logical_at(index)?);
                Ok(())
            }
            Value::Int(e) => {
                e.push(other.int_at(index)?);
                Ok(())
            }
            Value::Float(e) => {
                e.push(other.float_at(index)?);
                Ok(())
            }
            Value::String(e) => {
                e.push(other.string_at(index)?);
                Ok(())
            }
            Value::Object(v) => v.push(other.object_at(index)?),
        }
    }

    /// Mark a NULL value invisible; other values are returned unchanged.
    #[must_use]
    pub fn into_invisible(self) -> Value {
        match self {
            Value::Null { .. } => Value::invisible_null(),
            other => other,
        }
    }
}

// Rendering
impl Value {
    /// Canonical print form: elements separated by spaces, strings quoted.
    pub fn print_form(&self, opts: DisplayOptions) -> String {
        match self {
            Value::Null { .. } => "NULL".to_string(),
            _ if self.is_empty() => format!("{}(0)", self.type_name()),
            Value::Logical(e) => join(e.as_slice(), |v| logical_text(*v).to_string()),
            Value::Int(e) => join(e.as_slice(), ToString::to_string),
            Value::Float(e) => join(e.as_slice(), |v| format_float(*v, opts.float_precision)),
            Value::String(e) => join(e.as_slice(), |s| quoted(s)),
            Value::Object(v) => join(v.elements(), |o| o.print_form()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print_form(DisplayOptions::default()))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null { .. }, Value::Null { .. }) => true,
            (Value::Logical(a), Value::Logical(b)) => a.as_slice() == b.as_slice(),
            (Value::Int(a), Value::Int(b)) => a.as_slice() == b.as_slice(),
            (Value::Float(a), Value::Float(b)) => a.as_slice() == b.as_slice(),
            (Value::String(a), Value::String(b)) => a.as_slice() == b.as_slice(),
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a
                        .elements()
                        .iter()
                        .zip(b.elements())
                        .all(|(x, y)| compare::same_object(x, y))
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::logical(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

#[inline]
fn logical_text(value: bool) -> &'static str {
    if value {
        "T"
    } else {
        "F"
    }
}

fn quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len().saturating_add(2));
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn join<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(" ")
}

fn parse_logical(s: &str) -> Option<bool> {
    match s {
        "T" | "true" | "TRUE" => Some(true),
        "F" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_float(s: &str) -> Option<f64> {
    match s {
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NAN" => Some(f64::NAN),
        _ => s.parse::<f64>().ok(),
    }
}

/// Truncate toward zero; `None` for NaN, infinities and values outside `i64`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "range is checked before the cast"
)]
fn float_to_int(value: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if (-LIMIT..LIMIT).contains(&truncated) {
        Some(truncated as i64)
    } else {
        None
    }
}
