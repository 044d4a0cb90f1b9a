#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add complexity across the crate"
)]
//! Rill Value - runtime values and reflection for the Rill evaluator.
//!
//! This crate provides:
//! - Runtime values (`Value`, `ValueType`, `Elements`, `Heap`)
//! - Evaluation errors (`EvalError`, `EvalErrorKind`, `EvalResult`)
//! - Type masks and call signatures (`TypeMask`, `CallSignature`, `MethodSignature`)
//! - Class reflection (`ClassDescriptor`, `PropertySignature`)
//! - The host object extension trait (`ScriptObject`)
//! - The accelerated bulk property protocol (`accelerated`)
//!
//! # Architecture
//!
//! Everything here is evaluator-independent: the dispatch engine in
//! `rill_eval` and host crates both build on these types. Signatures and
//! class descriptors are built once and then shared read-only; values are
//! cheap to clone and copy-on-write.

pub mod accelerated;
mod class;
pub mod errors;
mod mask;
mod object;
mod signature;
mod value;

pub use class::{
    root_get_property, root_instance_method, root_set_property, AcceleratedGetter,
    AcceleratedSetter, ClassDescriptor, PropertySignature, SignatureBuilder, OBJECT_CLASS,
};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use mask::TypeMask;
pub use object::{downcast, CallContext, ObjectRef, ScriptObject};
pub use signature::{
    AcceleratedMethodFn, Args, CallSignature, CallableKind, ClassMethodFn, DefaultValue,
    MethodKind, MethodSignature, Param,
};
pub use value::{
    checked_product, checked_sum, format_float, DisplayOptions, Elements, Heap, ObjectVector,
    Value, ValueType,
};

#[cfg(test)]
mod test_helpers;
