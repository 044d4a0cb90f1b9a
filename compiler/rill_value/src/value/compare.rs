//! Element-wise equality and ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use super::Value;
use crate::ObjectRef;

/// Identity comparison of two object references.
#[inline]
pub(super) fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl Value {
    /// Whether element `i` of `self` equals element `j` of `other`.
    ///
    /// Elements of different types never compare equal; objects compare by
    /// identity; NaN is unequal to everything. Out-of-range positions are
    /// unequal.
    pub fn element_eq(&self, i: usize, other: &Value, j: usize) -> bool {
        match (self, other) {
            (Value::Logical(a), Value::Logical(b)) => a.get(i).is_some_and(|x| b.get(j) == Some(x)),
            (Value::Int(a), Value::Int(b)) => a.get(i).is_some_and(|x| b.get(j) == Some(x)),
            (Value::Float(a), Value::Float(b)) => a.get(i).is_some_and(|x| b.get(j) == Some(x)),
            (Value::String(a), Value::String(b)) => a.get(i).is_some_and(|x| b.get(j) == Some(x)),
            (Value::Object(a), Value::Object(b)) => match (a.elements().get(i), b.elements().get(j)) {
                (Some(x), Some(y)) => same_object(x, y),
                _ => false,
            },
            _ => false,
        }
    }

    /// Ordering of elements `i` and `j` of this value, for sorting.
    ///
    /// `F < T`; floats use the IEEE total order (NaN sorts last); strings
    /// compare bytewise. Objects and NULL have no order and compare equal.
    pub fn element_cmp(&self, i: usize, j: usize) -> Ordering {
        fn by<T>(items: &[T], i: usize, j: usize, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
            match (items.get(i), items.get(j)) {
                (Some(a), Some(b)) => cmp(a, b),
                _ => Ordering::Equal,
            }
        }

        match self {
            Value::Logical(e) => by(e.as_slice(), i, j, Ord::cmp),
            Value::Int(e) => by(e.as_slice(), i, j, Ord::cmp),
            Value::Float(e) => by(e.as_slice(), i, j, f64::total_cmp),
            Value::String(e) => by(e.as_slice(), i, j, Ord::cmp),
            Value::Object(_) | Value::Null { .. } => Ordering::Equal,
        }
    }
}
