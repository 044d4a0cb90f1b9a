//! Singleton-or-vector element storage.

use std::slice;

use super::heap::Heap;

/// Elements of one value, in singleton or shared-vector form.
///
/// The singleton form avoids a heap allocation for the very common
/// one-element result. Callers must not rely on which form backs a
/// one-element value: `Vector` with a single element is equally valid.
#[derive(Clone, Debug)]
pub enum Elements<T> {
    Singleton(T),
    Vector(Heap<Vec<T>>),
}

impl<T: Clone> Elements<T> {
    #[inline]
    pub(crate) fn one(value: T) -> Self {
        Elements::Singleton(value)
    }

    #[inline]
    pub(crate) fn from_vec(values: Vec<T>) -> Self {
        Elements::Vector(Heap::new(values))
    }

    #[inline]
    pub(crate) fn empty() -> Self {
        Elements::from_vec(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Elements::Singleton(_) => 1,
            Elements::Vector(values) => values.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is the dedicated singleton form.
    #[inline]
    pub fn is_singleton_form(&self) -> bool {
        matches!(self, Elements::Singleton(_))
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Elements::Singleton(value) => slice::from_ref(value),
            Elements::Vector(values) => values.as_slice(),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Append an element, converting a singleton to vector form.
    pub(crate) fn push(&mut self, value: T) {
        match self {
            Elements::Singleton(first) => {
                let first = first.clone();
                *self = Elements::from_vec(vec![first, value]);
            }
            Elements::Vector(values) => values.make_mut().push(value),
        }
    }
}
