//! Shared, copy-on-write storage for vector values.
//!
//! `Heap<T>` wraps an `Arc<T>` whose constructor is visible only inside the
//! value module, so every vector allocation goes through a `Value` factory.
//! Cloning a `Heap` shares the allocation; mutation through `make_mut`
//! copies it first when other holders exist. A value stored in a symbol
//! table and the same value held by the evaluator therefore never observe
//! each other's mutations.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Reference-counted, copy-on-write vector storage.
#[repr(transparent)]
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }

    /// Whether two handles share one allocation.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: Clone> Heap<T> {
    /// Mutable access, copying the storage first if it is shared.
    #[inline]
    pub(super) fn make_mut(&mut self) -> &mut T {
        Arc::make_mut(&mut self.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
