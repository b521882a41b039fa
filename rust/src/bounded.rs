//! Bounded, index-addressed storage for node slots.
//!
//! Nodes have a fixed fan-out. `BoundedVec` keeps that bound next to the
//! items so every insertion checks occupancy against it instead of trusting
//! the caller.

use std::ops::Deref;

/// A vector that never grows past a fixed bound.
///
/// Storage for the full bound is reserved up front, so a node never
/// reallocates once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundedVec<T> {
    items: Vec<T>,
    bound: usize,
}

impl<T> BoundedVec<T> {
    /// Create an empty sequence holding at most `bound` items.
    pub fn new(bound: usize) -> Self {
        Self {
            items: Vec::with_capacity(bound),
            bound,
        }
    }

    /// Returns true if no more items fit.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.bound
    }

    /// Insert `item` at `index`, shifting later items up by one.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is full or `index > len`.
    pub fn insert(&mut self, index: usize, item: T) {
        assert!(
            !self.is_full(),
            "bounded sequence overflow: {} items, bound {}",
            self.items.len(),
            self.bound
        );
        self.items.insert(index, item);
    }

    /// Append `item` at the end.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is full.
    pub fn push(&mut self, item: T) {
        let len = self.items.len();
        self.insert(len, item);
    }

    /// Remove and return the item at `index`, shifting later items down.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    /// Overwrite the item at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn replace(&mut self, index: usize, item: T) -> T {
        std::mem::replace(&mut self.items[index], item)
    }

    /// Move the items at `[at, len)` into a new sequence with the same bound.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    pub fn split_off(&mut self, at: usize) -> Self {
        let mut tail = Self::new(self.bound);
        tail.items.extend(self.items.drain(at..));
        tail
    }
}

impl<T> Deref for BoundedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}
