//! Construction and configuration for ConcurrentBTree.
//!
//! This module contains capacity validation, the tree configuration type and
//! the constructors built on it.

use std::sync::atomic::AtomicUsize;

use parking_lot::RwLock;

use crate::arena::NodeAllocator;
use crate::comparator::NaturalOrder;
use crate::error::{BTreeError, InitResult};
use crate::types::{ConcurrentBTree, MIN_CAPACITY};

/// Default capacity for B+ tree nodes
pub const DEFAULT_CAPACITY: usize = 64;

/// Tree configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum number of keys per node (minimum 3).
    ///
    /// A split leaf keeps `capacity / 2 + 1` keys, so at capacity 2 it would
    /// still be full and could not take the key being inserted.
    ///
    /// Larger nodes mean fewer levels and fewer splits; even values around 64
    /// work well.
    pub capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl TreeConfig {
    /// Set the node capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Check that the configuration describes a usable tree.
    pub fn validate(&self) -> InitResult<()> {
        if self.capacity < MIN_CAPACITY {
            return Err(BTreeError::invalid_capacity(self.capacity, MIN_CAPACITY));
        }
        Ok(())
    }
}

impl<K, V> ConcurrentBTree<K, V, NaturalOrder> {
    /// Create a B+ tree ordered by `K`'s `Ord` implementation.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of keys per node (minimum 3)
    ///
    /// # Errors
    ///
    /// Returns [`BTreeError::InvalidCapacity`] below [`MIN_CAPACITY`]: a leaf
    /// split keeps `capacity / 2 + 1` keys on the left, which at capacity 2
    /// leaves no room for the key being inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use cbtree::ConcurrentBTree;
    ///
    /// let tree = ConcurrentBTree::<i32, String>::new(16).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(ConcurrentBTree::<i32, String>::new(2).is_err());
    /// ```
    pub fn new(capacity: usize) -> InitResult<Self> {
        Self::with_comparator(capacity, NaturalOrder)
    }

    /// Create a B+ tree with default capacity.
    ///
    /// This is equivalent to calling `new(DEFAULT_CAPACITY)`.
    pub fn with_default_capacity() -> InitResult<Self> {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V, C> ConcurrentBTree<K, V, C> {
    /// Create a B+ tree ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cbtree::{BytewiseComparator, ConcurrentBTree, encode_u64_be};
    ///
    /// let tree = ConcurrentBTree::with_comparator(64, BytewiseComparator).unwrap();
    /// tree.put(encode_u64_be(7).to_vec(), encode_u64_be(14).to_vec());
    /// assert_eq!(tree.get(&encode_u64_be(7).to_vec()), Some(encode_u64_be(14).to_vec()));
    /// ```
    pub fn with_comparator(capacity: usize, comparator: C) -> InitResult<Self> {
        Self::with_config(TreeConfig::default().with_capacity(capacity), comparator)
    }

    /// Create a B+ tree from a configuration.
    pub fn with_config(config: TreeConfig, comparator: C) -> InitResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config, comparator))
    }

    fn from_valid_config(config: TreeConfig, comparator: C) -> Self {
        Self {
            capacity: config.capacity,
            comparator,
            nodes: NodeAllocator::new(),
            root: RwLock::new(None),
            len: AtomicUsize::new(0),
        }
    }
}

impl<K, V, C: Default> Default for ConcurrentBTree<K, V, C> {
    fn default() -> Self {
        Self::from_valid_config(TreeConfig::default(), C::default())
    }
}
