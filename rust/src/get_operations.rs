//! GET operations for ConcurrentBTree.
//!
//! This module contains the read path: a shared-lock descent that couples
//! hand-over-hand from the tree-wide root lock down to a leaf, plus cheap
//! accessors that read the tree's counters.

use std::sync::atomic::Ordering;

use crate::comparator::KeyComparator;
use crate::types::{ConcurrentBTree, Level, Node, NodeReadGuard};

impl<K, V, C: KeyComparator<K>> ConcurrentBTree<K, V, C> {
    /// Get a copy of the value associated with a key.
    ///
    /// At most two node locks are held at any moment, both shared. The tree
    /// lock is held in shared mode only until the root's lock is taken, so a
    /// concurrent root split cannot hand this lookup a stale root.
    ///
    /// # Examples
    ///
    /// ```
    /// use cbtree::ConcurrentBTree;
    ///
    /// let tree = ConcurrentBTree::new(16).unwrap();
    /// tree.put(1, "one");
    /// assert_eq!(tree.get(&1), Some("one"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        if self.is_empty() {
            return None;
        }

        let mut current = self.lock_root_shared()?;
        loop {
            let next = match &*current {
                Node::Leaf(leaf) => return leaf.get(key, &self.comparator).cloned(),
                Node::Inner(inner) => inner.child_for(key, &self.comparator).read_arc(),
            };
            // The child is locked before the parent guard is dropped.
            current = next;
        }
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        if self.is_empty() {
            return false;
        }

        let Some(mut current) = self.lock_root_shared() else {
            return false;
        };
        loop {
            let next = match &*current {
                Node::Leaf(leaf) => return leaf.lower_bound(key, &self.comparator).1,
                Node::Inner(inner) => inner.child_for(key, &self.comparator).read_arc(),
            };
            current = next;
        }
    }
}

impl<K, V, C> ConcurrentBTree<K, V, C> {
    /// Couple from the tree lock onto the root node's shared lock.
    pub(crate) fn lock_root_shared(&self) -> Option<NodeReadGuard<K, V>> {
        let root = self.root.read();
        let guard = root.as_ref()?.read_arc();
        Some(guard)
    }

    /// Returns the number of distinct keys in the tree.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Returns true if nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of keys per node.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Level of the current root, or `None` for an empty tree.
    pub fn root_level(&self) -> Option<Level> {
        self.lock_root_shared().map(|root| root.level())
    }

    /// Number of levels in the tree; 0 when empty, 1 for a lone leaf.
    pub fn height(&self) -> usize {
        self.root_level().map_or(0, |level| usize::from(level) + 1)
    }
}
