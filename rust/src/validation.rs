//! Validation and debugging utilities for ConcurrentBTree.
//!
//! These walk the whole tree under shared locks, top-down, so they are safe
//! to call at any time, but the picture they return is only stable when no
//! writer is mid-operation.

use crate::comparator::KeyComparator;
use crate::error::{BTreeError, TreeResult};
use crate::types::{ConcurrentBTree, Level, Node, NodeId, NodeRef, TreeStats};

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl<K, V, C: KeyComparator<K>> ConcurrentBTree<K, V, C> {
    /// Check that the tree satisfies every B+ tree invariant.
    ///
    /// Verifies that keys are strictly ascending in every node, that each
    /// subtree stays inside the range its parent's separators assign it, that
    /// no node exceeds capacity, that levels decrease by one per step down to
    /// leaves at level 0, and that the leaves hold exactly `len()` entries.
    pub fn check_invariants(&self) -> TreeResult<()> {
        let root = self.root.read();
        let entries = match root.as_ref() {
            Some(root) => self.check_node(root, None, None, None)?,
            None => 0,
        };
        if entries != self.len() {
            return Err(BTreeError::data_integrity(
                "entry count",
                &format!("counter says {}, leaves hold {}", self.len(), entries),
            ));
        }
        Ok(())
    }

    /// Recursively check a node and its subtree, returning its entry count.
    fn check_node(
        &self,
        handle: &NodeRef<K, V>,
        lower: Option<&K>,
        upper: Option<&K>,
        expected_level: Option<Level>,
    ) -> TreeResult<usize> {
        let id = handle.id();
        let node = handle.read();

        if let Some(level) = expected_level {
            if node.level() != level {
                return Err(BTreeError::corrupted_node(
                    id,
                    &format!("level {} where {} was expected", node.level(), level),
                ));
            }
        }
        if node.key_count() > self.capacity {
            return Err(BTreeError::CapacityExceeded {
                node: id,
                count: node.key_count(),
                capacity: self.capacity,
            });
        }

        match &*node {
            Node::Leaf(leaf) => {
                if leaf.keys().len() != leaf.values().len() {
                    return Err(BTreeError::corrupted_node(
                        id,
                        &format!(
                            "{} keys but {} values",
                            leaf.keys().len(),
                            leaf.values().len()
                        ),
                    ));
                }
                self.check_keys(id, leaf.keys(), lower, upper)?;
                Ok(leaf.len())
            }
            Node::Inner(inner) => {
                if inner.level() == 0 {
                    return Err(BTreeError::corrupted_node(id, "inner node at leaf level"));
                }
                if inner.children().len() != inner.keys().len() + 1 {
                    return Err(BTreeError::corrupted_node(
                        id,
                        &format!(
                            "{} separators but {} children",
                            inner.keys().len(),
                            inner.children().len()
                        ),
                    ));
                }
                self.check_keys(id, inner.keys(), lower, upper)?;

                let keys = inner.keys();
                let mut entries = 0;
                for (i, child) in inner.children().iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(&keys[i - 1]) };
                    let child_upper = if i == keys.len() { upper } else { Some(&keys[i]) };
                    entries +=
                        self.check_node(child, child_lower, child_upper, Some(inner.level() - 1))?;
                }
                Ok(entries)
            }
        }
    }

    /// Keys must be strictly ascending and lie in `(lower, upper]`.
    fn check_keys(
        &self,
        id: NodeId,
        keys: &[K],
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> TreeResult<()> {
        let cmp = &self.comparator;
        if let Some(i) = keys.windows(2).position(|pair| !cmp.less(&pair[0], &pair[1])) {
            return Err(BTreeError::corrupted_node(
                id,
                &format!("keys out of order at index {}", i + 1),
            ));
        }
        if let (Some(lower), Some(first)) = (lower, keys.first()) {
            if !cmp.less(lower, first) {
                return Err(BTreeError::corrupted_node(
                    id,
                    "first key not above the parent's lower separator",
                ));
            }
        }
        if let (Some(upper), Some(last)) = (upper, keys.last()) {
            if cmp.less(upper, last) {
                return Err(BTreeError::corrupted_node(
                    id,
                    "last key above the parent's upper separator",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// DEBUGGING AND TESTING UTILITIES
// ============================================================================

impl<K, V, C> ConcurrentBTree<K, V, C> {
    /// Visit every reachable node in key order, parents before children.
    ///
    /// The visitor also gets the node's depth below the root, taken from the
    /// walk itself, so it stays consistent even if the root grows meanwhile.
    fn visit_nodes<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, usize, &Node<K, V>),
    {
        let root = self.root.read();
        if let Some(root) = root.as_ref() {
            self.visit_subtree(root, 0, &mut visit);
        }
    }

    fn visit_subtree<F>(&self, handle: &NodeRef<K, V>, depth: usize, visit: &mut F)
    where
        F: FnMut(NodeId, usize, &Node<K, V>),
    {
        let node = handle.read();
        visit(handle.id(), depth, &*node);
        if let Node::Inner(inner) = &*node {
            for child in inner.children() {
                self.visit_subtree(child, depth + 1, visit);
            }
        }
    }

    /// Returns the sizes of all leaf nodes in key order.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        self.visit_nodes(|_, _, node| {
            if let Node::Leaf(leaf) = node {
                sizes.push(leaf.len());
            }
        });
        sizes
    }

    /// Returns a copy of the root's separators; empty while the root is a leaf.
    pub fn root_separators(&self) -> Vec<K>
    where
        K: Clone,
    {
        match self.lock_root_shared().as_deref() {
            Some(Node::Inner(inner)) => inner.keys().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Gather node counts and shape information.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.visit_nodes(|_, _, node| match node {
            Node::Leaf(leaf) => {
                stats.leaf_count += 1;
                stats.entries += leaf.len();
            }
            Node::Inner(_) => stats.inner_count += 1,
        });
        // Read after the walk so every node it saw is counted.
        stats.allocated_nodes = self.nodes.allocated();
        stats.height = self.height();
        stats
    }

    /// One line per node, indented two spaces per level below the root.
    pub fn structure_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.visit_nodes(|id, depth, node| {
            let indent = "  ".repeat(depth);
            lines.push(match node {
                Node::Leaf(leaf) => format!("{}Leaf[id={}]: {} keys", indent, id, leaf.len()),
                Node::Inner(inner) => format!(
                    "{}Inner[id={}, level={}]: {} keys, {} children",
                    indent,
                    id,
                    inner.level(),
                    inner.len(),
                    inner.children().len()
                ),
            });
        });
        lines
    }

    /// Prints the tree structure for debugging.
    pub fn print_structure(&self) {
        println!("Tree structure:");
        for line in self.structure_lines() {
            println!("{}", line);
        }
    }
}
