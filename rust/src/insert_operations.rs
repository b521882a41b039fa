//! INSERT operations for ConcurrentBTree.
//!
//! Writers descend top-down holding exclusive locks hand-over-hand and split
//! every full node before entering it. A split's separator therefore always
//! lands in a parent that is already locked and known to have room, and no
//! split ever propagates upward.
//!
//! Lock order is global: tree lock, then root, then each level down to the
//! leaf. The tree lock is held only while the root is created or replaced.

use std::sync::atomic::Ordering;

use tracing::{debug, trace};

use crate::comparator::KeyComparator;
use crate::types::{ConcurrentBTree, InnerNode, LeafNode, Node, NodeRef, NodeWriteGuard};

impl<K: Clone, V, C: KeyComparator<K>> ConcurrentBTree<K, V, C> {
    /// Insert a key-value pair, replacing the value if the key is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use cbtree::ConcurrentBTree;
    ///
    /// let tree = ConcurrentBTree::new(4).unwrap();
    /// for k in 1..=5 {
    ///     tree.put(k, k * 10);
    /// }
    /// tree.put(3, 33);
    /// assert_eq!(tree.get(&3), Some(33));
    /// assert_eq!(tree.len(), 5);
    /// assert_eq!(tree.root_level(), Some(1));
    /// ```
    pub fn put(&self, key: K, value: V) {
        let mut root = self.root.write();

        let Some(old_root) = (*root).clone() else {
            let mut leaf = LeafNode::new(self.capacity);
            leaf.insert(key, value, &self.comparator);
            let leaf = self.nodes.allocate(Node::Leaf(leaf));
            trace!(leaf_id = leaf.id(), "created first leaf");
            *root = Some(leaf);
            self.len.fetch_add(1, Ordering::Release);
            return;
        };

        let mut current = old_root.write_arc();
        if current.is_full() {
            let level = current.level();
            let (separator, right) = self.split_node(&mut current);
            let right_guard = self.comparator.less(&separator, &key).then(|| right.write_arc());

            let old_root_id = old_root.id();
            let new_root = self.nodes.allocate(Node::Inner(InnerNode::with_children(
                self.capacity,
                level + 1,
                old_root,
                separator,
                right,
            )));
            debug!(
                old_root = old_root_id,
                new_root = new_root.id(),
                level = level + 1,
                "tree grew a new root"
            );
            *root = Some(new_root);

            if let Some(right_guard) = right_guard {
                current = right_guard;
            }
        }
        drop(root);

        loop {
            let next = match &mut *current {
                Node::Leaf(leaf) => {
                    if leaf.insert(key, value, &self.comparator).is_none() {
                        self.len.fetch_add(1, Ordering::Release);
                    }
                    return;
                }
                Node::Inner(inner) => self.lock_child_for_insert(inner, &key),
            };
            // The child is locked; releasing the parent completes the hand-over.
            current = next;
        }
    }

    /// Exclusively lock the child of `parent` that `key` routes to, splitting
    /// it first if it is full.
    ///
    /// `parent` is locked by the caller and not full, so it can take the
    /// split's separator. The returned guard is for whichever half of the
    /// split now covers `key`.
    fn lock_child_for_insert(&self, parent: &mut InnerNode<K, V>, key: &K) -> NodeWriteGuard<K, V> {
        let mut child = parent.child_for(key, &self.comparator).write_arc();
        if !child.is_full() {
            return child;
        }

        let (separator, right) = self.split_node(&mut child);
        // Nobody else can reach the new half while `parent` is held.
        let right_guard = self.comparator.less(&separator, key).then(|| right.write_arc());
        parent.insert_split(separator, right, &self.comparator);

        match right_guard {
            Some(right_guard) => right_guard,
            None => child,
        }
    }

    /// Split a full node in place and allocate its new right half.
    ///
    /// Returns the separator for the parent and the handle of the right half.
    /// The right half is unreachable until the separator is linked into a
    /// parent the caller holds exclusively.
    fn split_node(&self, node: &mut Node<K, V>) -> (K, NodeRef<K, V>) {
        match node {
            Node::Leaf(leaf) => {
                let (right, separator) = leaf.split();
                let (left_len, right_len) = (leaf.len(), right.len());
                let right = self.nodes.allocate(Node::Leaf(right));
                trace!(right_id = right.id(), left_len, right_len, "split leaf");
                (separator, right)
            }
            Node::Inner(inner) => {
                let (right, separator) = inner.split();
                let level = inner.level();
                let right = self.nodes.allocate(Node::Inner(right));
                trace!(right_id = right.id(), level, "split inner node");
                (separator, right)
            }
        }
    }
}
