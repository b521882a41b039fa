//! Node implementations for ConcurrentBTree.
//!
//! This module contains the search, insertion and split algorithms for
//! LeafNode and InnerNode. None of these methods lock anything: callers hold
//! the node's lock (shared for searches, exclusive for everything else).

use crate::bounded::BoundedVec;
use crate::comparator::KeyComparator;
use crate::types::{InnerNode, Level, LeafNode, NodeRef};

/// Binary search for the first key not less than `key`.
///
/// Returns that position (or `keys.len()` if every key is less) and whether
/// the key there is equivalent to `key`.
#[inline]
fn lower_bound_in<K, C>(keys: &[K], key: &K, comparator: &C) -> (usize, bool)
where
    C: KeyComparator<K>,
{
    let index = keys.partition_point(|slot| comparator.less(slot, key));
    let exact = index < keys.len() && !comparator.less(key, &keys[index]);
    (index, exact)
}

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl<K, V> LeafNode<K, V> {
    /// Creates a new empty leaf holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: BoundedVec::new(capacity),
            values: BoundedVec::new(capacity),
        }
    }

    /// Returns the number of key-value pairs in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this leaf node is at capacity.
    pub fn is_full(&self) -> bool {
        self.keys.is_full()
    }

    /// Sorted keys of this leaf.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Values of this leaf, paired with [`LeafNode::keys`] by index.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Position of `key`, or the slot where it would be inserted, and whether
    /// it is present.
    pub fn lower_bound<C: KeyComparator<K>>(&self, key: &K, comparator: &C) -> (usize, bool) {
        lower_bound_in(&self.keys, key, comparator)
    }

    /// Get a value by key from this leaf node.
    pub fn get<C: KeyComparator<K>>(&self, key: &K, comparator: &C) -> Option<&V> {
        match self.lower_bound(key, comparator) {
            (index, true) => Some(&self.values[index]),
            _ => None,
        }
    }

    /// Upsert a key-value pair, returning the replaced value if the key was
    /// already present.
    ///
    /// The caller must make sure the leaf is not full; inserting a new key
    /// into a full leaf panics.
    pub fn insert<C: KeyComparator<K>>(&mut self, key: K, value: V, comparator: &C) -> Option<V> {
        let (index, exact) = self.lower_bound(&key, comparator);
        if exact {
            return Some(self.values.replace(index, value));
        }
        self.keys.insert(index, key);
        self.values.insert(index, value);
        None
    }

    /// Split this leaf, returning the new right half and the separator key.
    ///
    /// The left half keeps `len / 2 + 1` entries. The separator is the left
    /// half's largest key; it stays in the leaf and is copied into the parent.
    pub fn split(&mut self) -> (LeafNode<K, V>, K)
    where
        K: Clone,
    {
        let mid = self.keys.len() / 2;
        let separator = self.keys[mid].clone();
        let new_right = LeafNode {
            keys: self.keys.split_off(mid + 1),
            values: self.values.split_off(mid + 1),
        };
        (new_right, separator)
    }
}

// ============================================================================
// INNER NODE IMPLEMENTATION
// ============================================================================

impl<K, V> InnerNode<K, V> {
    /// Creates a new empty inner node at `level` holding at most `capacity`
    /// separators and `capacity + 1` children.
    pub fn new(capacity: usize, level: Level) -> Self {
        Self {
            level,
            keys: BoundedVec::new(capacity),
            children: BoundedVec::new(capacity + 1),
        }
    }

    /// Creates a root over two halves of a split, one level above them.
    pub fn with_children(
        capacity: usize,
        level: Level,
        left: NodeRef<K, V>,
        separator: K,
        right: NodeRef<K, V>,
    ) -> Self {
        let mut node = Self::new(capacity, level);
        node.keys.push(separator);
        node.children.push(left);
        node.children.push(right);
        node
    }

    /// Returns the number of separator keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this node holds `capacity` separators.
    pub fn is_full(&self) -> bool {
        self.keys.is_full()
    }

    /// Height of this node above the leaves.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Sorted separator keys.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Child handles, one more than the separators.
    pub fn children(&self) -> &[NodeRef<K, V>] {
        &self.children
    }

    /// Child slot whose subtree may contain `key`.
    ///
    /// The slot is the first separator not less than `key`, so a key equal to
    /// a separator routes left of it; when every separator is less, the last
    /// child is returned. The flag reports whether that separator is
    /// equivalent to `key` and plays no part in routing.
    pub fn lower_bound<C: KeyComparator<K>>(&self, key: &K, comparator: &C) -> (usize, bool) {
        lower_bound_in(&self.keys, key, comparator)
    }

    /// Child that `key` routes to.
    #[inline]
    pub fn child_for<C: KeyComparator<K>>(&self, key: &K, comparator: &C) -> &NodeRef<K, V> {
        &self.children[self.lower_bound(key, comparator).0]
    }

    /// Insert a separator produced by splitting a child, together with the new
    /// right half of that child.
    ///
    /// The caller must make sure the node is not full.
    pub fn insert_split<C: KeyComparator<K>>(
        &mut self,
        key: K,
        new_child: NodeRef<K, V>,
        comparator: &C,
    ) {
        let (index, _) = self.lower_bound(&key, comparator);
        self.keys.insert(index, key);
        self.children.insert(index + 1, new_child);
    }

    /// Split this node, returning the new right half and the promoted key.
    ///
    /// With `mid = (len - 1) / 2` the left half keeps separators `[0, mid)`
    /// and children `[0, mid]`; `keys[mid]` moves up to the parent and is kept
    /// by neither half. The right half sits at the same level.
    pub fn split(&mut self) -> (InnerNode<K, V>, K) {
        let mid = (self.keys.len() - 1) / 2;
        let mut right_keys = self.keys.split_off(mid);
        let separator = right_keys.remove(0);
        let new_right = InnerNode {
            level: self.level,
            keys: right_keys,
            children: self.children.split_off(mid + 1),
        };
        (new_right, separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::NodeAllocator;
    use crate::comparator::NaturalOrder;
    use crate::types::{Node, NodeId};

    fn leaf_with(capacity: usize, keys: &[u32]) -> LeafNode<u32, String> {
        let mut leaf = LeafNode::new(capacity);
        for &k in keys {
            leaf.insert(k, format!("v{}", k), &NaturalOrder);
        }
        leaf
    }

    /// An inner node over `keys.len() + 1` empty leaves with ids 0, 1, 2, ...
    fn inner_with(
        nodes: &NodeAllocator,
        capacity: usize,
        keys: &[u32],
    ) -> InnerNode<u32, String> {
        let mut node = InnerNode::new(capacity, 1);
        node.children.push(nodes.allocate(Node::Leaf(LeafNode::new(capacity))));
        for &k in keys {
            node.keys.push(k);
            node.children.push(nodes.allocate(Node::Leaf(LeafNode::new(capacity))));
        }
        node
    }

    fn child_ids<K, V>(node: &InnerNode<K, V>) -> Vec<NodeId> {
        node.children().iter().map(|child| child.id()).collect()
    }

    fn leaf_handle(nodes: &NodeAllocator) -> NodeRef<u32, String> {
        nodes.allocate(Node::Leaf(LeafNode::new(4)))
    }

    #[test]
    fn test_leaf_lower_bound() {
        let leaf = leaf_with(8, &[10, 20, 30]);
        assert_eq!(leaf.lower_bound(&5, &NaturalOrder), (0, false));
        assert_eq!(leaf.lower_bound(&20, &NaturalOrder), (1, true));
        assert_eq!(leaf.lower_bound(&25, &NaturalOrder), (2, false));
        assert_eq!(leaf.lower_bound(&35, &NaturalOrder), (3, false));

        let empty: LeafNode<u32, ()> = LeafNode::new(4);
        assert_eq!(empty.lower_bound(&1, &NaturalOrder), (0, false));
    }

    #[test]
    fn test_leaf_insert_is_upsert() {
        let mut leaf = leaf_with(4, &[3, 1, 2]);
        assert_eq!(leaf.keys(), &[1, 2, 3]);
        let old = leaf.insert(2, "two".to_string(), &NaturalOrder);
        assert_eq!(old.as_deref(), Some("v2"));
        assert_eq!(leaf.len(), 3);
        assert_eq!(leaf.get(&2, &NaturalOrder).map(String::as_str), Some("two"));
        assert_eq!(leaf.get(&4, &NaturalOrder), None);
    }

    #[test]
    fn test_leaf_split_keeps_median_on_the_left() {
        let mut left = leaf_with(4, &[1, 2, 3, 4]);
        assert!(left.is_full());
        let (right, separator) = left.split();
        assert_eq!(separator, 3);
        assert_eq!(left.keys(), &[1, 2, 3]);
        assert_eq!(right.keys(), &[4]);
        assert_eq!(right.values(), &["v4".to_string()]);
        assert_eq!(left.len() + right.len(), 4);
        assert_eq!(left.keys().last(), Some(&separator));
    }

    #[test]
    fn test_leaf_split_odd_capacity() {
        let mut left = leaf_with(5, &[10, 20, 30, 40, 50]);
        let (right, separator) = left.split();
        assert_eq!(separator, 30);
        assert_eq!(left.keys(), &[10, 20, 30]);
        assert_eq!(right.keys(), &[40, 50]);
        assert!(!left.is_full() && !right.is_full());
    }

    #[test]
    fn test_inner_lower_bound_routes_equal_keys_left() {
        let nodes = NodeAllocator::new();
        let node = inner_with(&nodes, 4, &[10, 20, 30]);
        assert_eq!(node.lower_bound(&5, &NaturalOrder), (0, false));
        assert_eq!(node.lower_bound(&10, &NaturalOrder), (0, true));
        assert_eq!(node.lower_bound(&11, &NaturalOrder), (1, false));
        assert_eq!(node.lower_bound(&30, &NaturalOrder), (2, true));
        assert_eq!(node.lower_bound(&31, &NaturalOrder), (3, false));
        assert_eq!(node.child_for(&31, &NaturalOrder).id(), 3);
        assert_eq!(node.child_for(&10, &NaturalOrder).id(), 0);
    }

    #[test]
    fn test_inner_insert_split_places_child_right_of_separator() {
        let nodes = NodeAllocator::new();
        let mut node = inner_with(&nodes, 4, &[10, 30]);
        let first = leaf_handle(&nodes);
        let second = leaf_handle(&nodes);
        node.insert_split(20, first, &NaturalOrder);
        assert_eq!(node.keys(), &[10, 20, 30]);
        assert_eq!(child_ids(&node), vec![0, 1, 3, 2]);

        node.insert_split(40, second, &NaturalOrder);
        assert_eq!(node.keys(), &[10, 20, 30, 40]);
        assert_eq!(child_ids(&node), vec![0, 1, 3, 2, 4]);
        assert!(node.is_full());
    }

    #[test]
    fn test_inner_split_promotes_middle_key() {
        let nodes = NodeAllocator::new();
        let mut left = inner_with(&nodes, 4, &[10, 20, 30, 40]);
        let (right, separator) = left.split();
        assert_eq!(separator, 20);
        assert_eq!(left.keys(), &[10]);
        assert_eq!(child_ids(&left), vec![0, 1]);
        assert_eq!(right.keys(), &[30, 40]);
        assert_eq!(child_ids(&right), vec![2, 3, 4]);
        assert_eq!(right.level(), left.level());
        assert_eq!(left.len() + right.len(), 4 - 1);
        assert_eq!(left.children().len() + right.children().len(), 4 + 1);
    }

    #[test]
    fn test_inner_split_odd_capacity() {
        let nodes = NodeAllocator::new();
        let mut left = inner_with(&nodes, 5, &[1, 2, 3, 4, 5]);
        let (right, separator) = left.split();
        assert_eq!(separator, 3);
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[4, 5]);
        assert_eq!(left.children().len(), 3);
        assert_eq!(right.children().len(), 3);
    }

    #[test]
    fn test_with_children_builds_two_way_root() {
        let nodes = NodeAllocator::new();
        let left: NodeRef<&str, ()> = nodes.allocate(Node::Leaf(LeafNode::new(4)));
        let right = nodes.allocate(Node::Leaf(LeafNode::new(4)));
        let root = InnerNode::with_children(4, 2, left, "m", right);
        assert_eq!(root.level(), 2);
        assert_eq!(root.keys(), &["m"]);
        assert_eq!(child_ids(&root), vec![0, 1]);
        assert_eq!(root.child_for(&"a", &NaturalOrder).id(), 0);
        assert_eq!(root.child_for(&"m", &NaturalOrder).id(), 0);
        assert_eq!(root.child_for(&"z", &NaturalOrder).id(), 1);
    }
}
