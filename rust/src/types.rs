//! Core types and data structures for ConcurrentBTree.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants used throughout the concurrent B+ tree implementation.

use std::sync::atomic::AtomicUsize;

use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, RawRwLock, RwLock};

use crate::arena::{NodeAllocator, NodeHandle};
use crate::bounded::BoundedVec;
use crate::comparator::NaturalOrder;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Minimum capacity for any B+ tree node.
///
/// A leaf split keeps `capacity / 2 + 1` entries on the left, so with a
/// capacity of 2 the left half would still be full after splitting and a key
/// routed there would have no room.
pub const MIN_CAPACITY: usize = 3;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Diagnostic node identifier, as reported by validation errors.
pub type NodeId = u32;

/// Level of a node in the tree; leaves are at level 0.
pub type Level = u16;

/// Handle to a locked node; parents hold these for their children.
pub(crate) type NodeRef<K, V> = NodeHandle<Node<K, V>>;

/// Shared guard on a node, owned so it can be carried hand-over-hand.
pub(crate) type NodeReadGuard<K, V> = ArcRwLockReadGuard<RawRwLock, Node<K, V>>;

/// Exclusive guard on a node, owned so it can be carried hand-over-hand.
pub(crate) type NodeWriteGuard<K, V> = ArcRwLockWriteGuard<RawRwLock, Node<K, V>>;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Thread-safe B+ tree index supporting point lookup and upsert.
///
/// Readers descend with shared locks, coupling hand-over-hand from the
/// tree-wide root lock down to a leaf. Writers descend with exclusive locks
/// and split any full child before entering it, so a split never has to
/// travel back up the tree.
///
/// Parents hold their children's handles directly, so a descent touches only
/// the locks on its path. Nodes are never freed; the tree only grows.
///
/// # Type Parameters
///
/// * `K` - Key type, ordered by the comparator `C`
/// * `V` - Value type; `get` returns clones
/// * `C` - Comparator implementing a strict weak ordering over `K`
///
/// # Examples
///
/// ```
/// use cbtree::ConcurrentBTree;
/// use std::sync::Arc;
/// use std::thread;
///
/// let tree = Arc::new(ConcurrentBTree::new(16).unwrap());
/// let handles: Vec<_> = (0..4u64)
///     .map(|t| {
///         let tree = Arc::clone(&tree);
///         thread::spawn(move || {
///             for i in t * 100..(t + 1) * 100 {
///                 tree.put(i, i * 2);
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(tree.get(&250), Some(500));
/// assert_eq!(tree.len(), 400);
/// ```
#[derive(Debug)]
pub struct ConcurrentBTree<K, V, C = NaturalOrder> {
    /// Maximum number of keys per node.
    pub(crate) capacity: usize,
    /// Total order used for every key comparison.
    pub(crate) comparator: C,
    /// Source of node ids.
    pub(crate) nodes: NodeAllocator,
    /// Tree-wide structural lock; guards replacement of the root reference.
    pub(crate) root: RwLock<Option<NodeRef<K, V>>>,
    /// Number of distinct keys stored.
    pub(crate) len: AtomicUsize,
}

/// A tree node. Each node sits behind its own shared/exclusive lock.
#[derive(Debug)]
pub(crate) enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Inner(InnerNode<K, V>),
}

/// Leaf node containing key-value pairs.
#[derive(Debug)]
pub(crate) struct LeafNode<K, V> {
    /// Sorted keys, no duplicates.
    pub(crate) keys: BoundedVec<K>,
    /// Values paired with `keys` by index.
    pub(crate) values: BoundedVec<V>,
}

/// Internal node containing separator keys and child references.
#[derive(Debug)]
pub(crate) struct InnerNode<K, V> {
    /// Height above the leaves; always at least 1.
    pub(crate) level: Level,
    /// Sorted separator keys.
    pub(crate) keys: BoundedVec<K>,
    /// Child handles; always one more than `keys`.
    pub(crate) children: BoundedVec<NodeRef<K, V>>,
}

/// Snapshot of the tree's shape, gathered by walking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    /// Number of leaf nodes reachable from the root.
    pub leaf_count: usize,
    /// Number of inner nodes reachable from the root.
    pub inner_count: usize,
    /// Number of nodes ever allocated.
    pub allocated_nodes: usize,
    /// Number of levels; 0 for an empty tree.
    pub height: usize,
    /// Number of entries found in the leaves.
    pub entries: usize,
}

impl<K, V> Node<K, V> {
    /// Level of this node; 0 for leaves.
    pub fn level(&self) -> Level {
        match self {
            Node::Leaf(_) => 0,
            Node::Inner(inner) => inner.level,
        }
    }

    /// Number of keys held by this node.
    pub fn key_count(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Inner(inner) => inner.len(),
        }
    }

    /// Returns true if one more key would exceed the node's capacity.
    pub fn is_full(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.is_full(),
            Node::Inner(inner) => inner.is_full(),
        }
    }
}
