//! Node handles and id allocation.
//!
//! A parent links to its children through [`NodeHandle`]s, so walking the
//! tree only ever touches the locks of the nodes on the path. Nodes are never
//! freed: a handle read from a parent under its lock always names a live
//! node. Every node also gets a `NodeId` from a [`NodeAllocator`]; ids exist
//! for diagnostics and play no part in navigation.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, RawRwLock, RwLock, RwLockReadGuard};

use crate::types::NodeId;

/// Shared reference to an individually locked node.
pub(crate) struct NodeHandle<T> {
    id: NodeId,
    cell: Arc<RwLock<T>>,
}

impl<T> NodeHandle<T> {
    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    /// Lock shared; the guard owns a reference so it can outlive the parent.
    #[inline]
    pub(crate) fn read_arc(&self) -> ArcRwLockReadGuard<RawRwLock, T> {
        self.cell.read_arc()
    }

    /// Lock exclusively; the guard owns a reference so it can outlive the
    /// parent.
    #[inline]
    pub(crate) fn write_arc(&self) -> ArcRwLockWriteGuard<RawRwLock, T> {
        self.cell.write_arc()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, T> {
        self.cell.read()
    }

    #[cfg(test)]
    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, T> {
        self.cell.write()
    }
}

impl<T> Clone for NodeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            cell: Arc::clone(&self.cell),
        }
    }
}

// Printing a handle must not lock or walk the subtree behind it.
impl<T> fmt::Debug for NodeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeHandle").field(&self.id).finish()
    }
}

/// Hands out node handles with sequential ids.
#[derive(Debug)]
pub(crate) struct NodeAllocator {
    next_id: AtomicUsize,
}

impl NodeAllocator {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(0),
        }
    }

    /// Wrap `item` in its own lock and give it the next id.
    ///
    /// # Panics
    ///
    /// Panics if the id space is exhausted. Like an allocator failure this is
    /// fatal: the tree never frees nodes, so there is nothing to recover.
    pub(crate) fn allocate<T>(&self, item: T) -> NodeHandle<T> {
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = NodeId::try_from(raw)
            .unwrap_or_else(|_| panic!("node id space exhausted after {} nodes", raw));
        NodeHandle {
            id,
            cell: Arc::new(RwLock::new(item)),
        }
    }

    /// Number of nodes ever allocated.
    pub(crate) fn allocated(&self) -> usize {
        self.next_id.load(Ordering::Relaxed)
    }
}
