//! Error handling and result types for ConcurrentBTree operations.
//!
//! `get` and `put` are total over their inputs, so errors only arise when a
//! tree is configured or when its invariants are checked.

use thiserror::Error;

use crate::types::NodeId;

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BTreeError {
    /// Invalid capacity specified.
    #[error(
        "Invalid capacity: {capacity} (minimum required: {minimum}, \
         since a split leaf keeps capacity / 2 + 1 keys and needs room for one more)"
    )]
    InvalidCapacity { capacity: usize, minimum: usize },
    /// A node holds more keys than the tree's capacity.
    #[error("Node {node} holds {count} keys, capacity is {capacity}")]
    CapacityExceeded {
        node: NodeId,
        count: usize,
        capacity: usize,
    },
    /// Internal data structure integrity violation.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
    /// Tree corruption detected.
    #[error("Corrupted tree: {0}")]
    CorruptedTree(String),
}

impl BTreeError {
    /// Create an InvalidCapacity error
    pub fn invalid_capacity(capacity: usize, minimum: usize) -> Self {
        Self::InvalidCapacity { capacity, minimum }
    }

    /// Create a DataIntegrity error with context
    pub fn data_integrity(context: &str, details: &str) -> Self {
        Self::DataIntegrity(format!("{}: {}", context, details))
    }

    /// Create a CorruptedTree error naming the offending node
    pub fn corrupted_node(node: NodeId, details: &str) -> Self {
        Self::CorruptedTree(format!("node {}: {}", node, details))
    }

    /// Check if this error is a capacity error
    pub fn is_capacity_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCapacity { .. } | Self::CapacityExceeded { .. }
        )
    }
}

/// Result type for tree inspection and validation
pub type TreeResult<T> = Result<T, BTreeError>;

/// Result type for tree construction
pub type InitResult<T> = Result<T, BTreeError>;
