//! Concurrent B+ tree index.
//!
//! This crate provides an in-memory, thread-safe, ordered key-value index
//! supporting point lookup and upsert from many threads at once. It is the
//! storage-engine piece under a key-value store: readers and writers run in
//! parallel on disjoint subtrees while the tree stays balanced.
//!
//! - `get` descends with shared locks, coupling hand-over-hand.
//! - `put` descends with exclusive locks and splits full nodes before
//!   entering them, so splits never cascade upward.
//! - A tree-wide lock serializes only the rare replacement of the root.
//!
//! Keys cannot be removed and nodes are never freed.

mod arena;
mod bounded;
mod comparator;
mod construction;
mod encoding;
mod error;
mod get_operations;
mod insert_operations;
mod node;
mod types;
mod validation;

pub use comparator::{BytewiseComparator, FnComparator, KeyComparator, NaturalOrder};
pub use construction::{TreeConfig, DEFAULT_CAPACITY};
pub use encoding::{decode_u64_be, encode_u64_be};
pub use error::{BTreeError, InitResult, TreeResult};
pub use types::{ConcurrentBTree, Level, NodeId, TreeStats, MIN_CAPACITY};
