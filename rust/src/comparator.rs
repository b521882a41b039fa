//! Key ordering for the tree.
//!
//! The tree never compares keys directly; every comparison goes through a
//! [`KeyComparator`] supplied at construction. The comparator must be a
//! strict weak ordering. Two keys are treated as the same key when neither is
//! less than the other. A comparator that breaks this contract leaves the
//! tree's shape and search results undefined.

use std::fmt;

/// A strict weak ordering over keys of type `K`.
pub trait KeyComparator<K: ?Sized> {
    /// Returns true if `a` orders strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Returns true if neither key orders before the other.
    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Orders keys by their `Ord` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyComparator<K> for NaturalOrder {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// Orders byte strings lexicographically; a proper prefix sorts first.
///
/// Combined with [`crate::encode_u64_be`] this orders integer keys
/// numerically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytewiseComparator;

impl<K: AsRef<[u8]> + ?Sized> KeyComparator<K> for BytewiseComparator {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a.as_ref() < b.as_ref()
    }
}

/// Adapts a `less`-style closure into a comparator.
///
/// ```
/// use cbtree::{ConcurrentBTree, FnComparator};
///
/// let reversed = FnComparator(|a: &u32, b: &u32| b < a);
/// let tree = ConcurrentBTree::with_comparator(8, reversed).unwrap();
/// tree.put(1, "one");
/// assert_eq!(tree.get(&1), Some("one"));
/// ```
#[derive(Clone, Copy)]
pub struct FnComparator<F>(pub F);

impl<K: ?Sized, F> KeyComparator<K> for FnComparator<F>
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComparator").finish_non_exhaustive()
    }
}
