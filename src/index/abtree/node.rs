//! Tree node: an ordered key sequence plus child ids.
//!
//! A [`Node`] knows nothing about its neighbours. It can search itself,
//! take a key in sorted position, and answer capacity questions against a
//! [`TreeConfig`]. Every split, borrow and merge is decided by the tree.

use crate::common::{NodeId, TreeConfig};

/// One node of an (a,b)-tree.
///
/// A leaf has no children. An internal node has exactly `keys.len() + 1`
/// children, where every key in `children[i]` sorts below `keys[i]` and every
/// key in `children[i + 1]` sorts above it.
#[derive(Debug)]
pub(crate) struct Node<K> {
    /// Strictly increasing keys.
    pub(crate) keys: Vec<K>,

    /// Child ids, empty for a leaf.
    pub(crate) children: Vec<NodeId>,
}

impl<K> Node<K> {
    /// Create an empty leaf with no preallocated storage.
    pub(crate) fn new() -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an empty leaf able to hold an overflowing key set
    /// (`b` keys, `b + 1` children) without reallocating.
    pub(crate) fn with_capacity(config: &TreeConfig) -> Self {
        Self {
            keys: Vec::with_capacity(config.upper()),
            children: Vec::with_capacity(config.upper() + 1),
        }
    }

    /// Fallible version of [`Node::with_capacity`].
    pub(crate) fn try_with_capacity(
        config: &TreeConfig,
    ) -> Result<Self, std::collections::TryReserveError> {
        let mut node = Self::new();
        node.keys.try_reserve_exact(config.upper())?;
        node.children.try_reserve_exact(config.upper() + 1)?;
        Ok(node)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Holds exactly `b - 1` keys; one more insert will overflow it.
    #[inline]
    pub(crate) fn is_full(&self, config: &TreeConfig) -> bool {
        self.keys.len() == config.max_keys()
    }

    /// Holds more than `b - 1` keys and must be split.
    #[inline]
    pub(crate) fn is_overflowing(&self, config: &TreeConfig) -> bool {
        self.keys.len() > config.max_keys()
    }

    /// Holds fewer than `a - 1` keys and must borrow or merge.
    #[inline]
    pub(crate) fn is_underflowing(&self, config: &TreeConfig) -> bool {
        self.keys.len() < config.min_keys()
    }

    /// Can give one key to a sibling and stay within bounds.
    #[inline]
    pub(crate) fn has_surplus(&self, config: &TreeConfig) -> bool {
        self.keys.len() > config.min_keys()
    }
}

impl<K: Clone> Node<K> {
    /// Copy the node into fresh storage sized like [`Node::with_capacity`].
    pub(crate) fn clone_with_capacity(&self, config: &TreeConfig) -> Self {
        let mut node = Self::with_capacity(config);
        node.keys.extend(self.keys.iter().cloned());
        node.children.extend_from_slice(&self.children);
        node
    }
}

impl<K: Ord> Node<K> {
    /// Scan the keys for `key`.
    ///
    /// Returns `Ok(i)` if `keys[i] == key`, otherwise `Err(i)` with `i` the
    /// index of the first key greater than `key`. For an internal node
    /// `children[i]` is then the subtree that could hold `key`.
    pub(crate) fn search(&self, key: &K) -> Result<usize, usize> {
        let mut i = 0;
        while i < self.keys.len() && self.keys[i] < *key {
            i += 1;
        }

        if i < self.keys.len() && self.keys[i] == *key {
            Ok(i)
        } else {
            Err(i)
        }
    }

    /// Place `key` in sorted position and return its index.
    ///
    /// Does not check for duplicates. The node may be overflowing afterwards.
    pub(crate) fn insert_sorted(&mut self, key: K) -> usize {
        let pos = self
            .keys
            .iter()
            .rposition(|existing| *existing < key)
            .map_or(0, |i| i + 1);
        self.keys.insert(pos, key);
        pos
    }
}

impl<K> Default for Node<K> {
    fn default() -> Self {
        Self::new()
    }
}
