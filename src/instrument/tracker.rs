//! Per-operation touch tracking.

use std::collections::HashSet;
use std::fmt;

use crate::common::NodeId;
use crate::instrument::TouchObserver;

/// Records which nodes an operation read and which it changed.
///
/// Both sets are idempotent: a node visited twice during one operation is
/// counted once. The tracker never clears itself; the caller decides what
/// an "operation" is and calls [`clear`](TouchTracker::clear) in between.
///
/// # Example
/// ```
/// use abtree::{AbTree, TouchTracker, TreeConfig};
///
/// let mut tree = AbTree::with_observer(TreeConfig::default(), TouchTracker::new());
/// for key in [1000u64, 500, 1] {
///     tree.insert(key).unwrap();
///     tree.observer_mut().clear();
/// }
///
/// // Root [500] and leaf [1] are visited.
/// assert!(tree.contains(&1));
/// let snapshot = tree.observer().snapshot();
/// assert_eq!(snapshot.read, 2);
/// assert_eq!(snapshot.changed, 0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct TouchTracker {
    /// Nodes visited since the last clear.
    read: HashSet<NodeId>,

    /// Nodes created or mutated since the last clear.
    changed: HashSet<NodeId>,
}

impl TouchTracker {
    /// Create a tracker with both sets empty.
    pub fn new() -> Self {
        Self {
            read: HashSet::new(),
            changed: HashSet::new(),
        }
    }

    /// Number of distinct nodes read.
    pub fn read_count(&self) -> usize {
        self.read.len()
    }

    /// Number of distinct nodes changed.
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    pub fn was_read(&self, node: NodeId) -> bool {
        self.read.contains(&node)
    }

    pub fn was_changed(&self, node: NodeId) -> bool {
        self.changed.contains(&node)
    }

    /// Iterate over the nodes read, in no particular order.
    pub fn reads(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.read.iter().copied()
    }

    /// Iterate over the nodes changed, in no particular order.
    pub fn changes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.changed.iter().copied()
    }

    /// Get the current set sizes as a plain value.
    pub fn snapshot(&self) -> TouchSnapshot {
        TouchSnapshot {
            read: self.read.len(),
            changed: self.changed.len(),
        }
    }

    /// Empty both sets.
    pub fn clear(&mut self) {
        self.read.clear();
        self.changed.clear();
    }
}

impl TouchObserver for TouchTracker {
    #[inline]
    fn on_read(&mut self, node: NodeId) {
        self.read.insert(node);
    }

    #[inline]
    fn on_change(&mut self, node: NodeId) {
        self.changed.insert(node);
    }
}

/// Set sizes of a [`TouchTracker`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchSnapshot {
    pub read: usize,
    pub changed: usize,
}

impl fmt::Display for TouchSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Touched {{ read: {}, changed: {} }}", self.read, self.changed)
    }
}
