//! Handles to arena slots.

use std::fmt;

/// Handle to the arena slot holding one node of a tree.
///
/// A `NodeId` names a slot, not a node: when a merge or a root collapse
/// releases a node, its slot goes on the arena's free list and the next
/// node created reuses it. An id is therefore only meaningful while the node
/// it was handed out for is live, and only within the tree that issued it.
///
/// Ids order by slot index, so the first node ever placed in a fresh tree
/// sorts lowest.
///
/// # Example
/// ```
/// use abtree::NodeId;
///
/// let id = NodeId::from_slot(3);
/// assert_eq!(id.slot(), 3);
/// assert_eq!(id.to_string(), "Node(3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn from_slot(slot: usize) -> Self {
        NodeId(slot)
    }

    /// Index of the slot in the arena's storage.
    #[inline]
    pub fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slot_round_trip() {
        assert_eq!(NodeId::from_slot(0).slot(), 0);
        assert_eq!(NodeId::from_slot(usize::MAX).slot(), usize::MAX);
    }

    #[test]
    fn test_reused_slot_is_same_id() {
        // A node created into a released slot is indistinguishable by id
        // from the node that held it before.
        let released = NodeId::from_slot(4);
        let reused = NodeId::from_slot(4);

        let mut touched = HashSet::new();
        touched.insert(released);
        assert!(!touched.insert(reused));
    }

    #[test]
    fn test_order_follows_slots() {
        let mut ids = vec![NodeId::from_slot(9), NodeId::from_slot(0), NodeId::from_slot(2)];
        ids.sort();
        assert_eq!(ids.iter().map(|id| id.slot()).collect::<Vec<_>>(), vec![0, 2, 9]);
    }
}
