//! Slot storage for the nodes of one tree.
//!
//! Each node lives in a slot addressed by a [`NodeId`]. A child is owned by
//! the single parent whose child list holds its id, so the tree stays a
//! strict ownership hierarchy without parent pointers.
//!
//! Structural operations must not fail halfway through, so the tree asks the
//! arena to reserve everything an operation will need before it touches a
//! node:
//! - [`NodeArena::reserve_nodes`] prebuilds spare nodes and slot capacity
//!   for splits and root promotion
//! - [`NodeArena::reserve_releases`] makes room on the free list for merges
//!   and root collapse
//!
//! After a successful reservation, [`NodeArena::take_spare`],
//! [`NodeArena::alloc`] and [`NodeArena::release`] do not allocate.

use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

use crate::common::{NodeId, TreeConfig};
use crate::index::abtree::node::Node;

#[derive(Debug)]
pub(crate) struct NodeArena<K> {
    /// Node storage; `None` marks a released slot.
    slots: Vec<Option<Node<K>>>,

    /// Released slot ids, reused LIFO.
    free: Vec<NodeId>,

    /// Empty, preallocated nodes waiting to be placed.
    spare: Vec<Node<K>>,
}

impl<K> NodeArena<K> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            spare: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    /// Make sure the next `count` node creations need no allocation.
    pub(crate) fn reserve_nodes(
        &mut self,
        count: usize,
        config: &TreeConfig,
    ) -> Result<(), TryReserveError> {
        self.slots
            .try_reserve(count.saturating_sub(self.free.len()))?;

        let missing = count.saturating_sub(self.spare.len());
        if missing > 0 {
            self.spare.try_reserve(missing)?;
            for _ in 0..missing {
                self.spare.push(Node::try_with_capacity(config)?);
            }
        }
        Ok(())
    }

    /// Make sure the next `count` releases need no allocation.
    pub(crate) fn reserve_releases(&mut self, count: usize) -> Result<(), TryReserveError> {
        self.free.try_reserve(count)
    }

    /// Hand out an empty node sized for `config`.
    ///
    /// Falls back to a fresh (infallible) allocation if nothing was reserved.
    pub(crate) fn take_spare(&mut self, config: &TreeConfig) -> Node<K> {
        self.spare
            .pop()
            .unwrap_or_else(|| Node::with_capacity(config))
    }

    /// Place a node into a slot and return its id.
    pub(crate) fn alloc(&mut self, node: Node<K>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.slot()] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId::from_slot(self.slots.len() - 1)
        }
    }

    /// Remove a node from its slot and hand it back to the caller.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<K> {
        let node = self.slots[id.slot()]
            .take()
            .expect("`NodeArena::release()` - `id` is not a live node!");
        self.free.push(id);
        node
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    /// Drop every node, spare ones included.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.spare.clear();
    }
}

impl<K: Clone> NodeArena<K> {
    /// Deep copy in which every live node keeps capacity for an overflowing
    /// key set. Slot ids and the free list are preserved; spares are not.
    pub(crate) fn clone_with_capacity(&self, config: &TreeConfig) -> Self {
        Self {
            slots: self
                .slots
                .iter()
                .map(|slot| slot.as_ref().map(|node| node.clone_with_capacity(config)))
                .collect(),
            free: self.free.clone(),
            spare: Vec::new(),
        }
    }
}

impl<K> Default for NodeArena<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Index<NodeId> for NodeArena<K> {
    type Output = Node<K>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K> {
        self.slots[id.slot()]
            .as_ref()
            .expect("`NodeArena::index()` - `id` is not a live node!")
    }
}

impl<K> IndexMut<NodeId> for NodeArena<K> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        self.slots[id.slot()]
            .as_mut()
            .expect("`NodeArena::index_mut()` - `id` is not a live node!")
    }
}
