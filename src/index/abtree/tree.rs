//! The (a,b)-tree and its rebalancing.
//!
//! All structural decisions live here. Nodes never point at their parent;
//! a split hands the promoted key and the new sibling back up through the
//! return value of the recursive insert, and underflow is repaired by the
//! parent right after the recursive delete into one of its children returns.

use std::collections::VecDeque;
use std::fmt;
use std::mem;

use crate::common::{Error, NodeId, Result, TreeConfig};
use crate::index::abtree::arena::NodeArena;
use crate::index::abtree::node::Node;
use crate::instrument::{NoopObserver, TouchObserver};

/// An (a,b)-tree set of ordered keys.
///
/// Every non-root node holds between `a - 1` and `b - 1` keys and all leaves
/// sit at the same depth. Overflow is fixed by splitting, underflow by
/// borrowing a key from a sibling with surplus or merging with a sibling
/// that has none.
///
/// The observer `O` is told about every node the tree reads or changes. The
/// default [`NoopObserver`] ignores everything; use
/// [`TouchTracker`](crate::TouchTracker) to collect per-operation touch sets.
///
/// Lookups report reads to the observer, so [`contains`](AbTree::contains)
/// takes `&mut self` like the mutating operations.
///
/// # Example
/// ```
/// use abtree::AbTree;
///
/// let mut tree = AbTree::new(2, 3).unwrap();
/// tree.insert(1000).unwrap();
/// tree.insert(500).unwrap();
/// tree.insert(1).unwrap();
///
/// assert!(tree.contains(&500));
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.node_count(), 3);
///
/// assert!(tree.delete(&500).unwrap());
/// assert!(!tree.contains(&500));
/// ```
#[derive(Debug)]
pub struct AbTree<K, O = NoopObserver> {
    /// Fanout bounds, fixed for the tree's lifetime.
    config: TreeConfig,

    /// Storage for every live node.
    nodes: NodeArena<K>,

    /// `None` for the empty tree.
    root: Option<NodeId>,

    /// Number of stored keys.
    len: usize,

    /// Number of live nodes.
    node_count: usize,

    /// Receives read/change events.
    observer: O,
}

impl<K: Clone, O: Clone> Clone for AbTree<K, O> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            nodes: self.nodes.clone_with_capacity(&self.config),
            root: self.root,
            len: self.len,
            node_count: self.node_count,
            observer: self.observer.clone(),
        }
    }
}

/// What a recursive delete is looking for.
enum Target<'a, K> {
    Key(&'a K),
    /// The largest key of the subtree.
    Max,
}

impl<K> Clone for Target<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Target<'_, K> {}

/// Running totals collected by [`AbTree::check_invariants`].
struct Audit {
    keys: usize,
    nodes: usize,
    leaf_depth: Option<usize>,
}

impl<K: Ord> AbTree<K> {
    /// Create an empty tree with bounds `a = lower`, `b = upper`.
    ///
    /// # Errors
    /// `Error::InvalidBounds` unless `a >= 2` and `b >= 2a - 1`.
    pub fn new(lower: usize, upper: usize) -> Result<Self> {
        Ok(Self::with_config(TreeConfig::new(lower, upper)?))
    }

    /// Create an empty, uninstrumented tree.
    pub fn with_config(config: TreeConfig) -> Self {
        Self::with_observer(config, NoopObserver)
    }

    /// Look up `key` through a shared reference.
    ///
    /// Only uninstrumented trees have this; a tracked tree reports reads and
    /// goes through [`contains`](AbTree::contains).
    pub fn get(&self, key: &K) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            match node.search(key) {
                Ok(pos) => return Some(&node.keys[pos]),
                Err(_) if node.is_leaf() => return None,
                Err(pos) => current = node.children[pos],
            }
        }
    }
}

impl<K: Ord> Default for AbTree<K> {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl<K: Ord, O: TouchObserver> AbTree<K, O> {
    /// Create an empty tree that reports node touches to `observer`.
    pub fn with_observer(config: TreeConfig, observer: O) -> Self {
        log::debug!("creating empty {}", config);
        Self {
            config,
            nodes: NodeArena::new(),
            root: None,
            len: 0,
            node_count: 0,
            observer,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    /// Number of keys stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of live nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of node levels; 0 for the empty tree.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            height += 1;
            current = self.nodes[id].children.first().copied();
        }
        height
    }

    /// Keys held by the root node, empty when the tree is empty.
    pub fn root_keys(&self) -> &[K] {
        match self.root {
            Some(root) => &self.nodes[root].keys,
            None => &[],
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    // ========================================================================
    // Public API: lookup
    // ========================================================================

    /// Check whether `key` is stored.
    ///
    /// Every node on the search path is reported as read.
    pub fn contains(&mut self, key: &K) -> bool {
        let mut current = self.root;
        while let Some(id) = current {
            self.observer.on_read(id);

            let node = &self.nodes[id];
            match node.search(key) {
                Ok(_) => return true,
                Err(_) if node.is_leaf() => return false,
                Err(pos) => current = Some(node.children[pos]),
            }
        }
        false
    }

    // ========================================================================
    // Public API: insert
    // ========================================================================

    /// Insert `key`.
    ///
    /// Returns `Ok(true)` if the key was added and `Ok(false)` if it was
    /// already present, in which case nothing changes.
    ///
    /// # Errors
    /// `Error::AllocationFailed` if the nodes a split would need cannot be
    /// reserved. The tree is unchanged in that case.
    pub fn insert(&mut self, key: K) -> Result<bool> {
        let Some(new_nodes) = self.plan_insert(&key) else {
            return Ok(false);
        };
        self.nodes.reserve_nodes(new_nodes, &self.config)?;

        let root = match self.root {
            Some(root) => root,
            None => {
                let root = self.create_node();
                self.root = Some(root);
                root
            }
        };

        if let Some((median, sibling)) = self.insert_into(root, key) {
            let new_root = self.create_node();
            let node = &mut self.nodes[new_root];
            node.keys.push(median);
            node.children.push(root);
            node.children.push(sibling);

            self.root = Some(new_root);
            self.observer.on_change(new_root);
            log::trace!("root split: promoted new root {}", new_root);
        }

        Ok(true)
    }

    /// Walk the search path for `key` and count the nodes an insert would
    /// create. `None` if the key is already present.
    ///
    /// Each full node directly above a splitting node splits too, so the
    /// count is the run of full nodes ending at the leaf, plus a new root
    /// when that run reaches the root.
    fn plan_insert(&mut self, key: &K) -> Option<usize> {
        let Some(root) = self.root else {
            return Some(1);
        };

        let mut depth = 0;
        let mut full_run = 0;
        let mut current = root;
        loop {
            self.observer.on_read(current);
            depth += 1;

            let node = &self.nodes[current];
            let pos = node.search(key).err()?;

            if node.is_full(&self.config) {
                full_run += 1;
            } else {
                full_run = 0;
            }

            if node.is_leaf() {
                break;
            }
            current = node.children[pos];
        }

        Some(full_run + usize::from(full_run == depth))
    }

    /// Insert into the subtree at `id`.
    ///
    /// Returns the promoted median and the new right sibling if `id` split.
    fn insert_into(&mut self, id: NodeId, key: K) -> Option<(K, NodeId)> {
        self.observer.on_read(id);

        let pos = self.nodes[id].search(&key).err()?;

        if self.nodes[id].is_leaf() {
            self.nodes[id].insert_sorted(key);
            self.len += 1;
        } else {
            let child = self.nodes[id].children[pos];
            let (median, sibling) = self.insert_into(child, key)?;

            let node = &mut self.nodes[id];
            let at = node.insert_sorted(median);
            node.children.insert(at + 1, sibling);
        }
        self.observer.on_change(id);

        if self.nodes[id].is_overflowing(&self.config) {
            Some(self.split(id))
        } else {
            None
        }
    }

    /// Split an overflowing node around key index `b / 2`.
    ///
    /// The node keeps everything left of the median, a new sibling takes
    /// everything right of it, and the median is returned for the parent.
    fn split(&mut self, id: NodeId) -> (K, NodeId) {
        let mid = self.config.split_index();
        let mut sibling = self.nodes.take_spare(&self.config);

        let node = &mut self.nodes[id];
        sibling.keys.extend(node.keys.drain(mid + 1..));
        if !node.is_leaf() {
            sibling.children.extend(node.children.drain(mid + 1..));
        }
        let median = node.keys.remove(mid);

        let sibling_id = self.nodes.alloc(sibling);
        self.node_count += 1;

        self.observer.on_read(sibling_id);
        self.observer.on_change(id);
        self.observer.on_change(sibling_id);
        log::trace!("split {} at key index {} into new sibling {}", id, mid, sibling_id);

        (median, sibling_id)
    }

    fn create_node(&mut self) -> NodeId {
        let node = self.nodes.take_spare(&self.config);
        self.node_count += 1;
        self.nodes.alloc(node)
    }

    // ========================================================================
    // Public API: delete
    // ========================================================================

    /// Remove `key`.
    ///
    /// Returns `Ok(true)` if the key was removed and `Ok(false)` if it was
    /// not present (including on an empty tree).
    ///
    /// # Errors
    /// `Error::AllocationFailed` if room for bookkeeping of released nodes
    /// cannot be reserved. The tree is unchanged in that case.
    pub fn delete(&mut self, key: &K) -> Result<bool> {
        let Some(root) = self.root else {
            return Ok(false);
        };
        // At most one merge per level below the root, plus a root collapse.
        self.nodes.reserve_releases(self.height() + 1)?;

        let removed = self.delete_from(root, Target::Key(key)).is_some();
        self.collapse_root(root);

        Ok(removed)
    }

    /// Delete from the subtree at `id`, returning the removed key.
    ///
    /// On the way back up, the child that was descended into is repaired if
    /// it fell below `a - 1` keys.
    fn delete_from(&mut self, id: NodeId, target: Target<'_, K>) -> Option<K> {
        self.observer.on_read(id);

        let node = &self.nodes[id];
        let (found, pos) = match target {
            Target::Key(key) => match node.search(key) {
                Ok(pos) => (true, pos),
                Err(pos) => (false, pos),
            },
            Target::Max if node.is_leaf() => (true, node.len().checked_sub(1)?),
            Target::Max => (false, node.len()),
        };

        if node.is_leaf() {
            if !found {
                return None;
            }
            let removed = self.nodes[id].keys.remove(pos);
            self.len -= 1;
            self.observer.on_change(id);
            return Some(removed);
        }

        let child = node.children[pos];
        let removed = if found {
            // Swap in the largest key of the left subtree, then remove that
            // key from below instead.
            let predecessor = self.delete_from(child, Target::Max)?;
            self.observer.on_change(id);
            mem::replace(&mut self.nodes[id].keys[pos], predecessor)
        } else {
            self.delete_from(child, target)?
        };

        self.fix_underflow(id, pos);
        Some(removed)
    }

    /// Repair `children[pos]` of `parent` if it is underflowing.
    ///
    /// Prefers the right sibling: borrow if it has surplus, else merge with
    /// it. Only the last child falls back to its left sibling.
    fn fix_underflow(&mut self, parent: NodeId, pos: usize) {
        let config = self.config;
        let child = self.nodes[parent].children[pos];
        if !self.nodes[child].is_underflowing(&config) {
            return;
        }

        self.observer.on_change(child);
        self.observer.on_change(parent);

        let children = self.nodes[parent].children.len();
        if pos + 1 < children {
            let right = self.nodes[parent].children[pos + 1];
            self.observer.on_read(right);
            self.observer.on_change(right);

            if self.nodes[right].has_surplus(&config) {
                self.borrow_from_right(parent, pos);
            } else {
                self.merge_children(parent, pos);
            }
        } else if pos > 0 {
            let left = self.nodes[parent].children[pos - 1];
            self.observer.on_read(left);
            self.observer.on_change(left);

            if self.nodes[left].has_surplus(&config) {
                self.borrow_from_left(parent, pos);
            } else {
                self.merge_children(parent, pos - 1);
            }
        }
    }

    /// Rotate one key from `children[pos + 1]` through the separator into
    /// `children[pos]`.
    fn borrow_from_right(&mut self, parent: NodeId, pos: usize) {
        let child = self.nodes[parent].children[pos];
        let right = self.nodes[parent].children[pos + 1];

        let right_node = &mut self.nodes[right];
        let first_key = right_node.keys.remove(0);
        let first_child = (!right_node.is_leaf()).then(|| right_node.children.remove(0));

        let separator = mem::replace(&mut self.nodes[parent].keys[pos], first_key);

        let child_node = &mut self.nodes[child];
        child_node.insert_sorted(separator);
        child_node.children.extend(first_child);

        log::trace!("{} borrowed a key from right sibling {}", child, right);
    }

    /// Rotate one key from `children[pos - 1]` through the separator into
    /// `children[pos]`.
    fn borrow_from_left(&mut self, parent: NodeId, pos: usize) {
        let child = self.nodes[parent].children[pos];
        let left = self.nodes[parent].children[pos - 1];

        let left_node = &mut self.nodes[left];
        let last = left_node.keys.len() - 1;
        let last_key = left_node.keys.remove(last);
        let last_child = left_node.children.pop();

        let separator = mem::replace(&mut self.nodes[parent].keys[pos - 1], last_key);

        let child_node = &mut self.nodes[child];
        child_node.insert_sorted(separator);
        if let Some(last_child) = last_child {
            child_node.children.insert(0, last_child);
        }

        log::trace!("{} borrowed a key from left sibling {}", child, left);
    }

    /// Fold `children[pos + 1]` and the separator between them into
    /// `children[pos]`, releasing the right node.
    fn merge_children(&mut self, parent: NodeId, pos: usize) {
        let parent_node = &mut self.nodes[parent];
        let separator = parent_node.keys.remove(pos);
        let right = parent_node.children.remove(pos + 1);
        let left = parent_node.children[pos];

        let mut right_node = self.nodes.release(right);
        let left_node = &mut self.nodes[left];
        left_node.keys.push(separator);
        left_node.keys.append(&mut right_node.keys);
        left_node.children.append(&mut right_node.children);
        self.node_count -= 1;

        log::trace!("merged {} into {}", right, left);
    }

    /// Shrink the tree after a delete: a keyless root with a single child
    /// hands the root over to it, an empty leaf root empties the tree.
    fn collapse_root(&mut self, root: NodeId) {
        let node = &self.nodes[root];
        if node.children.len() == 1 {
            let child = node.children[0];
            self.nodes.release(root);
            self.root = Some(child);
            self.node_count -= 1;
            log::trace!("root {} collapsed into {}", root, child);
        } else if node.is_leaf() && node.keys.is_empty() {
            self.nodes.release(root);
            self.root = None;
            self.node_count -= 1;
            log::trace!("last node {} released, tree is empty", root);
        }
    }

    // ========================================================================
    // Public API: reset and audit
    // ========================================================================

    /// Remove every key and node. The observer is left alone.
    pub fn clear(&mut self) {
        log::debug!("clearing tree with {} keys in {} nodes", self.len, self.node_count);
        self.nodes.clear();
        self.root = None;
        self.len = 0;
        self.node_count = 0;
    }

    /// Audit the whole tree.
    ///
    /// Checks key order inside and across nodes, the child count of every
    /// internal node, equal leaf depth, key-count bounds for non-root nodes,
    /// and the key and node counters.
    ///
    /// # Errors
    /// `Error::InvariantViolation` describing the first problem found.
    pub fn check_invariants(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.len != 0 || self.node_count != 0 || self.nodes.len() != 0 {
                return Err(violation(format!(
                    "empty tree reports {} keys and {} nodes",
                    self.len, self.node_count
                )));
            }
            return Ok(());
        };

        let mut audit = Audit {
            keys: 0,
            nodes: 0,
            leaf_depth: None,
        };
        self.audit_node(root, 0, None, None, &mut audit)?;

        if audit.keys != self.len {
            return Err(violation(format!(
                "tree holds {} keys but len is {}",
                audit.keys, self.len
            )));
        }
        if audit.nodes != self.node_count || audit.nodes != self.nodes.len() {
            return Err(violation(format!(
                "tree holds {} nodes but node_count is {} and the arena has {}",
                audit.nodes,
                self.node_count,
                self.nodes.len()
            )));
        }
        Ok(())
    }

    fn audit_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        audit: &mut Audit,
    ) -> Result<()> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| violation(format!("{} is referenced but not live", id)))?;
        audit.nodes += 1;
        audit.keys += node.len();

        if node.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(violation(format!("{} keys are not strictly increasing", id)));
        }
        let below_lower = lower.is_some_and(|lower| node.keys.iter().any(|k| k <= lower));
        let above_upper = upper.is_some_and(|upper| node.keys.iter().any(|k| k >= upper));
        if below_lower || above_upper {
            return Err(violation(format!("{} holds a key outside its separators", id)));
        }

        if node.len() > self.config.max_keys() {
            return Err(violation(format!("{} holds {} keys", id, node.len())));
        }
        if depth > 0 && node.is_underflowing(&self.config) {
            return Err(violation(format!("{} holds {} keys", id, node.len())));
        }

        if depth == 0 && node.keys.is_empty() {
            return Err(violation(format!("root {} holds no keys", id)));
        }

        if node.is_leaf() {
            match audit.leaf_depth {
                None => audit.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(violation(format!(
                        "leaf {} at depth {}, expected {}",
                        id, depth, expected
                    )));
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if node.children.len() != node.len() + 1 {
            return Err(violation(format!(
                "{} has {} keys and {} children",
                id,
                node.len(),
                node.children.len()
            )));
        }

        for (i, &child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { node.keys.get(i - 1) };
            let child_upper = if i == node.len() { upper } else { node.keys.get(i) };
            self.audit_node(child, depth + 1, child_lower, child_upper, audit)?;
        }
        Ok(())
    }
}

fn violation(message: String) -> Error {
    Error::InvariantViolation(message)
}

impl<K: fmt::Display, O> fmt::Display for AbTree<K, O> {
    /// Breadth-first dump: `[1 2] [0] [3 4] `.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root else {
            return write!(f, "Empty tree");
        };

        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let node: &Node<K> = &self.nodes[id];
            write!(f, "[")?;
            for (i, key) in node.keys.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", key)?;
            }
            write!(f, "] ")?;
            queue.extend(node.children.iter().copied());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::TouchTracker;

    fn tree_2_3() -> AbTree<i64> {
        AbTree::new(2, 3).unwrap()
    }

    fn tracked(lower: usize, upper: usize) -> AbTree<i64, TouchTracker> {
        AbTree::with_observer(TreeConfig::new(lower, upper).unwrap(), TouchTracker::new())
    }

    fn child_keys(tree: &AbTree<i64>, index: usize) -> Vec<i64> {
        let root = tree.root.unwrap();
        let child = tree.nodes[root].children[index];
        tree.nodes[child].keys.clone()
    }

    #[test]
    fn test_new_rejects_bad_bounds() {
        assert!(matches!(
            AbTree::<i64>::new(3, 4),
            Err(Error::InvalidBounds { lower: 3, upper: 4 })
        ));
        assert!(AbTree::<i64>::new(1, 3).is_err());
    }

    #[test]
    fn test_empty_tree() {
        let mut tree = tree_2_3();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(!tree.contains(&0));
        assert!(tree.root_keys().is_empty());
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_first_insert_creates_leaf_root() {
        let mut tree = tree_2_3();
        assert!(tree.insert(7).unwrap());

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.root_keys(), &[7]);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut tree = tree_2_3();
        tree.insert(7).unwrap();
        assert!(!tree.insert(7).unwrap());

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_leaf_split_promotes_median() {
        let mut tree = tree_2_3();
        for key in [1000, 500, 1] {
            tree.insert(key).unwrap();
        }

        assert_eq!(tree.root_keys(), &[500]);
        assert_eq!(child_keys(&tree, 0), vec![1]);
        assert_eq!(child_keys(&tree, 1), vec![1000]);
        assert_eq!(tree.height(), 2);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_internal_split_moves_children() {
        let mut tree = tree_2_3();
        for key in [1000, 500, 1, 0, 2000, -1, 5000] {
            tree.insert(key).unwrap();
        }

        assert_eq!(tree.root_keys(), &[500]);
        assert_eq!(child_keys(&tree, 0), vec![0]);
        assert_eq!(child_keys(&tree, 1), vec![2000]);
        assert_eq!(tree.node_count(), 7);
        assert_eq!(tree.height(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_split_index_for_even_upper() {
        let mut tree: AbTree<i64> = AbTree::new(2, 4).unwrap();
        for key in [1, 2, 3, 4] {
            tree.insert(key).unwrap();
        }

        // b = 4: node keeps 2 keys, key index 2 goes up
        assert_eq!(tree.root_keys(), &[3]);
        assert_eq!(child_keys(&tree, 0), vec![1, 2]);
        assert_eq!(child_keys(&tree, 1), vec![4]);
    }

    #[test]
    fn test_delete_from_empty_is_noop() {
        let mut tree = tree_2_3();
        assert!(!tree.delete(&5).unwrap());
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let mut tree = tree_2_3();
        for key in [100, 50, 1000] {
            tree.insert(key).unwrap();
        }

        assert!(!tree.delete(&75).unwrap());
        assert!(!tree.delete(&5000).unwrap());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node_count(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_internal_key_uses_predecessor() {
        let mut tree: AbTree<i64> = AbTree::new(2, 4).unwrap();
        for key in [10, 20, 30, 40, 5] {
            tree.insert(key).unwrap();
        }
        // root [30], left [5 10 20], right [40]
        assert_eq!(tree.root_keys(), &[30]);

        assert!(tree.delete(&30).unwrap());

        assert_eq!(tree.root_keys(), &[20]);
        assert_eq!(child_keys(&tree, 0), vec![5, 10]);
        assert_eq!(child_keys(&tree, 1), vec![40]);
        tree.check_invariants().unwrap();
    }

    fn grandchild_keys(tree: &AbTree<i64>, index: usize, inner: usize) -> Vec<i64> {
        let root = tree.root.unwrap();
        let child = tree.nodes[root].children[index];
        let grandchild = tree.nodes[child].children[inner];
        tree.nodes[grandchild].keys.clone()
    }

    /// root [500]; [0] over [-1] [1]; [2000] over [1000] [5000]
    fn three_levels() -> AbTree<i64> {
        let mut tree = tree_2_3();
        for key in [1000, 500, 1, 0, 2000, -1, 5000] {
            tree.insert(key).unwrap();
        }
        tree
    }

    #[test]
    fn test_internal_borrow_from_left_moves_child() {
        let mut tree = three_levels();
        tree.insert(2).unwrap();
        tree.insert(3).unwrap();
        // Left internal node is now [0 2] over [-1] [1] [3]
        assert_eq!(child_keys(&tree, 0), vec![0, 2]);

        // [5000] merges into [1000 2000], leaving their parent keyless; it
        // takes 500 from the root and [3] from its left sibling.
        assert!(tree.delete(&5000).unwrap());

        assert_eq!(tree.root_keys(), &[2]);
        assert_eq!(child_keys(&tree, 0), vec![0]);
        assert_eq!(child_keys(&tree, 1), vec![500]);
        assert_eq!(grandchild_keys(&tree, 1, 0), vec![3]);
        assert_eq!(grandchild_keys(&tree, 1, 1), vec![1000, 2000]);
        assert_eq!(grandchild_keys(&tree, 0, 1), vec![1]);
        assert_eq!(tree.height(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_internal_borrow_from_right_moves_child() {
        let mut tree = three_levels();
        tree.insert(3000).unwrap();
        tree.insert(4000).unwrap();
        // Right internal node is now [2000 4000] over [1000] [3000] [5000]
        assert_eq!(child_keys(&tree, 1), vec![2000, 4000]);

        assert!(tree.delete(&-1).unwrap());

        assert_eq!(tree.root_keys(), &[2000]);
        assert_eq!(child_keys(&tree, 0), vec![500]);
        assert_eq!(child_keys(&tree, 1), vec![4000]);
        assert_eq!(grandchild_keys(&tree, 0, 0), vec![0, 1]);
        assert_eq!(grandchild_keys(&tree, 0, 1), vec![1000]);
        assert_eq!(grandchild_keys(&tree, 1, 0), vec![3000]);
        assert_eq!(tree.height(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_clone_is_independent_and_keeps_capacity() {
        let mut tree = tree_2_3();
        for key in 0..50 {
            tree.insert(key).unwrap();
        }

        let mut copy = tree.clone();
        let mut queue = vec![copy.root.unwrap()];
        while let Some(id) = queue.pop() {
            let node = &copy.nodes[id];
            assert!(node.keys.capacity() >= copy.config.upper());
            assert!(node.children.capacity() > copy.config.upper());
            queue.extend(node.children.iter().copied());
        }

        for key in 0..25 {
            copy.delete(&key).unwrap();
        }
        copy.insert(100).unwrap();
        copy.check_invariants().unwrap();

        assert_eq!(tree.len(), 50);
        assert!(tree.contains(&0));
        assert!(!tree.contains(&100));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_get_without_observer() {
        let tree = three_levels();
        let shared = &tree;

        assert_eq!(shared.get(&2000), Some(&2000));
        assert_eq!(shared.get(&-1), Some(&-1));
        assert_eq!(shared.get(&750), None);
        assert_eq!(tree_2_3().get(&1), None);
    }

    #[test]
    fn test_delete_everything_collapses_to_empty() {
        let mut tree = tree_2_3();
        for key in 0..64 {
            tree.insert(key).unwrap();
        }
        for key in 0..64 {
            assert!(tree.delete(&key).unwrap());
            tree.check_invariants().unwrap();
        }

        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.nodes.len(), 0);
    }

    #[test]
    fn test_clear_resets_counts() {
        let mut tree = tree_2_3();
        for key in 0..20 {
            tree.insert(key).unwrap();
        }

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.node_count(), 0);
        tree.check_invariants().unwrap();

        // Tree is usable again
        tree.insert(3).unwrap();
        assert!(tree.contains(&3));
    }

    #[test]
    fn test_check_invariants_detects_bad_order() {
        let mut tree = tree_2_3();
        for key in [1000, 500, 1] {
            tree.insert(key).unwrap();
        }
        let root = tree.root.unwrap();
        let left = tree.nodes[root].children[0];
        tree.nodes[left].keys[0] = 700;

        assert!(matches!(
            tree.check_invariants(),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_check_invariants_detects_bad_counter() {
        let mut tree = tree_2_3();
        tree.insert(1).unwrap();
        tree.len = 2;

        assert!(tree.check_invariants().is_err());
    }

    #[test]
    fn test_display() {
        let mut tree = tree_2_3();
        assert_eq!(format!("{}", tree), "Empty tree");

        for key in [1000, 500, 1, 0] {
            tree.insert(key).unwrap();
        }
        assert_eq!(format!("{}", tree), "[500] [0 1] [1000] ");
    }

    // ========================================================================
    // Touch tracking
    // ========================================================================

    #[test]
    fn test_contains_reads_search_path() {
        let mut tree = tracked(2, 3);
        for key in [1000, 500, 1] {
            tree.insert(key).unwrap();
        }
        tree.observer_mut().clear();

        assert!(tree.contains(&1000));
        assert_eq!(tree.observer().read_count(), 2);
        assert_eq!(tree.observer().changed_count(), 0);
    }

    #[test]
    fn test_contains_on_empty_reads_nothing() {
        let mut tree = tracked(2, 3);
        assert!(!tree.contains(&1));
        assert_eq!(tree.observer().read_count(), 0);
    }

    #[test]
    fn test_root_split_changes_three_nodes() {
        let mut tree = tracked(2, 3);
        tree.insert(1000).unwrap();
        tree.insert(500).unwrap();
        tree.observer_mut().clear();

        tree.insert(1).unwrap();

        // old root (now left leaf), new sibling, new root
        assert_eq!(tree.observer().changed_count(), 3);
        // old root and new sibling were read
        assert_eq!(tree.observer().read_count(), 2);
        let root = tree.root.unwrap();
        assert!(tree.observer().was_changed(root));
    }

    #[test]
    fn test_plain_insert_changes_one_leaf() {
        let mut tree = tracked(2, 3);
        for key in [1000, 500, 1] {
            tree.insert(key).unwrap();
        }
        tree.observer_mut().clear();

        tree.insert(2000).unwrap();

        assert_eq!(tree.observer().read_count(), 2);
        assert_eq!(tree.observer().changed_count(), 1);
    }

    #[test]
    fn test_duplicate_insert_reads_without_changes() {
        let mut tree = tracked(2, 3);
        for key in [1000, 500, 1] {
            tree.insert(key).unwrap();
        }
        tree.observer_mut().clear();

        tree.insert(1).unwrap();

        assert_eq!(tree.observer().read_count(), 2);
        assert_eq!(tree.observer().changed_count(), 0);
    }

    #[test]
    fn test_merge_tracks_parent_child_and_sibling() {
        let mut tree = tracked(2, 3);
        for key in [100, 50, 1000] {
            tree.insert(key).unwrap();
        }
        tree.observer_mut().clear();

        tree.delete(&50).unwrap();

        // root, emptied leaf, right sibling
        assert_eq!(tree.observer().read_count(), 3);
        assert_eq!(tree.observer().changed_count(), 3);
    }

    #[test]
    fn test_borrow_tracks_parent_child_and_sibling() {
        let mut tree = tracked(2, 3);
        for key in [100, 50, 25, 0] {
            tree.insert(key).unwrap();
        }
        let root = tree.root.unwrap();
        let left = tree.nodes[root].children[0];
        tree.observer_mut().clear();

        // [100] borrows 25 through the root from [0 25]
        tree.delete(&100).unwrap();

        assert_eq!(tree.observer().read_count(), 3);
        assert_eq!(tree.observer().changed_count(), 3);
        assert!(tree.observer().was_changed(root));
        assert!(tree.observer().was_changed(left));
    }

    #[test]
    fn test_merge_into_left_tracks_three_nodes() {
        let mut tree = tracked(2, 3);
        for key in [100, 50, 1000] {
            tree.insert(key).unwrap();
        }
        let root = tree.root.unwrap();
        let left = tree.nodes[root].children[0];
        tree.observer_mut().clear();

        tree.delete(&1000).unwrap();

        // root, emptied right leaf, left sibling that absorbed it
        assert_eq!(tree.observer().read_count(), 3);
        assert_eq!(tree.observer().changed_count(), 3);
        assert_eq!(tree.root, Some(left));
        assert!(tree.observer().was_changed(left));
    }

    #[test]
    fn test_internal_key_delete_changes_holder() {
        let mut tree = tracked(2, 4);
        for key in [10, 20, 30, 40, 5] {
            tree.insert(key).unwrap();
        }
        let root = tree.root.unwrap();
        let left = tree.nodes[root].children[0];
        tree.observer_mut().clear();

        // 30 sits in the root; 20 comes up from [5 10 20] without underflow
        tree.delete(&30).unwrap();

        assert_eq!(tree.observer().read_count(), 2);
        assert_eq!(tree.observer().changed_count(), 2);
        assert!(tree.observer().was_changed(root));
        assert!(tree.observer().was_changed(left));
    }

    #[test]
    fn test_plan_insert_counts_splits() {
        let mut tree = tree_2_3();
        assert_eq!(tree.plan_insert(&1), Some(1));

        tree.insert(1).unwrap();
        assert_eq!(tree.plan_insert(&1), None);
        assert_eq!(tree.plan_insert(&2), Some(0));

        tree.insert(2).unwrap();
        // Full leaf root: split plus new root
        assert_eq!(tree.plan_insert(&3), Some(2));
    }
}
