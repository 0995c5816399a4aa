//! Observer hooks the tree calls while it walks and rewrites nodes.

use crate::common::NodeId;

/// Receives node touch events from an [`AbTree`](crate::AbTree).
///
/// The tree reports every node it visits through [`on_read`] and every
/// node whose keys or children it mutates, or that it creates, through
/// [`on_change`]. A node may be reported more than once per operation;
/// implementations that count distinct nodes must deduplicate.
///
/// [`on_read`]: TouchObserver::on_read
/// [`on_change`]: TouchObserver::on_change
pub trait TouchObserver {
    /// A node was visited.
    fn on_read(&mut self, node: NodeId);

    /// A node was created, or its key or child sequence was mutated.
    fn on_change(&mut self, node: NodeId);
}

/// Observer that ignores every event.
///
/// This is the default observer type of [`AbTree`](crate::AbTree). Both
/// hooks are empty and inlined, so an uninstrumented tree carries no
/// tracking cost.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoopObserver;

impl TouchObserver for NoopObserver {
    #[inline(always)]
    fn on_read(&mut self, _node: NodeId) {}

    #[inline(always)]
    fn on_change(&mut self, _node: NodeId) {}
}

impl<O: TouchObserver + ?Sized> TouchObserver for &mut O {
    #[inline]
    fn on_read(&mut self, node: NodeId) {
        (**self).on_read(node);
    }

    #[inline]
    fn on_change(&mut self, node: NodeId) {
        (**self).on_change(node);
    }
}
