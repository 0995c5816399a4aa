//! (a,b)-tree index.
//!
//! # Components
//! - [`AbTree`] - The tree: lookup, insert, delete and all rebalancing
//! - `Node` - Ordered keys plus child ids, with capacity predicates
//! - `NodeArena` - Slot storage giving every node a stable [`NodeId`](crate::NodeId)
//!
//! # Rebalancing
//! ```text
//! insert overflow (b keys)        delete underflow (a-2 keys)
//!   split at b/2                    right sibling has surplus → borrow right
//!   median → parent                 right sibling at minimum  → merge right
//!   root split → new root           last child: same against the left sibling
//!                                   keyless root → its only child is the root
//! ```

mod arena;
mod node;
mod tree;

pub use tree::AbTree;
