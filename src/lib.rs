//! abtree - An (a,b)-tree index with explicit rebalancing and node touch tracking.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             abtree                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Workload Layer (workload/)                  │   │
//! │  │   CommandReader → WorkloadRunner → RunSummary lines      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/abtree/)                 │   │
//! │  │   AbTree: contains / insert / delete / clear            │   │
//! │  │   split · borrow · merge · root promote/collapse        │   │
//! │  │   Node + NodeArena (no parent pointers)                 │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Instrumentation (instrument/)                  │   │
//! │  │   TouchObserver: NoopObserver | TouchTracker            │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (TreeConfig, NodeId, Error)
//! - [`index`] - The (a,b)-tree
//! - [`instrument`] - Read/changed node tracking
//! - [`workload`] - Command files and per-run statistics
//!
//! # Quick Start
//! ```
//! use abtree::{AbTree, TouchTracker, TreeConfig};
//!
//! let config = TreeConfig::new(2, 3).unwrap();
//! let mut tree = AbTree::with_observer(config, TouchTracker::new());
//!
//! for key in [100u64, 50, 1000, 2000] {
//!     tree.insert(key).unwrap();
//! }
//! tree.observer_mut().clear();
//!
//! // Leaf [50] underflows and borrows from its right sibling
//! tree.delete(&50).unwrap();
//! assert_eq!(tree.node_count(), 3);
//! assert_eq!(tree.root_keys(), &[1000]);
//! assert_eq!(tree.observer().changed_count(), 3);
//! ```

pub mod common;
pub mod index;
pub mod instrument;
pub mod workload;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND};
pub use common::{Error, NodeId, Result, TreeConfig};

pub use index::AbTree;
pub use instrument::{NoopObserver, TouchObserver, TouchSnapshot, TouchTracker};
