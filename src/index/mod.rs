//! Index structures.
//!
//! - [`abtree`] - In-memory (a,b)-tree with explicit split/borrow/merge

pub mod abtree;

pub use abtree::AbTree;
