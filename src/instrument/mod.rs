//! Node touch instrumentation.
//!
//! The tree reports what it reads and rewrites through a [`TouchObserver`]
//! chosen at construction time.
//!
//! # Components
//! - [`TouchObserver`] - The hook trait the tree calls into
//! - [`NoopObserver`] - Default observer, compiles to nothing
//! - [`TouchTracker`] - Read/changed node sets for "nodes touched per operation" stats
//! - [`TouchSnapshot`] - Set sizes at one point in time

mod observer;
mod tracker;

pub use observer::{NoopObserver, TouchObserver};
pub use tracker::{TouchSnapshot, TouchTracker};
