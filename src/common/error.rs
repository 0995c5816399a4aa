//! Error types for abtree.

use std::collections::TryReserveError;

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in abtree.
///
/// Degenerate tree operations (inserting a duplicate, deleting an absent
/// key, clearing an empty tree) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// The `(a, b)` pair cannot describe a valid tree.
    ///
    /// Requires `a >= 2` and `b >= 2a - 1`.
    #[error("invalid tree bounds (a={lower}, b={upper}): need a >= 2 and b >= 2a - 1")]
    InvalidBounds { lower: usize, upper: usize },

    /// Memory for the nodes an operation needs could not be reserved.
    ///
    /// The tree is left exactly as it was before the call.
    #[error("allocation failed: {0}")]
    AllocationFailed(#[from] TryReserveError),

    /// A structural audit found a broken invariant.
    ///
    /// This indicates a bug in the rebalancing code.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),

    /// I/O error while reading a workload or writing a report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A workload line could not be parsed into a command.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}
