//! Replays commands against a tracked tree and averages node touches per run.

use std::fmt;
use std::io::Write;

use crate::common::{Result, TreeConfig};
use crate::index::AbTree;
use crate::instrument::{TouchSnapshot, TouchTracker};
use crate::workload::Command;

/// Touch totals for one run (everything between two `NewTree` commands).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Label given by the `NewTree` command that opened the run.
    pub size: u64,

    /// Inserts and deletes executed.
    pub operations: u64,

    /// Sum of distinct nodes read per operation.
    pub touched: u64,

    /// Sum of distinct nodes changed per operation.
    pub changed: u64,
}

impl RunStats {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Add one operation's touch counts.
    pub fn record(&mut self, snapshot: TouchSnapshot) {
        self.operations += 1;
        self.touched += snapshot.read as u64;
        self.changed += snapshot.changed as u64;
    }

    /// Averages for the run, or `None` if it executed no operation.
    pub fn summary(&self) -> Option<RunSummary> {
        if self.operations == 0 {
            return None;
        }

        let operations = self.operations as f64;
        Some(RunSummary {
            size: self.size,
            operations: self.operations,
            avg_touched: self.touched as f64 / operations,
            avg_changed: self.changed as f64 / operations,
        })
    }
}

/// Per-operation averages of a finished run.
///
/// Displays as `size;avg_touched;avg_changed`.
///
/// # Example
/// ```
/// use abtree::workload::RunSummary;
///
/// let summary = RunSummary {
///     size: 1000,
///     operations: 4,
///     avg_touched: 2.5,
///     avg_changed: 1.0,
/// };
/// assert_eq!(summary.to_string(), "1000;2.5;1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub size: u64,
    pub operations: u64,
    pub avg_touched: f64,
    pub avg_changed: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.size, self.avg_touched, self.avg_changed)
    }
}

/// Drives a `u64` tree from a command stream.
///
/// After every insert or delete the tracker's set sizes are added to the
/// current run and the tracker is cleared, so each operation is measured on
/// its own.
///
/// # Example
/// ```
/// use abtree::workload::{Command, WorkloadRunner};
/// use abtree::TreeConfig;
///
/// let mut runner = WorkloadRunner::new(TreeConfig::default());
/// runner.apply(Command::NewTree(2)).unwrap();
/// runner.apply(Command::Insert(1)).unwrap();
/// runner.apply(Command::Insert(2)).unwrap();
///
/// let summary = runner.finish().unwrap();
/// assert_eq!(summary.size, 2);
/// assert_eq!(summary.avg_touched, 1.0);
/// assert_eq!(summary.avg_changed, 1.0);
/// ```
pub struct WorkloadRunner {
    tree: AbTree<u64, TouchTracker>,
    current: RunStats,
    verify: bool,
}

impl WorkloadRunner {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            tree: AbTree::with_observer(config, TouchTracker::new()),
            current: RunStats::new(0),
            verify: false,
        }
    }

    /// Audit the whole tree after every operation.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn tree(&self) -> &AbTree<u64, TouchTracker> {
        &self.tree
    }

    /// Totals of the run in progress.
    pub fn current(&self) -> RunStats {
        self.current
    }

    /// Execute one command.
    ///
    /// Returns the summary of the previous run when a `NewTree` closes it.
    ///
    /// # Errors
    /// - `Error::AllocationFailed` from the tree
    /// - `Error::InvariantViolation` in verification mode
    pub fn apply(&mut self, command: Command) -> Result<Option<RunSummary>> {
        match command {
            Command::NewTree(size) => {
                let finished = self.finish();
                self.current = RunStats::new(size);
                self.tree.clear();
                self.tree.observer_mut().clear();
                return Ok(finished);
            }
            Command::Insert(key) => {
                self.tree.insert(key)?;
            }
            Command::Delete(key) => {
                self.tree.delete(&key)?;
            }
        }

        if self.verify {
            self.tree.check_invariants()?;
        }

        let snapshot = self.tree.observer().snapshot();
        self.current.record(snapshot);
        self.tree.observer_mut().clear();
        Ok(None)
    }

    /// Close the run in progress and return its summary, if it did anything.
    pub fn finish(&mut self) -> Option<RunSummary> {
        let summary = self.current.summary();
        if let Some(summary) = &summary {
            log::debug!(
                "run {} finished after {} operations ({} keys, {} nodes)",
                summary.size,
                summary.operations,
                self.tree.len(),
                self.tree.node_count()
            );
        }
        self.current = RunStats::new(self.current.size);
        summary
    }

    /// Replay `commands` and write one summary line per run to `out`.
    ///
    /// Returns the number of lines written.
    ///
    /// # Errors
    /// Stops at the first parse, tree, or I/O error.
    pub fn run<I, W>(&mut self, commands: I, out: &mut W) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Command>>,
        W: Write,
    {
        let mut written = 0;
        for command in commands {
            if let Some(summary) = self.apply(command?)? {
                writeln!(out, "{}", summary)?;
                written += 1;
            }
        }

        if let Some(summary) = self.finish() {
            writeln!(out, "{}", summary)?;
            written += 1;
        }
        Ok(written)
    }
}
