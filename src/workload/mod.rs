//! Command-file workloads for measuring node touches per operation.
//!
//! A workload is a sequence of runs. Each run starts from an empty tree
//! (`# n`), then inserts (`I k`) and deletes (`D k`) keys. For every run the
//! [`WorkloadRunner`] reports the average number of distinct nodes read and
//! changed per operation.
//!
//! # Components
//! - [`Command`] / [`CommandReader`] - Line parsing
//! - [`RunStats`] / [`RunSummary`] - Per-run totals and averages
//! - [`WorkloadRunner`] - Applies commands to a tracked `AbTree<u64, _>`

mod command;
mod runner;

pub use command::{Command, CommandReader};
pub use runner::{RunStats, RunSummary, WorkloadRunner};
