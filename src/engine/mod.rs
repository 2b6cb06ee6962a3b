// src/engine/mod.rs

//! Plan execution engine.
//!
//! This module ties together:
//! - the execution state threaded through a run ([`state`])
//! - the scheduler loop (select, run, resolve, continue) ([`core`])
//! - the outer shell that plans, runs the loop and writes debugging
//!   snapshots ([`runtime`], [`snapshot`])
//!
//! The loop is strictly sequential: exactly one node executes at a time and
//! every collaborator call blocks until it returns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::NodeId;

/// Safety cap on the total number of node attempts in one run.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Options for one run of the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop once this many attempts have been made across all nodes.
    pub max_attempts: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Why a run ended short of full success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    MaxAttemptsExceeded,
    ExecutionStalledDueToFailures,
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueReason::MaxAttemptsExceeded => "max_attempts_exceeded",
            IssueReason::ExecutionStalledDueToFailures => "execution_stalled_due_to_failures",
        })
    }
}

/// Structured termination issue recorded in the execution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub reason: IssueReason,
    /// Nodes that had not succeeded when the issue was raised.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeId>,
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every node succeeded.
    Completed,
    /// Nothing was runnable but some nodes had not succeeded.
    Stalled,
    /// The attempt cap was reached.
    AttemptCapReached,
}

pub mod core;
pub mod runtime;
pub mod snapshot;
pub mod state;

pub use self::core::{CoreRuntime, CoreStep};
pub use runtime::Runtime;
pub use snapshot::SnapshotWriter;
pub use state::ExecutionState;
