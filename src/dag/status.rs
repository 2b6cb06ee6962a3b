// src/dag/status.rs

//! Per-node execution state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, SqldagError};
use crate::plan::model::NodeId;

/// Execution state of a node.
///
/// `Pending -> Running -> Succeeded | Failed`. Both outcomes are terminal:
/// nothing moves a failed node back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl NodeState {
    fn can_transition_to(self, next: NodeState) -> bool {
        matches!(
            (self, next),
            (NodeState::Pending, NodeState::Running)
                | (NodeState::Running, NodeState::Succeeded)
                | (NodeState::Running, NodeState::Failed)
        )
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Pending => "pending",
            NodeState::Running => "running",
            NodeState::Succeeded => "succeeded",
            NodeState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub state: NodeState,
    /// Number of `pending -> running` transitions seen by this node.
    pub attempts: u32,
    /// Set only when `state` is `Failed`.
    pub last_error: Option<String>,
}

/// Status of every node registered for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeStatusTable {
    entries: BTreeMap<NodeId, NodeStatus>,
}

impl NodeStatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with a fresh `pending` status. Re-registering an
    /// existing node leaves its status alone.
    pub fn register(&mut self, id: impl Into<NodeId>) {
        self.entries.entry(id.into()).or_default();
    }

    /// Current status, or a fresh `pending` status for an unseen node.
    pub fn get(&self, id: &str) -> NodeStatus {
        self.entries.get(id).cloned().unwrap_or_default()
    }

    pub fn state_of(&self, id: &str) -> NodeState {
        self.entries.get(id).map(|s| s.state).unwrap_or_default()
    }

    /// The only mutator.
    ///
    /// Counts an attempt on `pending -> running`; stores `error` only on
    /// `-> failed`. Transitions outside the node lifecycle are rejected and
    /// leave the entry untouched.
    pub fn transition(
        &mut self,
        id: &str,
        next: NodeState,
        error: Option<String>,
    ) -> Result<()> {
        let status = self.entries.entry(id.to_string()).or_default();

        if !status.state.can_transition_to(next) {
            return Err(SqldagError::InvalidTransition {
                node: id.to_string(),
                from: status.state,
                to: next,
            });
        }

        debug!(node = %id, from = %status.state, to = %next, "node transition");

        if next == NodeState::Running {
            status.attempts += 1;
        }
        status.last_error = if next == NodeState::Failed { error } else { None };
        status.state = next;

        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeStatus)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every registered node succeeded (vacuously true when empty).
    pub fn all_succeeded(&self) -> bool {
        self.entries
            .values()
            .all(|s| s.state == NodeState::Succeeded)
    }

    /// Sum of per-node attempt counters.
    pub fn total_attempts(&self) -> u32 {
        self.entries.values().map(|s| s.attempts).sum()
    }

    pub fn ids_in_state(&self, state: NodeState) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(_, s)| s.state == state)
            .map(|(id, _)| id.clone())
            .collect()
    }
}
