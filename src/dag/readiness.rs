// src/dag/readiness.rs

//! Readiness resolution: which pending nodes may run right now.

use tracing::trace;

use crate::artifacts::ArtifactStore;
use crate::dag::status::{NodeState, NodeStatusTable};
use crate::plan::model::{NodeId, NodeSpec, Plan};

/// Read-only view over plan, statuses and artifacts for readiness checks.
///
/// Holds shared borrows only, so a check can never observe a half-applied
/// merge: the caller must finish mutating before it can build one.
pub struct Readiness<'a> {
    plan: &'a Plan,
    status: &'a NodeStatusTable,
    artifacts: &'a ArtifactStore,
}

impl<'a> Readiness<'a> {
    pub fn new(plan: &'a Plan, status: &'a NodeStatusTable, artifacts: &'a ArtifactStore) -> Self {
        Self {
            plan,
            status,
            artifacts,
        }
    }

    /// Every source of an incoming edge has succeeded.
    ///
    /// A failed predecessor makes this permanently false, which is what keeps
    /// a failure confined to its downstream subgraph.
    pub fn predecessors_succeeded(&self, node: &NodeSpec) -> bool {
        self.plan
            .graph()
            .predecessors_of(&node.id)
            .iter()
            .all(|p| self.status.state_of(p) == NodeState::Succeeded)
    }

    /// Every name in `requires` is already in the store.
    pub fn requirements_met(&self, node: &NodeSpec) -> bool {
        node.requires.iter().all(|r| self.artifacts.contains(r))
    }

    pub fn is_runnable(&self, node: &NodeSpec) -> bool {
        self.status.state_of(&node.id) == NodeState::Pending
            && self.predecessors_succeeded(node)
            && self.requirements_met(node)
    }

    /// Runnable node ids in plan declaration order.
    pub fn runnable_nodes(&self) -> Vec<NodeId> {
        let runnable: Vec<NodeId> = self
            .plan
            .nodes()
            .iter()
            .filter(|n| self.is_runnable(n))
            .map(|n| n.id.clone())
            .collect();

        trace!(?runnable, "readiness resolved");
        runnable
    }
}

/// Convenience wrapper around [`Readiness::runnable_nodes`].
pub fn runnable_nodes(
    plan: &Plan,
    status: &NodeStatusTable,
    artifacts: &ArtifactStore,
) -> Vec<NodeId> {
    Readiness::new(plan, status, artifacts).runnable_nodes()
}
