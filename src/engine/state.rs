// src/engine/state.rs

use serde::Serialize;

use crate::artifacts::ArtifactStore;
use crate::dag::{runnable_nodes, NodeState, NodeStatusTable};
use crate::engine::{Issue, IssueReason, RunOutcome};
use crate::exec::{NodeOutput, RequestContext};
use crate::plan::{NodeId, Plan};

/// Aggregate threaded through every phase of the scheduler loop.
///
/// One value per run, owned by the loop; phases borrow it exclusively, so
/// nothing else can observe it mid-update.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionState {
    pub(crate) context: RequestContext,
    pub(crate) process: Vec<String>,
    pub(crate) plan: Plan,
    pub(crate) node_status: NodeStatusTable,
    pub(crate) artifacts: ArtifactStore,
    pub(crate) current_node_id: Option<NodeId>,
    pub(crate) last_output: Option<NodeOutput>,
    pub(crate) executed_queries: Vec<String>,
    pub(crate) total_attempts: u32,
    pub(crate) issues: Vec<Issue>,
}

impl ExecutionState {
    /// Fresh state for `plan`, with every node registered as pending.
    pub fn new(plan: Plan, context: RequestContext) -> Self {
        let mut node_status = NodeStatusTable::new();
        for node in plan.nodes() {
            node_status.register(node.id.clone());
        }

        Self {
            context,
            process: Vec::new(),
            plan,
            node_status,
            artifacts: ArtifactStore::new(),
            current_node_id: None,
            last_output: None,
            executed_queries: Vec::new(),
            total_attempts: 0,
            issues: Vec::new(),
        }
    }

    pub fn with_process(mut self, process: Vec<String>) -> Self {
        self.process = process;
        self
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn process(&self) -> &[String] {
        &self.process
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn node_status(&self) -> &NodeStatusTable {
        &self.node_status
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.current_node_id.as_deref()
    }

    pub fn last_output(&self) -> Option<&NodeOutput> {
        self.last_output.as_ref()
    }

    /// SQL statements issued so far, oldest first.
    pub fn executed_queries(&self) -> &[String] {
        &self.executed_queries
    }

    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn state_of(&self, id: &str) -> NodeState {
        self.node_status.state_of(id)
    }

    /// Currently runnable node ids, in plan order.
    pub fn runnable_nodes(&self) -> Vec<NodeId> {
        runnable_nodes(&self.plan, &self.node_status, &self.artifacts)
    }

    /// Classify a terminated run from its recorded issues.
    pub fn outcome(&self) -> RunOutcome {
        if self
            .issues
            .iter()
            .any(|i| i.reason == IssueReason::MaxAttemptsExceeded)
        {
            RunOutcome::AttemptCapReached
        } else if self.node_status.all_succeeded() {
            RunOutcome::Completed
        } else {
            RunOutcome::Stalled
        }
    }

    pub(crate) fn unfinished_nodes(&self) -> Vec<NodeId> {
        self.plan
            .nodes()
            .iter()
            .filter(|n| self.node_status.state_of(&n.id) != NodeState::Succeeded)
            .map(|n| n.id.clone())
            .collect()
    }
}
