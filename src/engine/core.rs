// src/engine/core.rs

//! Scheduler loop.
//!
//! One cycle is `select -> run -> resolve -> continue?`. Each phase is a
//! function over `&mut ExecutionState`, so the state is handed from phase
//! to phase by exclusive borrow and never aliased. [`CoreRuntime`] owns
//! the state plus the node executor and drives cycles until the loop ends.
//!
//! The core performs no filesystem IO; snapshots and planning live in the
//! outer [`crate::engine::runtime`] shell.

use tracing::{debug, error, info, warn};

use crate::dag::NodeState;
use crate::engine::state::ExecutionState;
use crate::engine::{Issue, IssueReason, RunOptions};
use crate::exec::{ExecutionInputs, NodeExecutor, NodeOutput, OutputStatus, Reasoner, SqlEngine};
use crate::plan::NodeId;

/// Decision taken at the end of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Continuation {
    Continue,
    End,
}

/// Structured result of a single scheduler cycle.
///
/// Useful for tests that step the loop by hand and assert on what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreStep {
    /// Node executed in this cycle, if one was runnable.
    pub executed: Option<NodeId>,
    /// Outcome of that execution.
    pub outcome: Option<OutputStatus>,
    /// Nodes runnable after this cycle's merge.
    pub runnable: Vec<NodeId>,
    /// Whether the loop should run another cycle.
    pub keep_running: bool,
}

impl CoreStep {
    fn ended() -> Self {
        Self {
            executed: None,
            outcome: None,
            runnable: Vec::new(),
            keep_running: false,
        }
    }
}

/// Owns the execution state and node executor for one run.
#[derive(Debug)]
pub struct CoreRuntime<R, E> {
    state: ExecutionState,
    executor: NodeExecutor<R, E>,
    options: RunOptions,
    finished: bool,
}

impl<R: Reasoner, E: SqlEngine> CoreRuntime<R, E> {
    pub fn new(state: ExecutionState, executor: NodeExecutor<R, E>, options: RunOptions) -> Self {
        Self {
            state,
            executor,
            options,
            finished: false,
        }
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn executor(&self) -> &NodeExecutor<R, E> {
        &self.executor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Run one full cycle.
    pub fn step(&mut self) -> CoreStep {
        if self.finished {
            return CoreStep::ended();
        }

        let Some(node_id) = select(&mut self.state) else {
            finish_without_runnable(&mut self.state);
            self.finished = true;
            return CoreStep::ended();
        };

        let output = match run(&mut self.state, &mut self.executor, &node_id) {
            Some(output) => output,
            None => {
                self.finished = true;
                return CoreStep::ended();
            }
        };
        let outcome = output.status;

        resolve(&mut self.state, &node_id, output);

        let runnable = self.state.runnable_nodes();
        let keep_running = match decide(&mut self.state, &self.options, &runnable) {
            Continuation::Continue => true,
            Continuation::End => {
                self.finished = true;
                false
            }
        };

        CoreStep {
            executed: Some(node_id),
            outcome: Some(outcome),
            runnable,
            keep_running,
        }
    }

    /// Drive cycles until the loop ends and return the final state.
    pub fn run_to_completion(mut self) -> (ExecutionState, NodeExecutor<R, E>) {
        info!(
            nodes = self.state.plan().nodes().len(),
            max_attempts = self.options.max_attempts,
            "scheduler loop started"
        );

        while self.step().keep_running {}

        info!(
            total_attempts = self.state.total_attempts(),
            outcome = ?self.state.outcome(),
            issues = self.state.issues().len(),
            "scheduler loop finished"
        );

        (self.state, self.executor)
    }

    pub fn into_parts(self) -> (ExecutionState, NodeExecutor<R, E>) {
        (self.state, self.executor)
    }
}

/// Select: pick the first runnable node and record it as current.
fn select(state: &mut ExecutionState) -> Option<NodeId> {
    let next = state.runnable_nodes().into_iter().next();
    state.current_node_id = next.clone();
    if let Some(id) = &next {
        debug!(node = %id, "selected node");
    }
    next
}

/// Run: mark the node running, count the attempt, execute it.
///
/// Returns `None` only if the node could not be moved to `running`, which
/// means the status table disagrees with readiness; the loop stops then.
fn run<R: Reasoner, E: SqlEngine>(
    state: &mut ExecutionState,
    executor: &mut NodeExecutor<R, E>,
    node_id: &str,
) -> Option<NodeOutput> {
    if let Err(err) = state.node_status.transition(node_id, NodeState::Running, None) {
        error!(node = %node_id, error = %err, "cannot start selected node; stopping");
        return None;
    }
    state.total_attempts += 1;

    let node = state.plan.node(node_id)?.clone();
    let inputs_map = state.artifacts.select(node.requires.iter());
    let inputs = ExecutionInputs {
        artifacts: &inputs_map,
        context: &state.context,
        statement_log: &state.executed_queries,
    };

    let output = executor.execute(&node, &inputs);

    if let Some(sql) = &output.statement {
        state.executed_queries.push(sql.clone());
    }

    Some(output)
}

/// Resolve: settle the node's final state and merge artifacts on success.
fn resolve(state: &mut ExecutionState, node_id: &str, output: NodeOutput) {
    let result = if output.is_ok() {
        state.artifacts.merge(&output.artifacts);
        state
            .node_status
            .transition(node_id, NodeState::Succeeded, None)
    } else {
        let message = output
            .error
            .clone()
            .unwrap_or_else(|| "node execution failed".to_string());
        state
            .node_status
            .transition(node_id, NodeState::Failed, Some(message))
    };

    if let Err(err) = result {
        error!(node = %node_id, error = %err, "failed to record node outcome");
    }

    state.last_output = Some(output);
}

/// Continue?: enforce the attempt cap, then either loop or terminate.
fn decide(state: &mut ExecutionState, options: &RunOptions, runnable: &[NodeId]) -> Continuation {
    if state.total_attempts >= options.max_attempts {
        warn!(
            total_attempts = state.total_attempts,
            max_attempts = options.max_attempts,
            "attempt cap reached; stopping"
        );
        let nodes = state.unfinished_nodes();
        state.issues.push(Issue {
            reason: IssueReason::MaxAttemptsExceeded,
            nodes,
        });
        return Continuation::End;
    }

    if runnable.is_empty() {
        finish_without_runnable(state);
        return Continuation::End;
    }

    Continuation::Continue
}

/// Terminate with nothing runnable: a stall unless everything succeeded.
fn finish_without_runnable(state: &mut ExecutionState) {
    state.current_node_id = None;

    if state.node_status.all_succeeded() {
        info!("all nodes succeeded");
        return;
    }

    for failed in state.node_status.ids_in_state(NodeState::Failed) {
        let blocked = state.plan.graph().downstream_of(&failed);
        warn!(node = %failed, ?blocked, "failed node blocks its downstream subgraph");
    }

    let nodes = state.unfinished_nodes();
    warn!(?nodes, "execution stalled");
    state.issues.push(Issue {
        reason: IssueReason::ExecutionStalledDueToFailures,
        nodes,
    });
}
