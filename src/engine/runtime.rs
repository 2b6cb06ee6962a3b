// src/engine/runtime.rs

use std::fmt;

use tracing::info;

use crate::engine::core::CoreRuntime;
use crate::engine::snapshot::{
    SnapshotWriter, FINAL_STATE_SNAPSHOT, PLAN_SNAPSHOT, PROCESS_SNAPSHOT,
};
use crate::engine::state::ExecutionState;
use crate::engine::RunOptions;
use crate::errors::Result;
use crate::exec::{
    NodeExecutor, PlanRequest, Planner, ProcessRequest, Reasoner, RequestContext, SqlEngine,
};
use crate::plan::Plan;

/// Shell around [`CoreRuntime`]: runs the planning phase, drives the
/// scheduler loop, and emits debugging snapshots between phases.
pub struct Runtime<R, E> {
    executor: NodeExecutor<R, E>,
    options: RunOptions,
    snapshots: Option<SnapshotWriter>,
}

impl<R, E> fmt::Debug for Runtime<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("options", &self.options)
            .field("snapshots", &self.snapshots.as_ref().map(|s| s.dir()))
            .finish_non_exhaustive()
    }
}

impl<R: Reasoner, E: SqlEngine> Runtime<R, E> {
    pub fn new(executor: NodeExecutor<R, E>, options: RunOptions) -> Self {
        Self {
            executor,
            options,
            snapshots: None,
        }
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotWriter) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Planning phase: ask the reasoner for the high-level process, then
    /// for the plan document.
    ///
    /// A plan document that fails to parse or validate is a hard error; the
    /// run cannot start without a plan.
    pub fn plan(&mut self, context: &RequestContext) -> Result<(Vec<String>, Plan)>
    where
        R: Planner,
    {
        let planner = self.executor.reasoner_mut();
        let process = planner.analyze_process(&ProcessRequest {
            user_request: &context.user_request,
            general_context: &context.general_context,
            schema_snapshot: &context.schema_snapshot,
        })?;
        info!(steps = process.len(), "process analysed");
        write_snapshot(self.snapshots.as_ref(), PROCESS_SNAPSHOT, &process);

        let raw = self.executor.reasoner_mut().plan(&PlanRequest {
            user_request: &context.user_request,
            process: &process,
            general_context: &context.general_context,
            schema_snapshot: &context.schema_snapshot,
        })?;
        let plan = Plan::try_from(raw)?;
        info!(
            version = plan.version(),
            nodes = plan.nodes().len(),
            edges = plan.edges().len(),
            "plan received"
        );

        Ok((process, plan))
    }

    /// Run the scheduler loop over `plan` until it terminates.
    ///
    /// Never fails: node failures, stalls and the attempt cap all end up in
    /// the returned state.
    pub fn execute(self, plan: Plan, process: Vec<String>, context: RequestContext) -> ExecutionState {
        let Runtime {
            executor,
            options,
            snapshots,
        } = self;

        write_snapshot(snapshots.as_ref(), PLAN_SNAPSHOT, &plan);

        let state = ExecutionState::new(plan, context).with_process(process);
        let core = CoreRuntime::new(state, executor, options);
        let (state, _executor) = core.run_to_completion();

        write_snapshot(snapshots.as_ref(), FINAL_STATE_SNAPSHOT, &state);
        state
    }
}

fn write_snapshot<T: serde::Serialize + ?Sized>(
    snapshots: Option<&SnapshotWriter>,
    name: &str,
    value: &T,
) {
    if let Some(writer) = snapshots {
        writer.write(name, value);
    }
}
