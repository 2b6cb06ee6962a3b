// tests/readiness.rs

mod common;
use crate::common::builders::{NodeSpecBuilder, PlanBuilder};
use crate::common::{init_tracing, store_with};

use std::error::Error;

use sqldag::artifacts::ArtifactStore;
use sqldag::dag::{runnable_nodes, NodeState, NodeStatusTable, Readiness};
use sqldag::plan::Plan;

type TestResult = Result<(), Box<dyn Error>>;

/// q1 (SQL) -> a1 (result analyzer), plus an independent analyzer z1.
fn chain_plan() -> Plan {
    PlanBuilder::new()
        .node(NodeSpecBuilder::sql("q1").produces("sql_1").produces("result_1"))
        .node(NodeSpecBuilder::result_analyzer("a1").requires("result_1").produces("summary_1"))
        .node(NodeSpecBuilder::analyzer("z1").produces("notes_1"))
        .edge("q1", "a1")
        .build()
}

fn registered(plan: &Plan) -> NodeStatusTable {
    let mut table = NodeStatusTable::new();
    for node in plan.nodes() {
        table.register(node.id.clone());
    }
    table
}

#[test]
fn roots_without_requirements_are_runnable_in_plan_order() {
    init_tracing();
    let plan = chain_plan();
    let status = registered(&plan);

    let runnable = runnable_nodes(&plan, &status, &ArtifactStore::new());
    assert_eq!(runnable, vec!["q1".to_string(), "z1".to_string()]);
}

#[test]
fn node_waits_for_predecessor_even_when_artifacts_exist() -> TestResult {
    init_tracing();
    let plan = chain_plan();
    let status = registered(&plan);
    let store = store_with(&["result_1"]);

    let readiness = Readiness::new(&plan, &status, &store);
    let a1 = plan.node("a1").ok_or("missing a1")?;
    assert!(readiness.requirements_met(a1));
    assert!(!readiness.predecessors_succeeded(a1));
    assert!(!readiness.is_runnable(a1));
    Ok(())
}

#[test]
fn node_waits_for_artifacts_even_when_predecessor_succeeded() -> TestResult {
    init_tracing();
    let plan = chain_plan();
    let mut status = registered(&plan);
    status.transition("q1", NodeState::Running, None)?;
    status.transition("q1", NodeState::Succeeded, None)?;

    // q1 succeeded but never wrote result_1.
    let runnable = runnable_nodes(&plan, &status, &ArtifactStore::new());
    assert_eq!(runnable, vec!["z1".to_string()]);

    let runnable = runnable_nodes(&plan, &status, &store_with(&["result_1"]));
    assert_eq!(runnable, vec!["a1".to_string(), "z1".to_string()]);
    Ok(())
}

#[test]
fn failed_predecessor_blocks_dependents_permanently() -> TestResult {
    init_tracing();
    let plan = chain_plan();
    let mut status = registered(&plan);
    status.transition("q1", NodeState::Running, None)?;
    status.transition("q1", NodeState::Failed, Some("boom".to_string()))?;

    let store = store_with(&["result_1", "sql_1"]);
    let runnable = runnable_nodes(&plan, &status, &store);
    assert_eq!(runnable, vec!["z1".to_string()]);
    Ok(())
}

#[test]
fn running_and_finished_nodes_are_not_runnable() -> TestResult {
    init_tracing();
    let plan = chain_plan();
    let mut status = registered(&plan);
    status.transition("z1", NodeState::Running, None)?;
    assert_eq!(
        runnable_nodes(&plan, &status, &ArtifactStore::new()),
        vec!["q1".to_string()]
    );

    status.transition("z1", NodeState::Succeeded, None)?;
    assert_eq!(
        runnable_nodes(&plan, &status, &ArtifactStore::new()),
        vec!["q1".to_string()]
    );
    Ok(())
}

#[test]
fn nodes_on_a_cycle_never_become_runnable() {
    init_tracing();
    let plan = PlanBuilder::new()
        .node(NodeSpecBuilder::analyzer("a"))
        .node(NodeSpecBuilder::analyzer("b"))
        .node(NodeSpecBuilder::analyzer("c"))
        .edge("a", "b")
        .edge("b", "a")
        .build();
    let status = registered(&plan);

    assert_eq!(
        runnable_nodes(&plan, &status, &ArtifactStore::new()),
        vec!["c".to_string()]
    );
}
