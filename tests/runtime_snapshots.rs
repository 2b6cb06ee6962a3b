// tests/runtime_snapshots.rs

mod common;
use crate::common::fakes::{FakeReasoner, FakeSqlEngine};
use crate::common::{init_tracing, request};

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use sqldag::engine::{RunOptions, RunOutcome, Runtime, SnapshotWriter};
use sqldag::errors::SqldagError;
use sqldag::exec::{NodeExecutor, ScriptedReasoner};
use sqldag::fs::mock::MockFileSystem;
use sqldag::fs::FileSystem;

type TestResult = Result<(), Box<dyn Error>>;

const PLAN_JSON: &str = r#"{
    "version": "1.0",
    "nodes": [
        {"id": "n1", "type": "SQL", "label": "count", "produces": "sql_1,result_1",
         "input": "count open orders"},
        {"id": "n2", "type": "SQL_RESULT_ANALYZER", "label": "explain",
         "requires": "result_1", "produces": "summary_1", "input": "explain the count"}
    ],
    "edges": "n1>n2"
}"#;

fn read_json(fs: &MockFileSystem, path: &Path) -> Result<Value, Box<dyn Error>> {
    let text = fs.read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[test]
fn plan_and_execute_write_all_snapshots() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    let writer = SnapshotWriter::new(Arc::new(fs.clone()), "output");

    let reasoner = FakeReasoner::new().with_plan(&["[SQL] count", "[ANALYZE] explain"], PLAN_JSON);
    let mut runtime = Runtime::new(
        NodeExecutor::new(reasoner, FakeSqlEngine::new()),
        RunOptions::default(),
    )
    .with_snapshots(writer);

    let context = request("how many open orders?");
    let (process, plan) = runtime.plan(&context)?;
    assert_eq!(process, vec!["[SQL] count", "[ANALYZE] explain"]);
    assert_eq!(plan.nodes().len(), 2);

    let state = runtime.execute(plan, process, context);
    assert_eq!(state.outcome(), RunOutcome::Completed);
    assert_eq!(state.process().len(), 2);

    assert_eq!(
        fs.paths(),
        vec![
            PathBuf::from("output/final_state.json"),
            PathBuf::from("output/plan.json"),
            PathBuf::from("output/process.json"),
        ]
    );

    let process_snapshot = read_json(&fs, Path::new("output/process.json"))?;
    assert_eq!(process_snapshot[0], "[SQL] count");

    let plan_snapshot = read_json(&fs, Path::new("output/plan.json"))?;
    assert_eq!(plan_snapshot["nodes"][1]["type"], "SQL_RESULT_ANALYZER");
    assert_eq!(plan_snapshot["edges"][0]["source"], "n1");

    let final_state = read_json(&fs, Path::new("output/final_state.json"))?;
    assert_eq!(final_state["total_attempts"], 2);
    assert_eq!(final_state["node_status"]["n2"]["state"], "succeeded");
    assert_eq!(final_state["artifacts"]["summary_1"], "n2:summary_1");
    assert_eq!(final_state["artifacts"]["result_1"]["columns"][0], "value");
    Ok(())
}

#[test]
fn runtime_without_snapshots_writes_nothing() -> TestResult {
    init_tracing();
    let reasoner = FakeReasoner::new().with_plan(&[], PLAN_JSON);
    let mut runtime = Runtime::new(
        NodeExecutor::new(reasoner, FakeSqlEngine::new()),
        RunOptions::default(),
    );

    let context = request("count");
    let (process, plan) = runtime.plan(&context)?;
    let state = runtime.execute(plan, process, context);

    assert_eq!(state.outcome(), RunOutcome::Completed);
    Ok(())
}

#[test]
fn invalid_plan_from_planner_is_a_hard_error() {
    init_tracing();
    let bad = r#"{"version": "1.0", "nodes": "[{oops", "edges": ""}"#;
    let reasoner = FakeReasoner::new().with_plan(&["[SQL] x"], bad);
    let mut runtime = Runtime::new(
        NodeExecutor::new(reasoner, FakeSqlEngine::new()),
        RunOptions::default(),
    );

    let err = runtime
        .plan(&request("x"))
        .expect_err("planning must fail");
    assert!(matches!(err, SqldagError::PlanError(_)), "{err:?}");
}

#[test]
fn scripted_reasoner_replays_a_recorded_session() -> TestResult {
    init_tracing();
    let script = format!(
        r#"{{
            "process": ["[SQL] count", "[ANALYZE] explain"],
            "plan": {PLAN_JSON},
            "nodes": {{
                "n1": {{"sql": "SELECT count(*) AS open FROM orders", "notes": "count"}},
                "n2": {{"status": "ok", "outputs": "{{\"summary_1\": \"1 open\"}}"}}
            }}
        }}"#
    );
    let fs = MockFileSystem::new();
    fs.add_file("session.json", script);

    let reasoner = ScriptedReasoner::load(&fs, Path::new("session.json"))?;
    assert!(reasoner.has_plan());

    let engine = FakeSqlEngine::new();
    let mut runtime = Runtime::new(NodeExecutor::new(reasoner, engine.clone()), RunOptions::default());

    let context = request("how many open orders?");
    let (process, plan) = runtime.plan(&context)?;
    let state = runtime.execute(plan, process, context);

    assert_eq!(state.outcome(), RunOutcome::Completed);
    assert_eq!(engine.executed(), vec!["SELECT count(*) AS open FROM orders".to_string()]);
    assert_eq!(
        state.artifacts().get("summary_1").map(|v| v.to_json()),
        Some(Value::from("1 open"))
    );
    Ok(())
}

#[test]
fn scripted_reasoner_without_a_node_response_fails_that_node() -> TestResult {
    init_tracing();
    let script = format!(r#"{{"plan": {PLAN_JSON}, "nodes": {{}}}}"#);
    let mut reasoner = ScriptedReasoner::from_json(&script)?;

    let mut runtime = Runtime::new(
        NodeExecutor::new(reasoner.clone(), FakeSqlEngine::new()),
        RunOptions::default(),
    );
    let context = request("x");
    let (process, plan) = runtime.plan(&context)?;
    let state = runtime.execute(plan, process, context);

    assert_eq!(state.outcome(), RunOutcome::Stalled);
    assert_eq!(
        state.node_status().get("n1").last_error.as_deref(),
        Some("no scripted response for node 'n1'")
    );

    // A script without a plan cannot plan.
    reasoner = ScriptedReasoner::from_json(r#"{"nodes": {}}"#)?;
    let mut runtime = Runtime::new(
        NodeExecutor::new(reasoner, FakeSqlEngine::new()),
        RunOptions::default(),
    );
    assert!(runtime.plan(&request("x")).is_err());
    Ok(())
}
