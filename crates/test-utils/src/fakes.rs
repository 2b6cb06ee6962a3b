#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use sqldag::artifacts::TabularResult;
use sqldag::errors::{Result, SqldagError};
use sqldag::exec::{
    AnalyzerRequest, AnalyzerResponse, PlanRequest, Planner, ProcessRequest, Reasoner,
    ResultAnalyzerRequest, SqlEngine, SqlOutcome, SqlRequest, SqlResponse,
};
use sqldag::plan::RawPlanDocument;
use sqldag::types::StatementKind;

/// A fake reasoning collaborator that:
/// - records which nodes it was asked about, in call order
/// - answers SQL nodes with `SELECT * FROM <node id>` unless scripted
/// - answers analyzer nodes with `ok`, writing every declared output as
///   the string `"<node>:<artifact>"`, unless scripted or marked failing
#[derive(Debug, Default, Clone)]
pub struct FakeReasoner {
    sql: HashMap<String, String>,
    responses: HashMap<String, AnalyzerResponse>,
    failing: HashSet<String>,
    erroring: HashSet<String>,
    process: Vec<String>,
    plan: Option<RawPlanDocument>,
    calls: Arc<Mutex<Vec<String>>>,
    summarized_sql: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the call log with the test.
    pub fn with_calls(mut self, calls: Arc<Mutex<Vec<String>>>) -> Self {
        self.calls = calls;
        self
    }

    /// SQL text returned for `node`.
    pub fn with_sql(mut self, node: &str, sql: &str) -> Self {
        self.sql.insert(node.to_string(), sql.to_string());
        self
    }

    /// Raw analyzer response returned for `node`.
    pub fn with_response(mut self, node: &str, status: &str, outputs: &str) -> Self {
        self.responses.insert(
            node.to_string(),
            AnalyzerResponse {
                status: status.to_string(),
                outputs: outputs.to_string(),
                notes: String::new(),
            },
        );
        self
    }

    /// Analyzer nodes answer with status `fail`.
    pub fn failing(mut self, node: &str) -> Self {
        self.failing.insert(node.to_string());
        self
    }

    /// Every call about `node` returns a collaborator error.
    pub fn erroring(mut self, node: &str) -> Self {
        self.erroring.insert(node.to_string());
        self
    }

    pub fn with_plan(mut self, process: &[&str], plan_json: &str) -> Self {
        self.process = process.iter().map(|s| s.to_string()).collect();
        self.plan = Some(serde_json::from_str(plan_json).expect("invalid plan document in test"));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// `(node, sql)` pairs seen by result summarization.
    pub fn summarized_sql(&self) -> Vec<(String, String)> {
        self.summarized_sql.lock().unwrap().clone()
    }

    fn record(&self, node: &str) -> Result<()> {
        self.calls.lock().unwrap().push(node.to_string());
        if self.erroring.contains(node) {
            return Err(SqldagError::Collaborator(format!(
                "collaborator unavailable for {node}"
            )));
        }
        Ok(())
    }

    fn answer(&self, node: &str, produces: &[String]) -> AnalyzerResponse {
        if let Some(resp) = self.responses.get(node) {
            return resp.clone();
        }
        if self.failing.contains(node) {
            return AnalyzerResponse {
                status: "fail".to_string(),
                outputs: "{}".to_string(),
                notes: String::new(),
            };
        }

        let outputs: Map<String, Value> = produces
            .iter()
            .map(|p| (p.clone(), Value::String(format!("{node}:{p}"))))
            .collect();
        AnalyzerResponse {
            status: "ok".to_string(),
            outputs: Value::Object(outputs).to_string(),
            notes: String::new(),
        }
    }
}

impl Planner for FakeReasoner {
    fn analyze_process(&mut self, _request: &ProcessRequest<'_>) -> Result<Vec<String>> {
        Ok(self.process.clone())
    }

    fn plan(&mut self, _request: &PlanRequest<'_>) -> Result<RawPlanDocument> {
        self.plan
            .clone()
            .ok_or_else(|| SqldagError::Collaborator("no plan configured".to_string()))
    }
}

impl Reasoner for FakeReasoner {
    fn analyze(&mut self, request: &AnalyzerRequest<'_>) -> Result<AnalyzerResponse> {
        self.record(request.node_id)?;
        Ok(self.answer(request.node_id, request.produces))
    }

    fn generate_sql(&mut self, request: &SqlRequest<'_>) -> Result<SqlResponse> {
        let node = request.node.node_id;
        self.record(node)?;
        if self.failing.contains(node) {
            return Err(SqldagError::Collaborator(format!("no SQL for {node}")));
        }
        let sql = self
            .sql
            .get(node)
            .cloned()
            .unwrap_or_else(|| format!("SELECT * FROM {node}"));
        Ok(SqlResponse {
            sql,
            notes: String::new(),
        })
    }

    fn summarize_result(&mut self, request: &ResultAnalyzerRequest<'_>) -> Result<AnalyzerResponse> {
        self.record(request.node_id)?;
        self.summarized_sql
            .lock()
            .unwrap()
            .push((request.node_id.to_string(), request.sql.to_string()));
        Ok(self.answer(request.node_id, request.produces))
    }
}

/// A fake relational engine that:
/// - records every statement it receives
/// - returns a one-column table for reads and one affected row for writes
/// - fails statements containing a registered marker
#[derive(Debug, Clone)]
pub struct FakeSqlEngine {
    table: TabularResult,
    failures: Vec<(String, String)>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl Default for FakeSqlEngine {
    fn default() -> Self {
        Self {
            table: TabularResult {
                columns: vec!["value".to_string()],
                rows: vec![vec![Value::from(1)]],
            },
            failures: Vec::new(),
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeSqlEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executed(mut self, executed: Arc<Mutex<Vec<String>>>) -> Self {
        self.executed = executed;
        self
    }

    pub fn with_table(mut self, table: TabularResult) -> Self {
        self.table = table;
        self
    }

    /// Statements containing `marker` fail with `message`.
    pub fn fail_on(mut self, marker: &str, message: &str) -> Self {
        self.failures.push((marker.to_string(), message.to_string()));
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl SqlEngine for FakeSqlEngine {
    fn execute(&mut self, sql: &str) -> Result<SqlOutcome> {
        self.executed.lock().unwrap().push(sql.to_string());

        if let Some((_, message)) = self.failures.iter().find(|(m, _)| sql.contains(m.as_str())) {
            return Err(SqldagError::Database(message.clone()));
        }

        Ok(match StatementKind::classify(sql) {
            StatementKind::Read => SqlOutcome::Rows(self.table.clone()),
            StatementKind::Write => SqlOutcome::Affected(1),
        })
    }
}
