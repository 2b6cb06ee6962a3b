// src/exec/backend.rs

//! Collaborator abstractions used by the node executor.
//!
//! The scheduler never decides *what* a node produces. That is delegated to:
//! - a [`Planner`] that turns a request into process steps and a plan,
//! - a [`Reasoner`] that answers the per-node contracts (`SQL`, `ANALYZER`,
//!   `SQL_RESULT_ANALYZER`),
//! - a [`SqlEngine`] that runs SQL text against a database.
//!
//! All calls are blocking; the scheduler waits for each one before moving
//! on. Production wiring uses [`crate::exec::ScriptedReasoner`] and
//! [`crate::exec::SqliteEngine`]; tests substitute their own fakes.

use serde::{Deserialize, Serialize};

use crate::artifacts::TabularResult;
use crate::errors::Result;
use crate::plan::RawPlanDocument;

/// Request-level context forwarded to every collaborator call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_request: String,
    pub general_context: String,
    pub schema_snapshot: String,
    pub example_queries: String,
}

#[derive(Debug, Clone)]
pub struct ProcessRequest<'a> {
    pub user_request: &'a str,
    pub general_context: &'a str,
    pub schema_snapshot: &'a str,
}

#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub user_request: &'a str,
    pub process: &'a [String],
    pub general_context: &'a str,
    pub schema_snapshot: &'a str,
}

/// Input of the `ANALYZER` contract.
#[derive(Debug, Clone)]
pub struct AnalyzerRequest<'a> {
    pub node_id: &'a str,
    pub user_request: &'a str,
    pub requires: &'a [String],
    pub produces: &'a [String],
    pub instruction: &'a str,
    pub general_context: &'a str,
    pub schema_snapshot: &'a str,
    /// JSON object of the currently available required artifacts.
    pub artifacts_json: String,
}

/// Input of the `SQL` contract: the analyzer fields plus example statements.
#[derive(Debug, Clone)]
pub struct SqlRequest<'a> {
    pub node: AnalyzerRequest<'a>,
    pub example_queries: &'a str,
}

/// Input of the `SQL_RESULT_ANALYZER` contract.
#[derive(Debug, Clone)]
pub struct ResultAnalyzerRequest<'a> {
    pub node_id: &'a str,
    pub user_request: &'a str,
    /// Statement that most likely produced `table`.
    pub sql: &'a str,
    pub table: &'a TabularResult,
    pub instruction: &'a str,
    pub produces: &'a [String],
}

/// Output of the `ANALYZER` and `SQL_RESULT_ANALYZER` contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResponse {
    /// `"ok"` means success; anything else is a failure.
    pub status: String,
    /// JSON-encoded object of artifact name to value.
    #[serde(default)]
    pub outputs: String,
    #[serde(default)]
    pub notes: String,
}

impl AnalyzerResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Output of the `SQL` contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlResponse {
    pub sql: String,
    #[serde(default)]
    pub notes: String,
}

/// Result shape of one statement on the relational engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlOutcome {
    /// A read statement: captured columns and rows.
    Rows(TabularResult),
    /// A write statement: the engine's affected-row count.
    Affected(usize),
}

impl SqlOutcome {
    pub fn rows_affected(&self) -> usize {
        match self {
            SqlOutcome::Rows(table) => table.row_count(),
            SqlOutcome::Affected(n) => *n,
        }
    }
}

/// Planning collaborator: request -> process steps -> plan document.
pub trait Planner {
    fn analyze_process(&mut self, request: &ProcessRequest<'_>) -> Result<Vec<String>>;

    fn plan(&mut self, request: &PlanRequest<'_>) -> Result<RawPlanDocument>;
}

/// Reasoning collaborator answering the per-node contracts.
pub trait Reasoner {
    fn analyze(&mut self, request: &AnalyzerRequest<'_>) -> Result<AnalyzerResponse>;

    fn generate_sql(&mut self, request: &SqlRequest<'_>) -> Result<SqlResponse>;

    fn summarize_result(&mut self, request: &ResultAnalyzerRequest<'_>) -> Result<AnalyzerResponse>;
}

/// Relational engine running one statement at a time.
pub trait SqlEngine {
    fn execute(&mut self, sql: &str) -> Result<SqlOutcome>;
}
