// src/exec/node_runner.rs

//! Single-node execution.
//!
//! [`NodeExecutor::execute`] dispatches on the node type, talks to the
//! collaborators and classifies the outcome. It never returns an error:
//! collaborator and engine failures are folded into a failed [`NodeOutput`].

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::artifacts::{ArtifactName, ArtifactValue};
use crate::errors::SqldagError;
use crate::exec::backend::{
    AnalyzerRequest, AnalyzerResponse, Reasoner, RequestContext, ResultAnalyzerRequest,
    SqlEngine, SqlOutcome, SqlRequest,
};
use crate::exec::outputs::{decode_outputs, ExecStats, NodeOutput, OutputStatus};
use crate::plan::model::NodeSpec;
use crate::types::NodeType;

const UNKNOWN_SQL: &str = "Unknown (query artifact not found)";

/// Everything a node may see besides its own spec.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionInputs<'a> {
    /// Current values of the node's `requires` artifacts.
    pub artifacts: &'a BTreeMap<ArtifactName, ArtifactValue>,
    pub context: &'a RequestContext,
    /// SQL statements issued so far in this run, oldest first.
    pub statement_log: &'a [String],
}

/// Dispatches nodes to the reasoning collaborator and the SQL engine.
#[derive(Debug)]
pub struct NodeExecutor<R, E> {
    reasoner: R,
    engine: E,
}

impl<R: Reasoner, E: SqlEngine> NodeExecutor<R, E> {
    pub fn new(reasoner: R, engine: E) -> Self {
        Self { reasoner, engine }
    }

    pub fn reasoner(&self) -> &R {
        &self.reasoner
    }

    pub fn reasoner_mut(&mut self) -> &mut R {
        &mut self.reasoner
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_parts(self) -> (R, E) {
        (self.reasoner, self.engine)
    }

    /// Execute one node and classify the outcome.
    pub fn execute(&mut self, node: &NodeSpec, inputs: &ExecutionInputs<'_>) -> NodeOutput {
        info!(node = %node.id, node_type = %node.node_type, label = %node.label, "executing node");

        let output = match &node.node_type {
            NodeType::Sql => self.run_sql(node, inputs),
            NodeType::Analyzer => self.run_analyzer(node, inputs),
            NodeType::SqlResultAnalyzer => self.run_result_analyzer(node, inputs),
            NodeType::Unrecognized(tag) => NodeOutput::fail(format!("Unknown node type: {tag}")),
        };

        match output.status {
            OutputStatus::Ok => info!(
                node = %node.id,
                artifacts = ?output.artifacts.keys().collect::<Vec<_>>(),
                "node execution ok"
            ),
            OutputStatus::Fail => warn!(
                node = %node.id,
                error = output.error.as_deref().unwrap_or(""),
                "node execution failed"
            ),
        }

        output
    }

    fn run_sql(&mut self, node: &NodeSpec, inputs: &ExecutionInputs<'_>) -> NodeOutput {
        let request = SqlRequest {
            node: analyzer_request(node, inputs),
            example_queries: &inputs.context.example_queries,
        };

        let response = match self.reasoner.generate_sql(&request) {
            Ok(resp) => resp,
            Err(err) => return NodeOutput::fail(failure_message(&err)),
        };
        let sql = response.sql;

        debug!(node = %node.id, sql = %sql, "running generated statement");

        let started = Instant::now();
        let result = self.engine.execute(&sql);
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut artifacts = BTreeMap::new();
        if let Some(key) = first_with_prefix(&node.produces, "sql") {
            artifacts.insert(key.clone(), ArtifactValue::Json(Value::String(sql.clone())));
        }

        match result {
            Ok(outcome) => {
                let rows_affected = outcome.rows_affected();
                if let (Some(key), SqlOutcome::Rows(table)) =
                    (first_with_prefix(&node.produces, "result"), outcome)
                {
                    artifacts.insert(key.clone(), ArtifactValue::Table(table));
                }

                NodeOutput {
                    status: OutputStatus::Ok,
                    artifacts,
                    notes: response.notes,
                    error: None,
                    stats: Some(ExecStats {
                        elapsed_ms,
                        rows_affected,
                    }),
                    statement: Some(sql),
                }
            }
            Err(err) => NodeOutput {
                status: OutputStatus::Fail,
                artifacts,
                notes: response.notes,
                error: Some(failure_message(&err)),
                stats: None,
                statement: Some(sql),
            },
        }
    }

    fn run_analyzer(&mut self, node: &NodeSpec, inputs: &ExecutionInputs<'_>) -> NodeOutput {
        let request = analyzer_request(node, inputs);

        match self.reasoner.analyze(&request) {
            Ok(resp) => {
                let error = format!("Analyzer failed with status: {}", resp.status);
                from_analyzer_response(node, resp, error)
            }
            Err(err) => NodeOutput::fail(failure_message(&err)),
        }
    }

    fn run_result_analyzer(&mut self, node: &NodeSpec, inputs: &ExecutionInputs<'_>) -> NodeOutput {
        let Some(result_key) = node.requires.iter().find(|r| r.starts_with("result")) else {
            return NodeOutput::fail(
                "SQL_RESULT_ANALYZER requires a 'result*' artifact, but none was found.",
            );
        };

        let table = match inputs.artifacts.get(result_key) {
            Some(ArtifactValue::Table(table)) => table,
            Some(ArtifactValue::Json(_)) => {
                return NodeOutput::fail(format!(
                    "artifact '{result_key}' does not hold a tabular result"
                ));
            }
            None => {
                return NodeOutput::fail(format!(
                    "required artifact '{result_key}' is not available"
                ));
            }
        };

        let sql = originating_sql(inputs.statement_log);
        let request = ResultAnalyzerRequest {
            node_id: &node.id,
            user_request: &inputs.context.user_request,
            sql,
            table,
            instruction: &node.input,
            produces: &node.produces,
        };

        match self.reasoner.summarize_result(&request) {
            Ok(resp) => from_analyzer_response(node, resp, "Result summarization failed.".to_string()),
            Err(err) => NodeOutput::fail(failure_message(&err)),
        }
    }
}

fn analyzer_request<'a>(node: &'a NodeSpec, inputs: &ExecutionInputs<'a>) -> AnalyzerRequest<'a> {
    AnalyzerRequest {
        node_id: &node.id,
        user_request: &inputs.context.user_request,
        requires: &node.requires,
        produces: &node.produces,
        instruction: &node.input,
        general_context: &inputs.context.general_context,
        schema_snapshot: &inputs.context.schema_snapshot,
        artifacts_json: artifacts_json(inputs.artifacts),
    }
}

fn artifacts_json(artifacts: &BTreeMap<ArtifactName, ArtifactValue>) -> String {
    let map: serde_json::Map<String, Value> = artifacts
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_else(|_| "{}".to_string())
}

fn from_analyzer_response(node: &NodeSpec, resp: AnalyzerResponse, error: String) -> NodeOutput {
    let artifacts = decode_outputs(&node.id, &resp.outputs);
    if resp.is_ok() {
        return NodeOutput::ok(artifacts, resp.notes);
    }

    NodeOutput {
        artifacts,
        notes: resp.notes,
        ..NodeOutput::fail(error)
    }
}

/// First declared output whose name starts with `prefix`, ignoring case.
fn first_with_prefix<'a>(produces: &'a [String], prefix: &str) -> Option<&'a String> {
    produces
        .iter()
        .find(|p| p.to_lowercase().starts_with(prefix))
}

/// Best-effort guess at the statement behind a result table: the most
/// recent logged statement mentioning `SELECT`.
fn originating_sql(statement_log: &[String]) -> &str {
    statement_log
        .iter()
        .rev()
        .find(|q| q.to_uppercase().contains("SELECT"))
        .map(String::as_str)
        .unwrap_or(UNKNOWN_SQL)
}

fn failure_message(err: &SqldagError) -> String {
    match err {
        SqldagError::Database(msg) | SqldagError::Collaborator(msg) => msg.clone(),
        other => other.to_string(),
    }
}
