// src/exec/outputs.rs

//! Node execution results and lenient decoding of collaborator outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::artifacts::{ArtifactName, ArtifactValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    Ok,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStats {
    pub elapsed_ms: u64,
    pub rows_affected: usize,
}

/// Result record of one node execution. Always well-formed: every failure
/// below the executor boundary ends up in `status` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOutput {
    pub status: OutputStatus,
    #[serde(default)]
    pub artifacts: BTreeMap<ArtifactName, ArtifactValue>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ExecStats>,
    /// SQL text issued by this execution, if any, for the statement log.
    #[serde(skip)]
    pub statement: Option<String>,
}

impl NodeOutput {
    pub fn ok(artifacts: BTreeMap<ArtifactName, ArtifactValue>, notes: impl Into<String>) -> Self {
        Self {
            status: OutputStatus::Ok,
            artifacts,
            notes: notes.into(),
            error: None,
            stats: None,
            statement: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            status: OutputStatus::Fail,
            artifacts: BTreeMap::new(),
            notes: String::new(),
            error: Some(error.into()),
            stats: None,
            statement: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OutputStatus::Ok
    }
}

/// Decode a collaborator's JSON `outputs` string into artifacts.
///
/// Invalid JSON, or JSON that is not an object, yields no artifacts. The
/// collaborator's own status still decides success.
pub fn decode_outputs(node_id: &str, raw: &str) -> BTreeMap<ArtifactName, ArtifactValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return BTreeMap::new();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .map(|(name, value)| (name, ArtifactValue::from_json(value)))
            .collect(),
        Ok(other) => {
            warn!(
                node = %node_id,
                kind = json_kind(&other),
                "collaborator outputs are not a JSON object; no artifacts produced"
            );
            BTreeMap::new()
        }
        Err(err) => {
            warn!(
                node = %node_id,
                error = %err,
                "collaborator outputs are not valid JSON; no artifacts produced"
            );
            BTreeMap::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
