// src/exec/scripted.rs

//! Fixture-driven collaborator.
//!
//! Replays a recorded planning/reasoning session from a JSON script so a
//! plan can be executed end-to-end against a real database without a live
//! reasoning service:
//!
//! ```json
//! {
//!   "process": ["[SQL] count open orders", "[ANALYZE] summarise"],
//!   "plan": { "version": "1.0", "nodes": [...], "edges": "n1>n2" },
//!   "nodes": {
//!     "n1": { "sql": "SELECT count(*) AS open FROM orders", "notes": "" },
//!     "n2": { "status": "ok", "outputs": "{\"summary_1\": \"3 open\"}" }
//!   }
//! }
//! ```
//!
//! Node responses are keyed by node id and decoded into the contract the
//! node's type calls for.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SqldagError};
use crate::exec::backend::{
    AnalyzerRequest, AnalyzerResponse, PlanRequest, Planner, ProcessRequest, Reasoner,
    ResultAnalyzerRequest, SqlRequest, SqlResponse,
};
use crate::fs::FileSystem;
use crate::plan::{NodeId, RawPlanDocument};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub process: Vec<String>,

    #[serde(default)]
    pub plan: Option<RawPlanDocument>,

    #[serde(default)]
    pub nodes: HashMap<NodeId, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedReasoner {
    script: Script,
}

impl ScriptedReasoner {
    pub fn new(script: Script) -> Self {
        Self { script }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(text)?;
        Ok(Self::new(script))
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let text = fs.read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn has_plan(&self) -> bool {
        self.script.plan.is_some()
    }

    fn response_for<T: DeserializeOwned>(&self, node_id: &str) -> Result<T> {
        let raw = self.script.nodes.get(node_id).ok_or_else(|| {
            SqldagError::Collaborator(format!("no scripted response for node '{node_id}'"))
        })?;

        debug!(node = %node_id, "replaying scripted response");

        serde_json::from_value(raw.clone()).map_err(|e| {
            SqldagError::Collaborator(format!(
                "scripted response for node '{node_id}' does not match its contract: {e}"
            ))
        })
    }
}

impl Planner for ScriptedReasoner {
    fn analyze_process(&mut self, _request: &ProcessRequest<'_>) -> Result<Vec<String>> {
        Ok(self.script.process.clone())
    }

    fn plan(&mut self, _request: &PlanRequest<'_>) -> Result<RawPlanDocument> {
        self.script
            .plan
            .clone()
            .ok_or_else(|| SqldagError::Collaborator("script contains no plan".to_string()))
    }
}

impl Reasoner for ScriptedReasoner {
    fn analyze(&mut self, request: &AnalyzerRequest<'_>) -> Result<AnalyzerResponse> {
        self.response_for(request.node_id)
    }

    fn generate_sql(&mut self, request: &SqlRequest<'_>) -> Result<SqlResponse> {
        self.response_for(request.node.node_id)
    }

    fn summarize_result(&mut self, request: &ResultAnalyzerRequest<'_>) -> Result<AnalyzerResponse> {
        self.response_for(request.node_id)
    }
}
