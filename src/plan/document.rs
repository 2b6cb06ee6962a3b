// src/plan/document.rs

//! Raw plan document as emitted by a planner.
//!
//! Planners are loose about encoding, so the raw shape accepts:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "nodes": "[{\"id\": \"n1\", \"type\": \"SQL\", \"requires\": \"\", \"produces\": \"sql_1,result_1\"}]",
//!   "edges": "n1>n2,n2>n3"
//! }
//! ```
//!
//! `nodes` may be an array or a string holding the JSON array;
//! `requires` / `produces` may be comma-separated strings or arrays;
//! `edges` may be an arrow-encoded string or a list of `[src, dst]` pairs.
//! Everything is normalised once, here, into [`Plan`].

use serde::Deserialize;

use crate::errors::{Result, SqldagError};
use crate::plan::model::{Edge, NodeSpec, Plan};
use crate::types::NodeType;

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanDocument {
    #[serde(default)]
    pub version: String,

    pub nodes: RawNodes,

    #[serde(default)]
    pub edges: RawEdges,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNodes {
    List(Vec<RawNodeSpec>),
    Encoded(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEdges {
    Encoded(String),
    Pairs(Vec<(String, String)>),
}

impl Default for RawEdges {
    fn default() -> Self {
        RawEdges::Encoded(String::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NameList {
    Csv(String),
    List(Vec<String>),
}

impl Default for NameList {
    fn default() -> Self {
        NameList::Csv(String::new())
    }
}

impl NameList {
    fn into_names(self) -> Vec<String> {
        match self {
            NameList::Csv(s) => parse_name_list(&s),
            NameList::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawNodeSpec {
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub requires: NameList,

    #[serde(default)]
    pub produces: NameList,

    #[serde(default)]
    pub input: String,
}

impl From<RawNodeSpec> for NodeSpec {
    fn from(raw: RawNodeSpec) -> Self {
        NodeSpec {
            id: raw.id.trim().to_string(),
            node_type: NodeType::from(raw.node_type),
            label: raw.label,
            requires: raw.requires.into_names(),
            produces: raw.produces.into_names(),
            input: raw.input,
        }
    }
}

impl TryFrom<RawPlanDocument> for Plan {
    type Error = SqldagError;

    fn try_from(raw: RawPlanDocument) -> std::result::Result<Self, Self::Error> {
        let raw_nodes = match raw.nodes {
            RawNodes::List(nodes) => nodes,
            RawNodes::Encoded(text) => serde_json::from_str::<Vec<RawNodeSpec>>(&text)
                .map_err(|e| {
                    SqldagError::PlanError(format!("planner returned invalid JSON for nodes: {e}"))
                })?,
        };

        let nodes: Vec<NodeSpec> = raw_nodes.into_iter().map(NodeSpec::from).collect();

        let edges = match raw.edges {
            RawEdges::Encoded(text) => parse_edges(&text),
            RawEdges::Pairs(pairs) => pairs
                .into_iter()
                .map(|(src, dst)| Edge::new(src.trim(), dst.trim()))
                .collect(),
        };

        Plan::new(raw.version, nodes, edges)
    }
}

/// Parse a plan document from JSON text.
pub fn parse_plan_document(text: &str) -> Result<Plan> {
    let raw: RawPlanDocument = serde_json::from_str(text)
        .map_err(|e| SqldagError::PlanError(format!("invalid plan document: {e}")))?;
    Plan::try_from(raw)
}

/// Split a comma-separated name list, trimming and dropping empty entries.
pub fn parse_name_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `"a>b, b>c"` into edges. Parts without an arrow are skipped; only
/// the first `>` in a part separates source from destination.
pub fn parse_edges(encoded: &str) -> Vec<Edge> {
    encoded
        .split(',')
        .filter_map(|part| {
            let (src, dst) = part.split_once('>')?;
            Some(Edge::new(src.trim(), dst.trim()))
        })
        .collect()
}
