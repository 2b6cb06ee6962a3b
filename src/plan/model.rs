// src/plan/model.rs

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactName;
use crate::dag::PlanGraph;
use crate::types::NodeType;

/// Canonical node id type used throughout the scheduler.
pub type NodeId = String;

/// One unit of work in a plan.
///
/// Specs are created once when the plan is loaded and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default)]
    pub label: String,

    /// Artifacts that must exist in the store before this node may run.
    #[serde(default)]
    pub requires: Vec<ArtifactName>,

    /// Artifacts this node is expected to write. Taken on faith: nothing
    /// checks that a succeeded node actually wrote them.
    #[serde(default)]
    pub produces: Vec<ArtifactName>,

    /// Free-text instruction forwarded verbatim to the collaborator.
    #[serde(default)]
    pub input: String,
}

/// Precedence edge: `destination` may not run until `source` succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub destination: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, destination: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// A validated plan: node specs in declaration order plus precedence edges.
///
/// Construct through [`Plan::new`] or `Plan::try_from(RawPlanDocument)`,
/// both of which reject duplicate ids and edges naming unknown nodes.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    version: String,
    nodes: Vec<NodeSpec>,
    edges: Vec<Edge>,
    #[serde(skip)]
    graph: PlanGraph,
}

impl Plan {
    /// Build a plan from already-parsed parts, running structural validation.
    pub fn new(
        version: impl Into<String>,
        nodes: Vec<NodeSpec>,
        edges: Vec<Edge>,
    ) -> crate::errors::Result<Self> {
        crate::plan::validate::validate_plan_parts(&nodes, &edges)?;
        Ok(Self::new_unchecked(version.into(), nodes, edges))
    }

    pub(crate) fn new_unchecked(version: String, nodes: Vec<NodeSpec>, edges: Vec<Edge>) -> Self {
        let graph = PlanGraph::new(&nodes, &edges);
        Self {
            version,
            nodes,
            edges,
            graph,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Node specs in declaration order.
    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn graph(&self) -> &PlanGraph {
        &self.graph
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
