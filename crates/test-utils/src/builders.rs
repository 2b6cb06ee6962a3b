#![allow(dead_code)]

use sqldag::errors::Result;
use sqldag::plan::{Edge, NodeSpec, Plan};
use sqldag::types::NodeType;

/// Builder for `Plan` to simplify test setup.
pub struct PlanBuilder {
    version: String,
    nodes: Vec<NodeSpec>,
    edges: Vec<Edge>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn node(mut self, node: impl Into<NodeSpec>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn edge(mut self, source: &str, destination: &str) -> Self {
        self.edges.push(Edge::new(source, destination));
        self
    }

    pub fn try_build(self) -> Result<Plan> {
        Plan::new(self.version, self.nodes, self.edges)
    }

    pub fn build(self) -> Plan {
        self.try_build().expect("Failed to build valid plan from builder")
    }
}

impl Default for PlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `NodeSpec`.
pub struct NodeSpecBuilder {
    node: NodeSpec,
}

impl NodeSpecBuilder {
    pub fn new(id: &str, node_type: NodeType) -> Self {
        Self {
            node: NodeSpec {
                id: id.to_string(),
                node_type,
                label: format!("{id} step"),
                requires: vec![],
                produces: vec![],
                input: String::new(),
            },
        }
    }

    pub fn sql(id: &str) -> Self {
        Self::new(id, NodeType::Sql)
    }

    pub fn analyzer(id: &str) -> Self {
        Self::new(id, NodeType::Analyzer)
    }

    pub fn result_analyzer(id: &str) -> Self {
        Self::new(id, NodeType::SqlResultAnalyzer)
    }

    pub fn requires(mut self, name: &str) -> Self {
        self.node.requires.push(name.to_string());
        self
    }

    pub fn produces(mut self, name: &str) -> Self {
        self.node.produces.push(name.to_string());
        self
    }

    pub fn input(mut self, instruction: &str) -> Self {
        self.node.input = instruction.to_string();
        self
    }

    pub fn build(self) -> NodeSpec {
        self.node
    }
}

impl From<NodeSpecBuilder> for NodeSpec {
    fn from(builder: NodeSpecBuilder) -> Self {
        builder.build()
    }
}
