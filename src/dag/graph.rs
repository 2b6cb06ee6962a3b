// src/dag/graph.rs

use std::collections::HashMap;

use crate::plan::model::{Edge, NodeId, NodeSpec};

/// Internal node structure: stores immediate predecessors and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Sources of incoming edges: nodes that must succeed before this one.
    predecessors: Vec<NodeId>,
    /// Destinations of outgoing edges.
    dependents: Vec<NodeId>,
}

/// Adjacency view of a plan's precedence edges, keyed by node id.
///
/// Acyclicity is not assumed here; a cycle simply means some nodes never
/// see all their predecessors succeed.
#[derive(Debug, Clone, Default)]
pub struct PlanGraph {
    nodes: HashMap<NodeId, DagNode>,
}

impl PlanGraph {
    pub fn new(nodes: &[NodeSpec], edges: &[Edge]) -> Self {
        let mut map: HashMap<NodeId, DagNode> = nodes
            .iter()
            .map(|n| (n.id.clone(), DagNode::default()))
            .collect();

        for edge in edges {
            let dst = map.entry(edge.destination.clone()).or_default();
            if !dst.predecessors.contains(&edge.source) {
                dst.predecessors.push(edge.source.clone());
            }
            let src = map.entry(edge.source.clone()).or_default();
            if !src.dependents.contains(&edge.destination) {
                src.dependents.push(edge.destination.clone());
            }
        }

        Self { nodes: map }
    }

    /// Immediate predecessors of a node (sources of its incoming edges).
    pub fn predecessors_of(&self, id: &str) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.predecessors.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a node (destinations of its outgoing edges).
    pub fn dependents_of(&self, id: &str) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// All nodes reachable from `id` through outgoing edges, excluding `id`
    /// itself unless it sits on a cycle.
    pub fn downstream_of(&self, id: &str) -> Vec<NodeId> {
        let mut stack: Vec<NodeId> = self.dependents_of(id).to_vec();
        let mut seen: Vec<NodeId> = Vec::new();

        while let Some(name) = stack.pop() {
            if seen.contains(&name) {
                continue;
            }
            stack.extend(self.dependents_of(&name).iter().cloned());
            seen.push(name);
        }

        seen
    }
}
