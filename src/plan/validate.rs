// src/plan/validate.rs

use std::collections::HashSet;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::warn;

use crate::errors::{Result, SqldagError};
use crate::plan::model::{Edge, NodeSpec};

pub(crate) fn validate_plan_parts(nodes: &[NodeSpec], edges: &[Edge]) -> Result<()> {
    ensure_node_ids(nodes)?;
    validate_edges(nodes, edges)?;
    if let Some(node) = find_cycle(nodes, edges) {
        // Not an error: a cyclic plan is accepted and stalls at run time.
        warn!(
            node = %node,
            "plan contains a cycle; the nodes on it will never become runnable"
        );
    }
    Ok(())
}

fn ensure_node_ids(nodes: &[NodeSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for node in nodes {
        if node.id.is_empty() {
            return Err(SqldagError::PlanError(
                "node with an empty id in plan".to_string(),
            ));
        }
        if !seen.insert(node.id.as_str()) {
            return Err(SqldagError::DuplicateNode(node.id.clone()));
        }
    }
    Ok(())
}

fn validate_edges(nodes: &[NodeSpec], edges: &[Edge]) -> Result<()> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in edges {
        for end in [&edge.source, &edge.destination] {
            if !ids.contains(end.as_str()) {
                return Err(SqldagError::UnknownEdgeNode {
                    source_id: edge.source.clone(),
                    destination: edge.destination.clone(),
                    missing: end.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Return a node on a cycle, if the precedence graph has one.
pub fn find_cycle(nodes: &[NodeSpec], edges: &[Edge]) -> Option<String> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for node in nodes {
        graph.add_node(node.id.as_str());
    }
    for edge in edges {
        graph.add_edge(edge.source.as_str(), edge.destination.as_str(), ());
    }

    match toposort(&graph, None) {
        Ok(_order) => None,
        Err(cycle) => Some(cycle.node_id().to_string()),
    }
}
