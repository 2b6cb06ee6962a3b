// src/dag/mod.rs

//! Plan graph, node status and readiness.
//!
//! - [`graph`] holds the precedence adjacency of a plan.
//! - [`status`] contains the per-node state machine and the status table.
//! - [`readiness`] decides which pending nodes are currently runnable.

pub mod graph;
pub mod readiness;
pub mod status;

pub use graph::PlanGraph;
pub use readiness::{runnable_nodes, Readiness};
pub use status::{NodeState, NodeStatus, NodeStatusTable};
