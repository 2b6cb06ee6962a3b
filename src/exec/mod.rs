// src/exec/mod.rs

//! Node execution layer.
//!
//! This module runs one plan node at a time and reports a well-formed
//! [`NodeOutput`] back to the scheduler, whatever happened underneath.
//!
//! - [`backend`] defines the collaborator traits (`Planner`, `Reasoner`,
//!   `SqlEngine`) and their request/response contracts.
//! - [`node_runner`] dispatches a node by type and classifies the outcome.
//! - [`outputs`] holds the result record and lenient output decoding.
//! - [`sqlite`] is the SQLite relational engine.
//! - [`scripted`] replays recorded collaborator responses from a file.

pub mod backend;
pub mod node_runner;
pub mod outputs;
pub mod scripted;
pub mod sqlite;

pub use backend::{
    AnalyzerRequest, AnalyzerResponse, PlanRequest, Planner, ProcessRequest, Reasoner,
    RequestContext, ResultAnalyzerRequest, SqlEngine, SqlOutcome, SqlRequest, SqlResponse,
};
pub use node_runner::{ExecutionInputs, NodeExecutor};
pub use outputs::{decode_outputs, ExecStats, NodeOutput, OutputStatus};
pub use scripted::{Script, ScriptedReasoner};
pub use sqlite::{recreate_database, SqliteEngine};
