// src/plan/mod.rs

//! Plan documents.
//!
//! - [`model`] holds the validated, immutable plan types.
//! - [`document`] parses the loose document shape planners emit.
//! - [`validate`] checks structural invariants (unique ids, known edge ends)
//!   and reports cycles.
//! - [`loader`] reads a plan document from disk.

pub mod document;
pub mod loader;
pub mod model;
pub mod validate;

pub use document::{parse_edges, parse_name_list, parse_plan_document, RawPlanDocument};
pub use loader::load_plan;
pub use model::{Edge, NodeId, NodeSpec, Plan};
