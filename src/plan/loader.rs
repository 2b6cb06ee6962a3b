// src/plan/loader.rs

use std::path::Path;

use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::plan::document::parse_plan_document;
use crate::plan::model::Plan;

/// Load and validate a plan document from a JSON file.
pub fn load_plan(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<Plan> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;
    let plan = parse_plan_document(&contents)?;

    debug!(
        path = %path.display(),
        version = plan.version(),
        nodes = plan.nodes().len(),
        edges = plan.edges().len(),
        "plan loaded"
    );

    Ok(plan)
}
