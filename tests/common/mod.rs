#![allow(dead_code)]

use std::collections::BTreeMap;

use sqldag::artifacts::{ArtifactStore, ArtifactValue};
use sqldag::exec::{ExecutionInputs, RequestContext};

pub use sqldag_test_utils::builders;
pub use sqldag_test_utils::fakes;
pub use sqldag_test_utils::init_tracing;

/// A request context with only the user request filled in.
pub fn request(text: &str) -> RequestContext {
    RequestContext {
        user_request: text.to_string(),
        ..RequestContext::default()
    }
}

/// Owned backing storage for [`ExecutionInputs`] in executor tests.
pub struct InputsFixture {
    pub artifacts: BTreeMap<String, ArtifactValue>,
    pub context: RequestContext,
    pub statement_log: Vec<String>,
}

impl InputsFixture {
    pub fn new() -> Self {
        Self {
            artifacts: BTreeMap::new(),
            context: request("test request"),
            statement_log: Vec::new(),
        }
    }

    pub fn with_artifact(mut self, name: &str, value: impl Into<ArtifactValue>) -> Self {
        self.artifacts.insert(name.to_string(), value.into());
        self
    }

    pub fn with_statement(mut self, sql: &str) -> Self {
        self.statement_log.push(sql.to_string());
        self
    }

    pub fn inputs(&self) -> ExecutionInputs<'_> {
        ExecutionInputs {
            artifacts: &self.artifacts,
            context: &self.context,
            statement_log: &self.statement_log,
        }
    }
}

/// Store seeded with the given names, each holding `true`.
pub fn store_with(names: &[&str]) -> ArtifactStore {
    let mut store = ArtifactStore::new();
    for name in names {
        store.insert(*name, ArtifactValue::Json(serde_json::Value::Bool(true)));
    }
    store
}
