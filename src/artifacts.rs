// src/artifacts.rs

//! Shared artifact store.
//!
//! Artifacts are the only channel between nodes: a node may read an
//! artifact once some earlier node has written it. Entries can be
//! overwritten by later writes but are never removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Canonical artifact name type.
pub type ArtifactName = String;

/// Columns and rows captured from a read statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TabularResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Value held under an artifact name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactValue {
    Table(TabularResult),
    Json(Value),
}

impl ArtifactValue {
    /// Wrap a decoded JSON value, recognising `{columns, rows}` objects as
    /// tables so that collaborator-produced tables behave like engine ones.
    pub fn from_json(value: Value) -> Self {
        if let Value::Object(map) = &value {
            if map.len() == 2 && map.contains_key("columns") && map.contains_key("rows") {
                if let Ok(table) = serde_json::from_value::<TabularResult>(value.clone()) {
                    return ArtifactValue::Table(table);
                }
            }
        }
        ArtifactValue::Json(value)
    }

    pub fn as_table(&self) -> Option<&TabularResult> {
        match self {
            ArtifactValue::Table(t) => Some(t),
            ArtifactValue::Json(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ArtifactValue::Table(t) => serde_json::json!({
                "columns": t.columns,
                "rows": t.rows,
            }),
            ArtifactValue::Json(v) => v.clone(),
        }
    }
}

impl From<TabularResult> for ArtifactValue {
    fn from(table: TabularResult) -> Self {
        ArtifactValue::Table(table)
    }
}

impl From<Value> for ArtifactValue {
    fn from(value: Value) -> Self {
        ArtifactValue::from_json(value)
    }
}

/// Mapping from artifact name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactStore {
    entries: BTreeMap<ArtifactName, ArtifactValue>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ArtifactValue> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArtifactValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, name: impl Into<ArtifactName>, value: ArtifactValue) {
        let name = name.into();
        if self.entries.insert(name.clone(), value).is_some() {
            debug!(artifact = %name, "artifact overwritten");
        }
    }

    /// Merge a node's produced artifacts. On a name collision the incoming
    /// value wins.
    pub fn merge(&mut self, produced: &BTreeMap<ArtifactName, ArtifactValue>) {
        for (name, value) in produced {
            self.insert(name.clone(), value.clone());
        }
    }

    /// Current values for the given names. Names not yet written are
    /// skipped.
    pub fn select<'a, I>(&self, names: I) -> BTreeMap<ArtifactName, ArtifactValue>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .filter_map(|name| self.entries.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }
}
