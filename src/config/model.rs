// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::DEFAULT_MAX_ATTEMPTS;

/// Configuration as read from `Sqldag.toml`, before validation.
///
/// ```toml
/// [run]
/// max_attempts = 20
/// snapshot_dir = "output"
///
/// [database]
/// path = "data/logistics.db"
/// schema = "data/db.sql"
///
/// [context]
/// general_context = "data/description.txt"
/// examples = "data/examples.sql"
/// ```
///
/// Every section is optional. Command-line flags are merged into this
/// value before it is validated into a [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub database: RawDatabaseSection,

    #[serde(default)]
    pub context: ContextSection,
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Total node attempts allowed in one run.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Directory for `process.json`, `plan.json` and `final_state.json`.
    /// Snapshots are skipped when unset.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            snapshot_dir: None,
        }
    }
}

/// `[database]` section as written in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDatabaseSection {
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// DDL script; when set the database file is recreated from it.
    #[serde(default)]
    pub schema: Option<PathBuf>,
}

/// `[database]` section once a path is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSection {
    pub path: PathBuf,
    pub schema: Option<PathBuf>,
}

/// `[context]` section: side files forwarded to collaborators.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ContextSection {
    /// Free-text description of the domain.
    #[serde(default)]
    pub general_context: Option<PathBuf>,

    /// Example SQL statements shown to the SQL generator.
    #[serde(default)]
    pub examples: Option<PathBuf>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub run: RunSection,
    pub database: DatabaseSection,
    pub context: ContextSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        run: RunSection,
        database: DatabaseSection,
        context: ContextSection,
    ) -> Self {
        Self {
            run,
            database,
            context,
        }
    }
}
