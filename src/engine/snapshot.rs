// src/engine/snapshot.rs

//! Write-only debugging snapshots (`process.json`, `plan.json`,
//! `final_state.json`). Nothing reads them back, and a failed write never
//! affects the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::fs::FileSystem;

pub const PROCESS_SNAPSHOT: &str = "process.json";
pub const PLAN_SNAPSHOT: &str = "plan.json";
pub const FINAL_STATE_SNAPSHOT: &str = "final_state.json";

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `value` as pretty JSON into `<dir>/<name>`.
    ///
    /// Returns whether the snapshot was written.
    pub fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> bool {
        let path = self.dir.join(name);

        let bytes = match serde_json::to_vec_pretty(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(snapshot = %path.display(), error = %err, "could not serialize snapshot");
                return false;
            }
        };

        match self.fs.write(&path, &bytes) {
            Ok(()) => {
                debug!(snapshot = %path.display(), bytes = bytes.len(), "snapshot written");
                true
            }
            Err(err) => {
                warn!(snapshot = %path.display(), error = %err, "could not write snapshot");
                false
            }
        }
    }
}
