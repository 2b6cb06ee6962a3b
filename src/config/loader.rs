// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Read and deserialize a config file without validating it.
///
/// Callers merge command-line overrides into the raw value first, then
/// convert it with `ConfigFile::try_from`.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a config file and validate it as-is.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(fs, path)?;
    ConfigFile::try_from(raw)
}

/// `Sqldag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Sqldag.toml")
}
