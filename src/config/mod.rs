// src/config/mod.rs

//! Run configuration.
//!
//! - `model.rs` maps the `Sqldag.toml` sections.
//! - `loader.rs` reads the file.
//! - `validate.rs` turns a raw (possibly CLI-merged) config into a
//!   [`ConfigFile`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    ConfigFile, ContextSection, DatabaseSection, RawConfigFile, RawDatabaseSection, RunSection,
};
pub use validate::validate_config;
