// src/config/validate.rs

use crate::config::model::{ConfigFile, DatabaseSection, RawConfigFile};
use crate::errors::{Result, SqldagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SqldagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;

        let RawConfigFile {
            run,
            database,
            context,
        } = raw;

        let path = database.path.ok_or_else(missing_database_path)?;
        let database = DatabaseSection {
            path,
            schema: database.schema,
        };

        Ok(ConfigFile::new_unchecked(run, database, context))
    }
}

/// Check the invariants a runnable configuration must satisfy.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.run.max_attempts == 0 {
        return Err(SqldagError::ConfigError(
            "[run].max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    match &cfg.database.path {
        None => return Err(missing_database_path()),
        Some(path) if path.as_os_str().is_empty() => {
            return Err(SqldagError::ConfigError(
                "[database].path must not be empty".to_string(),
            ));
        }
        Some(_) => {}
    }

    Ok(())
}

fn missing_database_path() -> SqldagError {
    SqldagError::ConfigError(
        "no database configured: set [database].path or pass --db".to_string(),
    )
}
