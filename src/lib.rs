// src/lib.rs

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod plan;
pub mod report;
pub mod types;

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_from_path};
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::SqldagError;
use crate::engine::{RunOptions, Runtime, SnapshotWriter};
use crate::exec::{recreate_database, NodeExecutor, RequestContext, ScriptedReasoner, SqliteEngine};
use crate::fs::{FileSystem, RealFileSystem};
use crate::plan::load_plan;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the user request (`--request` or stdin) and context files
/// - the scripted collaborator and the SQLite engine
/// - planning (plan file or collaborator), optional database setup
/// - the scheduler loop and the run summary
///
/// Node failures, stalls and the attempt cap are reported in the summary;
/// only setup problems make this return an error.
pub fn run(args: CliArgs) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let cfg = resolve_config(fs.as_ref(), &args)?;

    let stdin = std::io::stdin();
    if args.request.as_deref().is_none_or(|r| r.trim().is_empty()) && stdin.is_terminal() {
        eprintln!("Enter the request (end with Ctrl+D):");
    }
    let request = resolve_request(args.request.as_deref(), stdin.lock())?;
    let context = load_context(fs.as_ref(), &cfg, &request)?;

    let reasoner = match &args.responses {
        Some(path) => ScriptedReasoner::load(fs.as_ref(), path)
            .with_context(|| format!("loading responses script {}", path.display()))?,
        None => ScriptedReasoner::default(),
    };
    let engine = SqliteEngine::new(&cfg.database.path);

    let options = RunOptions {
        max_attempts: cfg.run.max_attempts,
    };
    let mut runtime = Runtime::new(NodeExecutor::new(reasoner, engine), options);
    if let Some(dir) = &cfg.run.snapshot_dir {
        runtime = runtime.with_snapshots(SnapshotWriter::new(fs.clone(), dir));
    }

    let (process, plan) = match &args.plan {
        Some(path) => {
            let plan = load_plan(fs.as_ref(), path)
                .with_context(|| format!("loading plan {}", path.display()))?;
            (Vec::new(), plan)
        }
        None => runtime.plan(&context).context("planning failed")?,
    };

    if args.dry_run {
        report::print_dry_run(&plan)?;
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    if let Some(schema) = &cfg.database.schema {
        let ddl = fs
            .read_to_string(schema)
            .with_context(|| format!("reading schema {}", schema.display()))?;
        recreate_database(&cfg.database.path, &ddl)?;
    }

    info!(request = %context.user_request, "running plan");
    let state = runtime.execute(plan, process, context);

    report::print_summary(&state)?;
    Ok(())
}

/// Load the config file (if any), merge CLI overrides, then validate.
///
/// An explicit `--config` must exist; the default `Sqldag.toml` is optional.
pub fn resolve_config(fs: &dyn FileSystem, args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(fs, path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => {
            let path = default_config_path();
            if fs.is_file(&path) {
                load_from_path(fs, &path)
                    .with_context(|| format!("loading config {}", path.display()))?
            } else {
                RawConfigFile::default()
            }
        }
    };

    apply_cli_overrides(&mut raw, args);
    Ok(ConfigFile::try_from(raw)?)
}

fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(n) = args.max_attempts {
        raw.run.max_attempts = n;
    }
    if let Some(dir) = &args.snapshot_dir {
        raw.run.snapshot_dir = Some(dir.clone());
    }
    if let Some(db) = &args.db {
        raw.database.path = Some(db.clone());
    }
    if let Some(schema) = &args.schema {
        raw.database.schema = Some(schema.clone());
    }
    if let Some(context) = &args.context {
        raw.context.general_context = Some(context.clone());
    }
    if let Some(examples) = &args.examples {
        raw.context.examples = Some(examples.clone());
    }
}

/// The user request: the `--request` text, or all of `input` when the flag
/// is absent or blank. Surrounding whitespace is trimmed.
pub fn resolve_request(arg: Option<&str>, mut input: impl Read) -> Result<String> {
    let mut request = arg.map(str::trim).unwrap_or_default().to_string();
    if request.is_empty() {
        let mut buf = String::new();
        input
            .read_to_string(&mut buf)
            .context("reading the request from stdin")?;
        request = buf.trim().to_string();
    }

    if request.is_empty() {
        return Err(SqldagError::ConfigError(
            "no request provided: pass --request or pipe it on stdin".to_string(),
        )
        .into());
    }
    debug!(%request, "resolved user request");
    Ok(request)
}

/// Build the request context forwarded to collaborators.
///
/// The schema snapshot is the text of the DDL script, when one is set.
pub fn load_context(
    fs: &dyn FileSystem,
    cfg: &ConfigFile,
    user_request: &str,
) -> Result<RequestContext> {
    Ok(RequestContext {
        user_request: user_request.to_string(),
        general_context: read_optional(fs, cfg.context.general_context.as_deref())?,
        schema_snapshot: read_optional(fs, cfg.database.schema.as_deref())?,
        example_queries: read_optional(fs, cfg.context.examples.as_deref())?,
    })
}

fn read_optional(fs: &dyn FileSystem, path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs
            .read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => Ok(String::new()),
    }
}
