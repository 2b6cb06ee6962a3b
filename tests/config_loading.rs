// tests/config_loading.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use sqldag::cli::CliArgs;
use sqldag::config::{load_and_validate, load_from_path, ConfigFile, RawConfigFile};
use sqldag::engine::DEFAULT_MAX_ATTEMPTS;
use sqldag::errors::SqldagError;
use sqldag::fs::mock::MockFileSystem;
use sqldag::fs::RealFileSystem;
use sqldag::{load_context, resolve_config, resolve_request};

type TestResult = Result<(), Box<dyn Error>>;

const FULL_CONFIG: &str = r#"
[run]
max_attempts = 7
snapshot_dir = "output"

[database]
path = "data/logistics.db"
schema = "data/db.sql"

[context]
general_context = "data/description.txt"
examples = "data/examples.sql"
"#;

#[test]
fn full_config_from_a_real_file() -> TestResult {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(FULL_CONFIG.as_bytes())?;

    let cfg = load_and_validate(&RealFileSystem, file.path())?;
    assert_eq!(cfg.run.max_attempts, 7);
    assert_eq!(cfg.run.snapshot_dir, Some(PathBuf::from("output")));
    assert_eq!(cfg.database.path, PathBuf::from("data/logistics.db"));
    assert_eq!(cfg.database.schema, Some(PathBuf::from("data/db.sql")));
    assert_eq!(
        cfg.context.examples,
        Some(PathBuf::from("data/examples.sql"))
    );
    Ok(())
}

#[test]
fn missing_sections_take_defaults() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("Sqldag.toml", "[database]\npath = \"db.sqlite\"\n");

    let raw = load_from_path(&fs, "Sqldag.toml")?;
    assert_eq!(raw.run.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(raw.run.snapshot_dir, None);

    let cfg = ConfigFile::try_from(raw)?;
    assert_eq!(cfg.database.schema, None);
    assert_eq!(cfg.context.general_context, None);
    Ok(())
}

#[test]
fn zero_max_attempts_is_rejected() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file(
        "Sqldag.toml",
        "[run]\nmax_attempts = 0\n[database]\npath = \"db.sqlite\"\n",
    );

    let err = load_and_validate(&fs, "Sqldag.toml").expect_err("expected a config error");
    assert!(matches!(err, SqldagError::ConfigError(msg) if msg.contains("max_attempts")));
}

#[test]
fn database_path_is_required() {
    init_tracing();
    let err = ConfigFile::try_from(RawConfigFile::default()).expect_err("expected a config error");
    assert!(matches!(err, SqldagError::ConfigError(msg) if msg.contains("--db")));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("Sqldag.toml", "[run\nmax_attempts = ");

    let err = load_from_path(&fs, "Sqldag.toml").expect_err("expected a parse error");
    assert!(matches!(err, SqldagError::TomlError(_)), "{err:?}");
}

#[test]
fn cli_flags_override_the_file() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("conf/Sqldag.toml", FULL_CONFIG);

    let args = CliArgs {
        config: Some(PathBuf::from("conf/Sqldag.toml")),
        db: Some(PathBuf::from("other.db")),
        max_attempts: Some(3),
        examples: Some(PathBuf::from("more.sql")),
        ..CliArgs::default()
    };

    let cfg = resolve_config(&fs, &args)?;
    assert_eq!(cfg.database.path, PathBuf::from("other.db"));
    assert_eq!(cfg.database.schema, Some(PathBuf::from("data/db.sql")));
    assert_eq!(cfg.run.max_attempts, 3);
    assert_eq!(cfg.context.examples, Some(PathBuf::from("more.sql")));
    assert_eq!(
        cfg.context.general_context,
        Some(PathBuf::from("data/description.txt"))
    );
    Ok(())
}

#[test]
fn cli_alone_is_enough_without_a_config_file() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    let args = CliArgs {
        db: Some(PathBuf::from("only.db")),
        ..CliArgs::default()
    };

    let cfg = resolve_config(&fs, &args)?;
    assert_eq!(cfg.database.path, PathBuf::from("only.db"));
    assert_eq!(cfg.run.max_attempts, DEFAULT_MAX_ATTEMPTS);
    Ok(())
}

#[test]
fn explicit_config_path_must_exist() {
    init_tracing();
    let fs = MockFileSystem::new();
    let args = CliArgs {
        config: Some(PathBuf::from("missing.toml")),
        db: Some(PathBuf::from("only.db")),
        ..CliArgs::default()
    };

    assert!(resolve_config(&fs, &args).is_err());
}

#[test]
fn request_context_reads_the_side_files() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("conf/Sqldag.toml", FULL_CONFIG);
    fs.add_file("data/description.txt", "A logistics company.");
    fs.add_file("data/examples.sql", "SELECT * FROM shipments;");
    fs.add_file("data/db.sql", "CREATE TABLE shipments (id INTEGER);");

    let args = CliArgs {
        config: Some(PathBuf::from("conf/Sqldag.toml")),
        ..CliArgs::default()
    };
    let cfg = resolve_config(&fs, &args)?;
    let context = load_context(&fs, &cfg, "where is shipment 4?")?;

    assert_eq!(context.user_request, "where is shipment 4?");
    assert_eq!(context.general_context, "A logistics company.");
    assert_eq!(context.schema_snapshot, "CREATE TABLE shipments (id INTEGER);");
    assert_eq!(context.example_queries, "SELECT * FROM shipments;");
    Ok(())
}

#[test]
fn request_flag_wins_over_stdin() -> TestResult {
    init_tracing();
    let request = resolve_request(Some("  count open orders \n"), &b"ignored"[..])?;
    assert_eq!(request, "count open orders");
    Ok(())
}

#[test]
fn request_falls_back_to_stdin() -> TestResult {
    init_tracing();
    let request = resolve_request(None, &b"\nwhich region ships most?\n"[..])?;
    assert_eq!(request, "which region ships most?");

    // A blank flag counts as absent.
    let request = resolve_request(Some("   "), &b"late shipments"[..])?;
    assert_eq!(request, "late shipments");
    Ok(())
}

#[test]
fn empty_request_is_a_config_error() {
    init_tracing();
    for (arg, input) in [(None, &b""[..]), (Some(""), &b"  \n\t"[..])] {
        let err = match resolve_request(arg, input) {
            Ok(request) => panic!("expected an error, got {request:?}"),
            Err(err) => err,
        };
        assert!(
            matches!(
                err.downcast_ref::<SqldagError>(),
                Some(SqldagError::ConfigError(msg)) if msg.contains("no request provided")
            ),
            "{err:#}"
        );
    }
}
