// src/exec/sqlite.rs

//! SQLite-backed relational engine.
//!
//! One connection per statement: opened, used and closed inside
//! [`SqlEngine::execute`]. Execution is serial, so there is nothing to pool.
//!
//! Only `SELECT` statements produce a table. Everything else is stepped to
//! completion and reports the connection's change count, including
//! statements that happen to return rows (`WITH ... SELECT`, `PRAGMA`).

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use tracing::{debug, info};

use crate::artifacts::TabularResult;
use crate::errors::{Result, SqldagError};
use crate::exec::backend::{SqlEngine, SqlOutcome};
use crate::types::StatementKind;

#[derive(Debug, Clone)]
pub struct SqliteEngine {
    path: PathBuf,
}

impl SqliteEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        // Never create a database implicitly; a missing file is a failed run.
        if !self.path.is_file() {
            return Err(SqldagError::Database(format!(
                "Database path not found: {}",
                self.path.display()
            )));
        }
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(db_error)
    }
}

impl SqlEngine for SqliteEngine {
    fn execute(&mut self, sql: &str) -> Result<SqlOutcome> {
        let conn = self.open()?;
        ensure_single_statement(sql)?;
        let kind = StatementKind::classify(sql);

        debug!(db = %self.path.display(), ?kind, "executing statement");

        match kind {
            StatementKind::Read => query_rows(&conn, sql).map(SqlOutcome::Rows),
            StatementKind::Write => run_write(&conn, sql).map(SqlOutcome::Affected),
        }
    }
}

/// Step a non-`SELECT` statement to completion, discarding any rows.
///
/// Autocommit: the change is durable once this returns.
fn run_write(conn: &Connection, sql: &str) -> Result<usize> {
    let mut stmt = conn.prepare(sql).map_err(db_error)?;
    let mut rows = stmt.raw_query();
    while rows.next().map_err(db_error)?.is_some() {}
    drop(rows);

    Ok(usize::try_from(conn.changes()).unwrap_or(usize::MAX))
}

/// `prepare` compiles the first statement and ignores the rest, so text
/// with anything but blanks or comments after a top-level `;` is refused.
fn ensure_single_statement(sql: &str) -> Result<()> {
    match statement_tail(sql) {
        Some(tail) => Err(SqldagError::Database(format!(
            "You can only execute one statement at a time (trailing: {})",
            tail.trim()
        ))),
        None => Ok(()),
    }
}

/// Text after the first top-level `;`, when it holds another statement.
fn statement_tail(sql: &str) -> Option<&str> {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            // Doubled quotes ('it''s') scan as two adjacent literals.
            quote @ (b'\'' | b'"' | b'`') => i = skip_past(bytes, i + 1, &[quote]),
            b'[' => i = skip_past(bytes, i + 1, b"]"),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_past(bytes, i + 2, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_past(bytes, i + 2, b"*/"),
            b';' => {
                let tail = &sql[i + 1..];
                return (!is_blank(tail)).then_some(tail);
            }
            _ => i += 1,
        }
    }
    None
}

fn is_blank(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b';' => i += 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_past(bytes, i + 2, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_past(bytes, i + 2, b"*/"),
            b if b.is_ascii_whitespace() => i += 1,
            _ => return false,
        }
    }
    true
}

/// Index just past the next `marker` at or after `from`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, marker: &[u8]) -> usize {
    let from = from.min(bytes.len());
    bytes[from..]
        .windows(marker.len())
        .position(|window| window == marker)
        .map_or(bytes.len(), |pos| from + pos + marker.len())
}

fn query_rows(conn: &Connection, sql: &str) -> Result<TabularResult> {
    let mut stmt = conn.prepare(sql).map_err(db_error)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([]).map_err(db_error)?;
    while let Some(row) = cursor.next().map_err(db_error)? {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(value_to_json(row.get_ref(idx).map_err(db_error)?));
        }
        rows.push(values);
    }

    Ok(TabularResult { columns, rows })
}

fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => {
            Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect())
        }
    }
}

fn db_error(err: rusqlite::Error) -> SqldagError {
    SqldagError::Database(err.to_string())
}

/// Replace the database file at `path` with a fresh one built from a DDL
/// script.
pub fn recreate_database(path: impl AsRef<Path>, schema_sql: &str) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.execute_batch(schema_sql)?;

    info!(db = %path.display(), "database created and schema applied");
    Ok(())
}
