use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of work a plan node performs.
///
/// The tag is matched case-insensitively when a plan is loaded. Tags outside
/// the known set are kept verbatim in `Unrecognized` so the executor can fail
/// that node with a structural error instead of rejecting the whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// Generate one SQL statement and run it against the database.
    Sql,
    /// Free-form reasoning step over the required artifacts.
    Analyzer,
    /// Summarise a tabular `result*` artifact.
    SqlResultAnalyzer,
    Unrecognized(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Sql => "SQL",
            NodeType::Analyzer => "ANALYZER",
            NodeType::SqlResultAnalyzer => "SQL_RESULT_ANALYZER",
            NodeType::Unrecognized(tag) => tag.as_str(),
        }
    }
}

impl FromStr for NodeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "SQL" => NodeType::Sql,
            "ANALYZER" => NodeType::Analyzer,
            "SQL_RESULT_ANALYZER" => NodeType::SqlResultAnalyzer,
            _ => NodeType::Unrecognized(s.to_string()),
        })
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ty) => ty,
            Err(never) => match never {},
        }
    }
}

impl From<NodeType> for String {
    fn from(ty: NodeType) -> Self {
        ty.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactic classification of a SQL statement.
///
/// Only the leading keyword is inspected: a statement whose trimmed text
/// starts with `SELECT` (any case) is a read, everything else is a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

impl StatementKind {
    pub fn classify(sql: &str) -> Self {
        let head = sql.trim_start();
        match head.get(..6) {
            Some(keyword) if keyword.eq_ignore_ascii_case("select") => StatementKind::Read,
            _ => StatementKind::Write,
        }
    }
}
