// src/report.rs

//! Human-readable output on stdout: the post-run summary and the dry-run
//! listing. Logs go to stderr, so these are the only lines on stdout.

use std::io::{self, Write};

use crate::artifacts::{ArtifactStore, ArtifactValue, TabularResult};
use crate::dag::{runnable_nodes, NodeStatusTable};
use crate::engine::ExecutionState;
use crate::plan::Plan;

/// Print the run summary to stdout.
pub fn print_summary(state: &ExecutionState) -> io::Result<()> {
    let stdout = io::stdout();
    write_summary(&mut stdout.lock(), state)
}

/// Print the dry-run listing to stdout.
pub fn print_dry_run(plan: &Plan) -> io::Result<()> {
    let stdout = io::stdout();
    write_dry_run(&mut stdout.lock(), plan)
}

pub fn write_summary(out: &mut impl Write, state: &ExecutionState) -> io::Result<()> {
    writeln!(out, "--- Run complete ---")?;
    writeln!(
        out,
        "outcome: {:?} ({} attempts)",
        state.outcome(),
        state.total_attempts()
    )?;

    if !state.issues().is_empty() {
        writeln!(out)?;
        writeln!(out, "Issues encountered:")?;
        for issue in state.issues() {
            if issue.nodes.is_empty() {
                writeln!(out, "- {}", issue.reason)?;
            } else {
                writeln!(out, "- {} (unfinished: {})", issue.reason, issue.nodes.join(", "))?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "Nodes:")?;
    for node in state.plan().nodes() {
        let status = state.node_status().get(&node.id);
        match &status.last_error {
            Some(err) => writeln!(
                out,
                "  {} [{}] {} (attempts: {}): {}",
                node.id, node.node_type, status.state, status.attempts, err
            )?,
            None => writeln!(
                out,
                "  {} [{}] {} (attempts: {})",
                node.id, node.node_type, status.state, status.attempts
            )?,
        }
    }

    writeln!(out)?;
    writeln!(out, "Final artifacts:")?;
    if state.artifacts().is_empty() {
        writeln!(out, "(None)")?;
    }
    for (name, value) in state.artifacts().iter() {
        writeln!(out)?;
        writeln!(out, "--- Artifact: {name} ---")?;
        match value {
            ArtifactValue::Table(table) => write_table(out, table)?,
            ArtifactValue::Json(json) => {
                let pretty = serde_json::to_string_pretty(json).map_err(io::Error::other)?;
                writeln!(out, "{pretty}")?;
            }
        }
    }

    Ok(())
}

pub fn write_dry_run(out: &mut impl Write, plan: &Plan) -> io::Result<()> {
    writeln!(out, "sqldag dry-run")?;
    writeln!(out, "  plan.version = {}", plan.version())?;
    writeln!(out)?;

    writeln!(out, "nodes ({}):", plan.nodes().len())?;
    for node in plan.nodes() {
        writeln!(out, "  - {} [{}]", node.id, node.node_type)?;
        if !node.label.is_empty() {
            writeln!(out, "      label: {}", node.label)?;
        }
        if !node.requires.is_empty() {
            writeln!(out, "      requires: {:?}", node.requires)?;
        }
        if !node.produces.is_empty() {
            writeln!(out, "      produces: {:?}", node.produces)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "edges ({}):", plan.edges().len())?;
    for edge in plan.edges() {
        writeln!(out, "  {} > {}", edge.source, edge.destination)?;
    }

    let mut status = NodeStatusTable::new();
    for node in plan.nodes() {
        status.register(node.id.clone());
    }
    let initial = runnable_nodes(plan, &status, &ArtifactStore::new());

    writeln!(out)?;
    writeln!(out, "initially runnable: {:?}", initial)?;
    Ok(())
}

/// Render a table as a `col | col` header, a dash rule, then one line per
/// row.
pub fn write_table(out: &mut impl Write, table: &TabularResult) -> io::Result<()> {
    let header = table.columns.join(" | ");
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.chars().count()))?;
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        writeln!(out, "{}", cells.join(" | "))?;
    }
    Ok(())
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}
