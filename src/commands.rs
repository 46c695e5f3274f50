//! CLI command implementations

use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use twinleaf_columns::{ResourceColumns, diff_resources, merge_keys_with_status};
use twinleaf_core::{LineageSnapshot, Selector, merge_snapshots};

/// Where and how command results are written.
pub struct Output {
    path: Option<PathBuf>,
    pretty: bool,
}

impl Output {
    pub fn new(path: Option<PathBuf>, pretty: bool) -> Self {
        Output { path, pretty }
    }

    fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        match &self.path {
            Some(path) => {
                std::fs::write(path, json + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!("Wrote {}", path.display());
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}

pub fn lineage(
    out: &Output,
    base: &Path,
    current: &Path,
    select: Option<&str>,
    summary: bool,
) -> anyhow::Result<()> {
    let base_snapshot = LineageSnapshot::from_path(base)?;
    let current_snapshot = LineageSnapshot::from_path(current)?;
    let graph = merge_snapshots(&base_snapshot, &current_snapshot);

    tracing::info!(
        "Merged {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    if summary {
        return out.write(&graph.summary());
    }

    match select {
        Some(expr) => {
            let selector: Selector = expr.parse()?;
            let selection = selector.resolve(&graph);
            tracing::info!("Selected {} nodes with `{}`", selection.len(), expr);
            out.write(&graph.view_of(&selection))
        }
        None => out.write(&graph.view()),
    }
}

pub fn columns(out: &Output, base: &[String], current: &[String]) -> anyhow::Result<()> {
    let merged = merge_keys_with_status(base, current);
    out.write(&merged)
}

pub fn schema(out: &Output, input: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let resources: Vec<ResourceColumns> = serde_json::from_str(&json)
        .with_context(|| format!("invalid resource columns in {}", input.display()))?;

    tracing::info!("Diffing columns of {} resources", resources.len());
    out.write(&diff_resources(&resources))
}
