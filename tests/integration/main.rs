//! Integration tests for Twinleaf
//!
//! These tests drive the lineage and column crates together, from snapshot
//! files on disk to the structures handed to renderers, and run the built
//! binary against the same fixtures.

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use twinleaf_columns::{Column, KeyStatus, ResourceColumns, diff_resources};
use twinleaf_core::{
    ChangeStatus, LineageSnapshot, NodeSet, Origin, Selector, merge_snapshots, select_downstream,
    select_upstream, union,
};

const BASE: &str = r#"{
  "parent_map": {
    "source.raw_orders": [],
    "model.stg_orders": ["source.raw_orders"],
    "model.orders": ["model.stg_orders"],
    "model.order_report": ["model.orders"]
  },
  "nodes": {
    "model.stg_orders": {"name": "stg_orders", "resource_type": "model", "checksum": "s1"},
    "model.orders": {"name": "orders", "resource_type": "model", "checksum": "o1"},
    "model.order_report": {"name": "order_report", "resource_type": "model", "checksum": "r1"}
  }
}"#;

const CURRENT: &str = r#"{
  "parent_map": {
    "source.raw_orders": [],
    "model.stg_orders": ["source.raw_orders"],
    "model.orders": ["model.stg_orders", "seed.country_codes"],
    "model.customers": ["model.stg_orders"]
  },
  "nodes": {
    "model.stg_orders": {"name": "stg_orders", "resource_type": "model", "checksum": "s1"},
    "model.orders": {"name": "orders", "resource_type": "model", "checksum": "o2"},
    "model.customers": {"name": "customers", "resource_type": "model", "checksum": "c1"}
  }
}"#;

fn write_snapshots(dir: &TempDir) -> (LineageSnapshot, LineageSnapshot) {
    let base_path = dir.path().join("base.json");
    let current_path = dir.path().join("current.json");
    fs::write(&base_path, BASE).unwrap();
    fs::write(&current_path, CURRENT).unwrap();
    (
        LineageSnapshot::from_path(&base_path).unwrap(),
        LineageSnapshot::from_path(&current_path).unwrap(),
    )
}

#[test]
fn test_snapshot_files_to_graph() {
    let dir = TempDir::new().unwrap();
    let (base, current) = write_snapshots(&dir);
    let graph = merge_snapshots(&base, &current);

    assert_eq!(graph.node("model.orders").unwrap().change_status, Some(ChangeStatus::Modified));
    assert_eq!(graph.node("model.customers").unwrap().origin, Origin::CurrentOnly);
    assert_eq!(graph.node("model.order_report").unwrap().origin, Origin::BaseOnly);

    let seed = graph.node("seed.country_codes").unwrap();
    assert!(seed.inferred);
    assert_eq!(seed.origin, Origin::CurrentOnly);

    assert_eq!(
        graph.edge_between("model.stg_orders", "model.orders").unwrap().origin,
        Origin::Both
    );
    assert_eq!(
        graph.edge_between("model.orders", "model.order_report").unwrap().origin,
        Origin::BaseOnly
    );
}

#[test]
fn test_changed_plus_upstream_scoping() {
    let dir = TempDir::new().unwrap();
    let (base, current) = write_snapshots(&dir);
    let graph = merge_snapshots(&base, &current);

    let modified = graph.modified_set();
    let manual = union(&modified, &select_upstream(&graph, &modified));
    let parsed = "state:modified +state:modified".parse::<Selector>().unwrap().resolve(&graph);
    assert_eq!(manual, parsed);
    assert!(parsed.contains("source.raw_orders"));
    assert!(parsed.contains("seed.country_codes"));

    let impact: NodeSet = select_downstream(&graph, ["model.stg_orders"]);
    assert!(impact.contains("model.customers"));
    assert!(impact.contains("model.order_report"));
    assert!(!impact.contains("source.raw_orders"));
}

#[test]
fn test_selected_view_serializes() {
    let dir = TempDir::new().unwrap();
    let (base, current) = write_snapshots(&dir);
    let graph = merge_snapshots(&base, &current);

    let selection = "+model.orders".parse::<Selector>().unwrap().resolve(&graph);
    let json = serde_json::to_value(graph.view_of(&selection)).unwrap();
    let edge_ids: Vec<&str> = json["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert!(edge_ids.contains(&"model.stg_orders->model.orders"));
    assert!(edge_ids.contains(&"seed.country_codes->model.orders"));
    assert!(!edge_ids.contains(&"model.orders->model.order_report"));
}

#[test]
fn test_column_diffs_for_changed_models() {
    let resources = vec![
        ResourceColumns {
            resource_id: "model.orders".to_string(),
            base: vec![
                Column::new("order_id", Some("INTEGER")),
                Column::new("amount", Some("INTEGER")),
                Column::new("status", Some("TEXT")),
            ],
            current: vec![
                Column::new("order_id", Some("INTEGER")),
                Column::new("status", Some("TEXT")),
                Column::new("amount", Some("NUMERIC")),
                Column::new("country", Some("TEXT")),
            ],
        },
        ResourceColumns {
            resource_id: "model.customers".to_string(),
            base: vec![],
            current: vec![Column::new("customer_id", Some("INTEGER"))],
        },
    ];

    let diffs = diff_resources(&resources);
    let orders = &diffs[0].diff;
    let order: Vec<&str> = orders.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(order, vec!["order_id", "status", "amount", "country"]);
    assert_eq!(orders.row("status").unwrap().status, None);
    assert_eq!(orders.row("amount").unwrap().status, Some(KeyStatus::Reordered));
    assert!(orders.row("amount").unwrap().type_changed);
    assert_eq!(orders.row("country").unwrap().status, Some(KeyStatus::Added));

    assert_eq!(
        diffs[1].diff.row("customer_id").unwrap().status,
        Some(KeyStatus::Added)
    );
}

// ── CLI ─────────────────────────────────────────────────

/// Run the binary inside `dir` so `./twinleaf.toml` lookup is scoped to it.
fn twinleaf(dir: &Path, args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_twinleaf"))
        .args(args)
        .current_dir(dir)
        .env("TWINLEAF_LOG", "off")
        .output()
        .expect("failed to run twinleaf");
    assert!(
        output.status.success(),
        "twinleaf {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn node_ids(view: &Value) -> Vec<String> {
    let mut ids: Vec<String> = view["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_cli_lineage_without_config_prints_full_pretty_graph() {
    let dir = TempDir::new().unwrap();
    write_snapshots(&dir);
    assert!(!dir.path().join("twinleaf.toml").exists());

    let output = twinleaf(
        dir.path(),
        &["lineage", "--base", "base.json", "--current", "current.json"],
    );
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert!(stdout.trim_end().lines().count() > 1);

    let view = stdout_json(&output);
    assert_eq!(node_ids(&view).len(), 6);
    assert_eq!(view["edges"].as_array().unwrap().len(), 5);
}

#[test]
fn test_cli_lineage_summary_counts() {
    let dir = TempDir::new().unwrap();
    write_snapshots(&dir);

    let output = twinleaf(
        dir.path(),
        &["lineage", "--base", "base.json", "--current", "current.json", "--summary"],
    );
    let summary = stdout_json(&output);
    assert_eq!(summary["nodes"]["base_only"], 1);
    assert_eq!(summary["nodes"]["current_only"], 2);
    assert_eq!(summary["nodes"]["both"], 3);
    assert_eq!(summary["edges"]["base_only"], 1);
    assert_eq!(summary["edges"]["current_only"], 2);
    assert_eq!(summary["edges"]["both"], 2);
    assert_eq!(summary["added"], 2);
    assert_eq!(summary["removed"], 1);
    assert_eq!(summary["modified"], 1);
}

#[test]
fn test_cli_lineage_uses_default_select_from_config() {
    let dir = TempDir::new().unwrap();
    write_snapshots(&dir);
    fs::write(
        dir.path().join("twinleaf.toml"),
        "[lineage]\ndefault_select = \"+model.orders\"\n",
    )
    .unwrap();

    let output = twinleaf(
        dir.path(),
        &["lineage", "--base", "base.json", "--current", "current.json"],
    );
    assert_eq!(
        node_ids(&stdout_json(&output)),
        vec![
            "model.orders",
            "model.stg_orders",
            "seed.country_codes",
            "source.raw_orders"
        ]
    );

    // An explicit --select wins over the configured default
    let output = twinleaf(
        dir.path(),
        &[
            "lineage",
            "--base",
            "base.json",
            "--current",
            "current.json",
            "--select",
            "model.customers",
        ],
    );
    assert_eq!(node_ids(&stdout_json(&output)), vec!["model.customers"]);
}

#[test]
fn test_cli_compact_output_when_pretty_disabled() {
    let dir = TempDir::new().unwrap();
    write_snapshots(&dir);
    fs::write(dir.path().join("twinleaf.toml"), "[output]\npretty = false\n").unwrap();

    let output = twinleaf(
        dir.path(),
        &["lineage", "--base", "base.json", "--current", "current.json", "--summary"],
    );
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout.trim_end().lines().count(), 1);
    assert_eq!(stdout_json(&output)["modified"], 1);
}

#[test]
fn test_cli_output_file_replaces_stdout() {
    let dir = TempDir::new().unwrap();
    write_snapshots(&dir);

    let output = twinleaf(
        dir.path(),
        &[
            "lineage",
            "--base",
            "base.json",
            "--current",
            "current.json",
            "--summary",
            "--output",
            "summary.json",
        ],
    );
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(dir.path().join("summary.json")).unwrap();
    let summary: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(summary["added"], 2);
}

#[test]
fn test_cli_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    write_snapshots(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_twinleaf"))
        .args(["--config", "missing.toml", "columns", "--base", "a", "--current", "a"])
        .current_dir(dir.path())
        .env("TWINLEAF_LOG", "off")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_cli_columns_statuses() {
    let dir = TempDir::new().unwrap();

    let output = twinleaf(
        dir.path(),
        &["columns", "--base", "id,name,legacy", "--current", "id,name,email"],
    );
    let entries = stdout_json(&output);
    let status_of = |key: &str| -> Value {
        entries
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["key"] == key)
            .map(|e| e.get("status").cloned().unwrap_or(Value::Null))
            .unwrap()
    };
    assert_eq!(entries.as_array().unwrap().len(), 4);
    assert_eq!(entries[0]["key"], "id");
    assert_eq!(entries[1]["key"], "name");
    assert_eq!(status_of("id"), Value::Null);
    assert_eq!(status_of("name"), Value::Null);
    assert_eq!(status_of("legacy"), "removed");
    assert_eq!(status_of("email"), "added");
}

#[test]
fn test_cli_schema_reads_resource_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("resources.json"),
        r#"[
  {
    "resource_id": "model.orders",
    "base": [
      {"name": "order_id", "data_type": "INTEGER"},
      {"name": "amount", "data_type": "INTEGER"}
    ],
    "current": [
      {"name": "order_id", "data_type": "INTEGER"},
      {"name": "amount", "data_type": "NUMERIC"},
      {"name": "country"}
    ]
  },
  {"resource_id": "model.customers", "current": [{"name": "customer_id"}]}
]"#,
    )
    .unwrap();

    let output = twinleaf(dir.path(), &["schema", "--input", "resources.json"]);
    let diffs = stdout_json(&output);
    assert_eq!(diffs.as_array().unwrap().len(), 2);

    let orders = &diffs[0];
    assert_eq!(orders["resource_id"], "model.orders");
    let rows = orders["diff"]["rows"].as_array().unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["order_id", "amount", "country"]);
    assert_eq!(rows[1]["type_changed"], true);
    assert_eq!(rows[1]["base_type"], "INTEGER");
    assert_eq!(rows[1]["current_type"], "NUMERIC");
    assert_eq!(rows[2]["status"], "added");
    assert_eq!(rows[2]["base_index"], Value::Null);

    let customers = &diffs[1];
    assert_eq!(customers["resource_id"], "model.customers");
    assert_eq!(customers["diff"]["rows"][0]["status"], "added");
}
