//! Typed column diff built on the merged key order

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::merge::{KeyStatus, merge_keys_with_status};

/// A column as reported by one snapshot's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: Option<&str>) -> Self {
        Column {
            name: name.into(),
            data_type: data_type.map(str::to_string),
        }
    }
}

/// One row of a schema diff, in merged column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRow {
    pub name: String,
    pub status: Option<KeyStatus>,
    pub base_index: Option<usize>,
    pub current_index: Option<usize>,
    pub base_type: Option<String>,
    pub current_type: Option<String>,
    /// Present on both sides with different declared types.
    pub type_changed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDiff {
    pub rows: Vec<SchemaRow>,
}

impl SchemaDiff {
    pub fn row(&self, name: &str) -> Option<&SchemaRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn is_unchanged(&self) -> bool {
        self.rows
            .iter()
            .all(|r| r.status.is_none() && !r.type_changed)
    }
}

/// Diff two column lists by name, then compare declared types.
pub fn diff_schema(base: &[Column], current: &[Column]) -> SchemaDiff {
    let base_names: Vec<&str> = base.iter().map(|c| c.name.as_str()).collect();
    let current_names: Vec<&str> = current.iter().map(|c| c.name.as_str()).collect();
    let merged = merge_keys_with_status(&base_names, &current_names);

    let base_lookup = first_positions(base);
    let current_lookup = first_positions(current);

    let rows = merged
        .entries()
        .iter()
        .map(|entry| {
            let base_col = base_lookup.get(entry.key.as_str());
            let current_col = current_lookup.get(entry.key.as_str());
            let base_type = base_col.and_then(|(_, c)| c.data_type.clone());
            let current_type = current_col.and_then(|(_, c)| c.data_type.clone());
            let type_changed = match (&base_type, &current_type) {
                (Some(b), Some(c)) => b != c,
                _ => false,
            };
            SchemaRow {
                name: entry.key.clone(),
                status: entry.status,
                base_index: base_col.map(|(idx, _)| *idx),
                current_index: current_col.map(|(idx, _)| *idx),
                base_type,
                current_type,
                type_changed,
            }
        })
        .collect();

    SchemaDiff { rows }
}

fn first_positions(columns: &[Column]) -> HashMap<&str, (usize, &Column)> {
    let mut lookup = HashMap::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        lookup.entry(column.name.as_str()).or_insert((idx, column));
    }
    lookup
}
