//! Lineage snapshot input, as captured from one side of the comparison

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LineageError, Result};

/// Child id -> ordered ids of its direct parents.
pub type ParentMap = BTreeMap<String, Vec<String>>;

/// Per-resource details carried alongside the parent map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// One side (base or current) of a lineage comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineageSnapshot {
    #[serde(default)]
    pub parent_map: ParentMap,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeMetadata>,
}

impl LineageSnapshot {
    pub fn new(parent_map: ParentMap) -> Self {
        LineageSnapshot {
            parent_map,
            nodes: BTreeMap::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| LineageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = Self::from_json_str(&json)?;
        tracing::debug!(
            "Loaded snapshot {} ({} resources)",
            path.display(),
            snapshot.parent_map.len()
        );
        Ok(snapshot)
    }
}
