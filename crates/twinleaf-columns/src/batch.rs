//! Parallel schema diffs across many resources

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{Column, SchemaDiff, diff_schema};

/// Base and current columns of one compared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceColumns {
    pub resource_id: String,
    #[serde(default)]
    pub base: Vec<Column>,
    #[serde(default)]
    pub current: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSchemaDiff {
    pub resource_id: String,
    pub diff: SchemaDiff,
}

/// Diff every resource independently. Output order matches input order.
pub fn diff_resources(resources: &[ResourceColumns]) -> Vec<ResourceSchemaDiff> {
    let diffs: Vec<ResourceSchemaDiff> = resources
        .par_iter()
        .map(|resource| ResourceSchemaDiff {
            resource_id: resource.resource_id.clone(),
            diff: diff_schema(&resource.base, &resource.current),
        })
        .collect();

    let changed = diffs.iter().filter(|d| !d.diff.is_unchanged()).count();
    tracing::debug!(
        "Diffed columns of {} resources ({} changed)",
        diffs.len(),
        changed
    );
    diffs
}
