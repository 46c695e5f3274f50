//! Twinleaf Columns: Ordered column-name merge and per-column change status

pub mod batch;
pub mod merge;
pub mod schema;


pub use batch::{ResourceColumns, ResourceSchemaDiff, diff_resources};
pub use merge::{KeyEntry, KeyStatus, MergedKeys, merge_keys, merge_keys_with_status};
pub use schema::{Column, SchemaDiff, SchemaRow, diff_schema};
