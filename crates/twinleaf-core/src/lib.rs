//! Twinleaf Core: Lineage graph merge and selection between base and current snapshots

pub mod error;
pub mod graph;
pub mod lineage;
pub mod model;
pub mod selection;
pub mod snapshot;


pub use error::{LineageError, Result};
pub use graph::{Graph, GraphSummary, GraphView, OriginCounts};
pub use lineage::{merge, merge_snapshots};
pub use model::{ChangeStatus, EdgeKey, LineageEdge, LineageNode, NodeId, Origin, Side};
pub use selection::{
    Direction, NodeSet, Selector, intersect, neighbor_set, select_downstream, select_upstream,
    union,
};
pub use snapshot::{LineageSnapshot, NodeMetadata, ParentMap};
