//! Merges the base and current parent maps into one provenance-tagged graph

use crate::graph::Graph;
use crate::model::Side;
use crate::snapshot::{LineageSnapshot, ParentMap};

/// Merge two parent maps into a fresh [`Graph`].
pub fn merge(base: &ParentMap, current: &ParentMap) -> Graph {
    let mut graph = build(base, current);
    graph.refresh_change_status();

    tracing::debug!(
        "Merged lineage: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

/// Merge two full snapshots, attaching per-side node metadata so that
/// checksum changes surface as `Modified`.
pub fn merge_snapshots(base: &LineageSnapshot, current: &LineageSnapshot) -> Graph {
    let mut graph = build(&base.parent_map, &current.parent_map);
    for (side, snapshot) in [(Side::Base, base), (Side::Current, current)] {
        for (id, meta) in &snapshot.nodes {
            graph.attach_metadata(id, side, meta);
        }
    }
    graph.refresh_change_status();

    let summary = graph.summary();
    tracing::debug!(
        "Merged lineage snapshots: {} nodes ({} added, {} removed, {} modified), {} edges",
        summary.nodes.total(),
        summary.added,
        summary.removed,
        summary.modified,
        summary.edges.total()
    );
    graph
}

/// Nodes first (base, then current), then edges (base, then current).
/// The current passes must follow the base passes so they can promote
/// base-created entries to `Both`.
fn build(base: &ParentMap, current: &ParentMap) -> Graph {
    let mut graph = Graph::new();
    add_nodes(&mut graph, base, Side::Base);
    add_nodes(&mut graph, current, Side::Current);
    add_edges(&mut graph, base, Side::Base);
    add_edges(&mut graph, current, Side::Current);
    graph
}

fn add_nodes(graph: &mut Graph, parent_map: &ParentMap, side: Side) {
    for child in parent_map.keys() {
        graph.observe_node(child, side);
    }
}

fn add_edges(graph: &mut Graph, parent_map: &ParentMap, side: Side) {
    for (child, parents) in parent_map {
        for parent in parents {
            graph.observe_edge(parent, child, side);
        }
    }
}
