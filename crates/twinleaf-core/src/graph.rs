//! Merged lineage graph backed by a petgraph arena, addressed by NodeId/EdgeKey

use crate::model::*;
use crate::selection::{Direction, NodeSet};
use crate::snapshot::NodeMetadata;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::Serialize;
use std::collections::HashMap;

/// The merged lineage graph. Edges point parent -> child.
///
/// Built once by [`crate::merge`] / [`crate::merge_snapshots`] and read-only afterwards.
#[derive(Clone)]
pub struct Graph {
    inner: StableDiGraph<LineageNode, LineageEdge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeKey, EdgeIndex>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub(crate) fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
        }
    }

    /// Get a node by id.
    pub fn node(&self, id: &str) -> Option<&LineageNode> {
        self.node_index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Get an edge by its composite key.
    pub fn edge(&self, key: &EdgeKey) -> Option<&LineageEdge> {
        self.edge_index
            .get(key)
            .and_then(|&idx| self.inner.edge_weight(idx))
    }

    pub fn edge_between(&self, parent: &str, child: &str) -> Option<&LineageEdge> {
        self.edge(&EdgeKey::new(parent, child))
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all nodes in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &LineageNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in discovery order.
    pub fn edges(&self) -> impl Iterator<Item = &LineageEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Direct parents (upstream) or children (downstream) of a node.
    /// Unknown ids have no neighbors.
    pub fn neighbors<'a>(
        &'a self,
        id: &str,
        direction: Direction,
    ) -> impl Iterator<Item = &'a LineageNode> + use<'a> {
        let dir = match direction {
            Direction::Upstream => petgraph::Direction::Incoming,
            Direction::Downstream => petgraph::Direction::Outgoing,
        };
        self.node_index
            .get(id)
            .copied()
            .into_iter()
            .flat_map(move |idx| self.inner.neighbors_directed(idx, dir))
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Ids of every node that was added, removed or modified.
    pub fn modified_set(&self) -> NodeSet {
        self.nodes()
            .filter(|n| n.change_status.is_some())
            .map(|n| n.id.clone())
            .collect()
    }

    /// Serializable snapshot of the whole graph.
    pub fn view(&self) -> GraphView {
        GraphView {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Serializable snapshot restricted to `selection`. Edges and adjacency
    /// entries leaving the selection are dropped.
    pub fn view_of(&self, selection: &NodeSet) -> GraphView {
        let nodes = self
            .nodes()
            .filter(|n| selection.contains(&n.id))
            .map(|n| {
                let mut node = n.clone();
                node.parents.retain(|id, _| selection.contains(id));
                node.children.retain(|id, _| selection.contains(id));
                node
            })
            .collect();
        let edges = self
            .edges()
            .filter(|e| selection.contains(e.parent()) && selection.contains(e.child()))
            .cloned()
            .collect();
        GraphView { nodes, edges }
    }

    /// Counts by origin and change status.
    pub fn summary(&self) -> GraphSummary {
        let mut summary = GraphSummary::default();
        for node in self.nodes() {
            summary.nodes.add(node.origin);
            match node.change_status {
                Some(ChangeStatus::Added) => summary.added += 1,
                Some(ChangeStatus::Removed) => summary.removed += 1,
                Some(ChangeStatus::Modified) => summary.modified += 1,
                None => {}
            }
        }
        for edge in self.edges() {
            summary.edges.add(edge.origin);
        }
        summary
    }

    // ── Construction (crate-private) ────────────────────────

    /// Record that `id` is a child key in the `side` parent map.
    pub(crate) fn observe_node(&mut self, id: &str, side: Side) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            if let Some(node) = self.inner.node_weight_mut(idx) {
                node.origin = node.origin.observe(side);
            }
            return idx;
        }
        self.insert_node(id, Origin::from_side(side), false)
    }

    /// Resolve an edge endpoint, synthesizing an inferred node when needed.
    ///
    /// Edge references only promote inferred nodes. A node that appears as a
    /// child key takes its origin from child-key presence alone, so base
    /// `{x: []}` against current `{y: [x]}` leaves `x` base-only.
    fn observe_endpoint(&mut self, id: &str, side: Side) -> NodeIndex {
        match self.node_index.get(id) {
            Some(&idx) => {
                if let Some(node) = self.inner.node_weight_mut(idx) {
                    if node.inferred {
                        node.origin = node.origin.observe(side);
                    }
                }
                idx
            }
            None => {
                tracing::trace!("Inferring node {} from {:?} edge", id, side);
                self.insert_node(id, Origin::from_side(side), true)
            }
        }
    }

    fn insert_node(&mut self, id: &str, origin: Origin, inferred: bool) -> NodeIndex {
        let node_id = NodeId::from(id);
        let idx = self
            .inner
            .add_node(LineageNode::new(node_id.clone(), origin, inferred));
        self.node_index.insert(node_id, idx);
        idx
    }

    /// Record a `parent -> child` edge from the `side` parent map and refresh
    /// both endpoints' adjacency.
    pub(crate) fn observe_edge(&mut self, parent: &str, child: &str, side: Side) {
        let parent_idx = self.observe_endpoint(parent, side);
        let child_idx = self.observe_endpoint(child, side);
        let key = EdgeKey::new(parent, child);

        match self.edge_index.get(&key) {
            Some(&idx) => {
                if let Some(edge) = self.inner.edge_weight_mut(idx) {
                    edge.origin = edge.origin.observe(side);
                }
            }
            None => {
                let edge = LineageEdge::new(key.clone(), Origin::from_side(side));
                let idx = self.inner.add_edge(parent_idx, child_idx, edge);
                self.edge_index.insert(key.clone(), idx);
            }
        }

        if let Some(node) = self.inner.node_weight_mut(child_idx) {
            node.parents.insert(key.parent.clone(), key.clone());
        }
        if let Some(node) = self.inner.node_weight_mut(parent_idx) {
            node.children.insert(key.child.clone(), key);
        }
    }

    /// Attach one side's metadata. Current-side display fields win.
    pub(crate) fn attach_metadata(&mut self, id: &str, side: Side, meta: &NodeMetadata) {
        let Some(&idx) = self.node_index.get(id) else {
            return;
        };
        let Some(node) = self.inner.node_weight_mut(idx) else {
            return;
        };
        if let Some(name) = &meta.name {
            node.name = name.clone();
        }
        if meta.resource_type.is_some() {
            node.resource_type = meta.resource_type.clone();
        }
        if meta.package_name.is_some() {
            node.package_name = meta.package_name.clone();
        }
        match side {
            Side::Base => node.base = Some(meta.clone()),
            Side::Current => node.current = Some(meta.clone()),
        }
    }

    pub(crate) fn refresh_change_status(&mut self) {
        let indices: Vec<NodeIndex> = self.inner.node_indices().collect();
        for idx in indices {
            if let Some(node) = self.inner.node_weight_mut(idx) {
                node.refresh_change_status();
            }
        }
    }
}

/// Owned, serializable copy of (part of) a graph for renderers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphView {
    pub nodes: Vec<LineageNode>,
    pub edges: Vec<LineageEdge>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct OriginCounts {
    pub base_only: usize,
    pub current_only: usize,
    pub both: usize,
}

impl OriginCounts {
    fn add(&mut self, origin: Origin) {
        match origin {
            Origin::BaseOnly => self.base_only += 1,
            Origin::CurrentOnly => self.current_only += 1,
            Origin::Both => self.both += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.base_only + self.current_only + self.both
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct GraphSummary {
    pub nodes: OriginCounts,
    pub edges: OriginCounts,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}
