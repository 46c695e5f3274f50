//! Core data structures for the merged lineage graph

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::snapshot::NodeMetadata;

/// Resource identifier, unique within one graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

/// Composite edge identity: the ordered `(parent, child)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub parent: NodeId,
    pub child: NodeId,
}

impl EdgeKey {
    pub fn new(parent: impl Into<NodeId>, child: impl Into<NodeId>) -> Self {
        EdgeKey {
            parent: parent.into(),
            child: child.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.parent == self.child
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.parent, self.child)
    }
}

/// Which snapshot an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Base,
    Current,
}

/// Provenance of a node or edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    BaseOnly,
    CurrentOnly,
    Both,
}

impl Origin {
    pub fn from_side(side: Side) -> Self {
        match side {
            Side::Base => Origin::BaseOnly,
            Side::Current => Origin::CurrentOnly,
        }
    }

    /// Fold another sighting into this origin. Never leaves `Both`.
    pub fn observe(self, side: Side) -> Self {
        match (self, side) {
            (Origin::BaseOnly, Side::Current) | (Origin::CurrentOnly, Side::Base) => Origin::Both,
            (origin, _) => origin,
        }
    }
}

/// Resource-level change derived from origin and checksums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Removed,
    Modified,
}

/// A single resource in the merged lineage graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineageNode {
    pub id: NodeId,
    pub name: String,
    pub origin: Origin,
    /// Only ever seen as somebody's parent, never as a child key.
    pub inferred: bool,
    pub resource_type: Option<String>,
    pub package_name: Option<String>,
    pub change_status: Option<ChangeStatus>,
    pub base: Option<NodeMetadata>,
    pub current: Option<NodeMetadata>,
    /// Parent id -> connecting edge.
    pub parents: BTreeMap<NodeId, EdgeKey>,
    /// Child id -> connecting edge.
    pub children: BTreeMap<NodeId, EdgeKey>,
}

impl LineageNode {
    pub(crate) fn new(id: NodeId, origin: Origin, inferred: bool) -> Self {
        LineageNode {
            name: id.0.clone(),
            id,
            origin,
            inferred,
            resource_type: None,
            package_name: None,
            change_status: None,
            base: None,
            current: None,
            parents: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    /// Recompute `change_status` from origin and per-side checksums.
    pub(crate) fn refresh_change_status(&mut self) {
        self.change_status = match self.origin {
            Origin::BaseOnly => Some(ChangeStatus::Removed),
            Origin::CurrentOnly => Some(ChangeStatus::Added),
            Origin::Both => {
                let base = self.base.as_ref().and_then(|m| m.checksum.as_deref());
                let current = self.current.as_ref().and_then(|m| m.checksum.as_deref());
                match (base, current) {
                    (Some(b), Some(c)) if b != c => Some(ChangeStatus::Modified),
                    _ => None,
                }
            }
        };
    }
}

/// A directed parent -> child dependency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineageEdge {
    /// `"parent->child"`.
    pub id: String,
    pub key: EdgeKey,
    pub origin: Origin,
}

impl LineageEdge {
    pub(crate) fn new(key: EdgeKey, origin: Origin) -> Self {
        LineageEdge {
            id: key.to_string(),
            key,
            origin,
        }
    }

    pub fn parent(&self) -> &NodeId {
        &self.key.parent
    }

    pub fn child(&self) -> &NodeId {
        &self.key.child
    }
}
