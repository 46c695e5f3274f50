//! Reachability and set algebra over a merged graph, plus selector expressions

use std::collections::{BTreeSet, VecDeque};
use std::str::FromStr;

use crate::error::LineageError;
use crate::graph::Graph;
use crate::model::NodeId;

/// A set of node ids with stable iteration order.
pub type NodeSet = BTreeSet<NodeId>;

/// Which edges a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards parents.
    Upstream,
    /// Towards children.
    Downstream,
}

/// Every id reachable from `seeds` in `direction`, seeds included.
///
/// Seeds that are not in the graph are returned as-is. Cycles are fine:
/// each id is expanded at most once.
pub fn neighbor_set<I>(graph: &Graph, seeds: I, direction: Direction) -> NodeSet
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut visited = NodeSet::new();
    let mut queue = VecDeque::new();

    for seed in seeds {
        let id = NodeId::from(seed.as_ref());
        if !graph.contains(id.as_str()) {
            tracing::debug!("Selection seed {} is not in the graph", id);
        }
        if visited.insert(id.clone()) {
            queue.push_back(id);
        }
    }

    while let Some(current) = queue.pop_front() {
        for neighbor in graph.neighbors(current.as_str(), direction) {
            if visited.insert(neighbor.id.clone()) {
                queue.push_back(neighbor.id.clone());
            }
        }
    }

    tracing::trace!("{:?} neighbor set has {} ids", direction, visited.len());
    visited
}

pub fn select_upstream<I>(graph: &Graph, seeds: I) -> NodeSet
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    neighbor_set(graph, seeds, Direction::Upstream)
}

pub fn select_downstream<I>(graph: &Graph, seeds: I) -> NodeSet
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    neighbor_set(graph, seeds, Direction::Downstream)
}

pub fn union(a: &NodeSet, b: &NodeSet) -> NodeSet {
    a.union(b).cloned().collect()
}

pub fn intersect(a: &NodeSet, b: &NodeSet) -> NodeSet {
    a.intersection(b).cloned().collect()
}

// ── Selector expressions ────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Method {
    Name(String),
    StateModified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Atom {
    method: Method,
    upstream: bool,
    downstream: bool,
}

impl Atom {
    fn resolve(&self, graph: &Graph) -> NodeSet {
        let seeds: NodeSet = match &self.method {
            Method::Name(name) if graph.contains(name) => {
                NodeSet::from([NodeId::from(name.as_str())])
            }
            Method::Name(name) => {
                tracing::debug!("Selector matched no node named {}", name);
                NodeSet::new()
            }
            Method::StateModified => graph.modified_set(),
        };

        let mut selected = seeds.clone();
        if self.upstream {
            selected = union(&selected, &select_upstream(graph, &seeds));
        }
        if self.downstream {
            selected = union(&selected, &select_downstream(graph, &seeds));
        }
        selected
    }
}

/// A dbt-style node selector.
///
/// Whitespace-separated terms are unioned; comma-joined atoms within a term
/// are intersected. An atom is a node id or `state:modified`, optionally
/// prefixed with `+` (also select upstream) and/or suffixed with `+` (also
/// select downstream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    terms: Vec<Vec<Atom>>,
}

impl Selector {
    pub fn resolve(&self, graph: &Graph) -> NodeSet {
        let selected = self
            .terms
            .iter()
            .map(|term| {
                term.iter()
                    .map(|atom| atom.resolve(graph))
                    .reduce(|acc, set| intersect(&acc, &set))
                    .unwrap_or_default()
            })
            .fold(NodeSet::new(), |acc, set| union(&acc, &set));

        tracing::debug!("Selector resolved to {} nodes", selected.len());
        selected
    }
}

impl FromStr for Selector {
    type Err = LineageError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| LineageError::InvalidSelector {
            selector: expr.to_string(),
            reason: reason.to_string(),
        };

        let mut terms = Vec::new();
        for term in expr.split_whitespace() {
            let mut atoms = Vec::new();
            for raw in term.split(',') {
                let upstream = raw.starts_with('+');
                let body = raw.strip_prefix('+').unwrap_or(raw);
                let downstream = body.ends_with('+');
                let body = body.strip_suffix('+').unwrap_or(body);
                if body.is_empty() {
                    return Err(invalid("empty selector atom"));
                }

                let method = match body.split_once(':') {
                    Some(("state", "modified")) => Method::StateModified,
                    Some((method, value)) => {
                        return Err(invalid(&format!("unsupported method `{method}:{value}`")));
                    }
                    None => Method::Name(body.to_string()),
                };
                atoms.push(Atom {
                    method,
                    upstream,
                    downstream,
                });
            }
            terms.push(atoms);
        }

        if terms.is_empty() {
            return Err(invalid("empty expression"));
        }
        Ok(Selector { terms })
    }
}
