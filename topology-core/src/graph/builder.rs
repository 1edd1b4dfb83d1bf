//! Graph Builder
//!
//! Turns a list of descriptors into the frozen node table every query runs
//! against.
//!
//! # Algorithm
//!
//! 1. Insert every descriptor as a [`Node`], keyed by id, in insertion order.
//! 2. Walk every node's declared dependencies once. A dependency with a
//!    registered node becomes an [`Edge`] and a pending dependent link; one
//!    without becomes a [`DanglingReference`].
//! 3. Apply the pending links, appending each node to its dependencies'
//!    `dependents` sets.
//!
//! Both passes touch each node and each declared dependency once, so the
//! build is O(N + E).

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::node::{Edge, Node};
use super::options::GraphOptions;
use crate::error::{TopologyError, TopologyResult};
use crate::registry::{NodeDescriptor, NodeId};

/// Adjacency list of table indices. Most plugins declare a handful of
/// dependencies, so this rarely spills to the heap.
pub(crate) type Adjacency = SmallVec<[usize; 4]>;

/// A dependency id that names no registered node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DanglingReference {
    /// The node that declared the dependency.
    pub node: NodeId,
    /// The id with no registered node.
    pub dependency: NodeId,
}

/// The frozen arena of nodes and edges.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeTable {
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
    dangling: Vec<DanglingReference>,
}

impl NodeTable {
    /// Build a table from descriptors in the order given.
    pub(crate) fn build(
        descriptors: Vec<Arc<NodeDescriptor>>,
        options: &GraphOptions,
    ) -> TopologyResult<Self> {
        let mut nodes: IndexMap<NodeId, Node> = IndexMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let id = descriptor.id().clone();
            if nodes.contains_key(&id) {
                return Err(TopologyError::duplicate_node(id));
            }
            nodes.insert(id, Node::from_descriptor(descriptor));
        }

        let mut edges = Vec::new();
        let mut dangling = Vec::new();
        let mut links: Vec<(usize, NodeId)> = Vec::new();

        for node in nodes.values() {
            for dependency in node.dependencies() {
                match nodes.get_index_of(dependency) {
                    Some(index) => {
                        edges.push(Edge::new(dependency.clone(), node.id().clone()));
                        links.push((index, node.id().clone()));
                    }
                    None if options.strict => {
                        return Err(TopologyError::unknown_dependency(
                            node.id().clone(),
                            dependency.clone(),
                        ));
                    }
                    None => {
                        warn!(
                            node = %node.id(),
                            dependency = %dependency,
                            "dependency references an unregistered node"
                        );
                        dangling.push(DanglingReference {
                            node: node.id().clone(),
                            dependency: dependency.clone(),
                        });
                    }
                }
            }
        }

        for (index, dependent) in links {
            if let Some((_, node)) = nodes.get_index_mut(index) {
                node.add_dependent(dependent);
            }
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            dangling = dangling.len(),
            "built topology table"
        );

        Ok(Self {
            nodes,
            edges,
            dangling,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub(crate) fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub(crate) fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub(crate) fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get_index(index).map(|(_, node)| node)
    }

    pub(crate) fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Indices of the registered dependencies of the node at `index`.
    pub(crate) fn dependency_indices(&self, index: usize) -> Adjacency {
        self.node_at(index)
            .map(|node| {
                node.dependencies()
                    .iter()
                    .filter_map(|dep| self.index_of(dep))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Indices of the dependents of the node at `index`.
    pub(crate) fn dependent_indices(&self, index: usize) -> Adjacency {
        self.node_at(index)
            .map(|node| {
                node.dependents()
                    .iter()
                    .filter_map(|dep| self.index_of(dep))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes with no registered dependencies.
    pub(crate) fn roots(&self) -> Vec<NodeId> {
        (0..self.len())
            .filter(|&i| self.dependency_indices(i).is_empty())
            .filter_map(|i| self.node_at(i).map(|n| n.id().clone()))
            .collect()
    }

    /// Nodes nothing depends on.
    pub(crate) fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.dependents().is_empty())
            .map(|node| node.id().clone())
            .collect()
    }

    /// Nodes with no edge in either direction.
    pub(crate) fn detached(&self) -> Vec<NodeId> {
        (0..self.len())
            .filter(|&i| {
                self.dependency_indices(i).is_empty() && self.dependent_indices(i).is_empty()
            })
            .filter_map(|i| self.node_at(i).map(|n| n.id().clone()))
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.dangling.clear();
    }
}
