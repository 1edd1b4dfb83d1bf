//! Graph Nodes
//!
//! This module defines the node and edge types that live in the topology
//! table.

use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;

use crate::registry::{NodeDescriptor, NodeId, NodeMetadata};

/// A directed dependency edge: `from` is a dependency of `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    /// The prerequisite.
    pub from: NodeId,
    /// The node that declared the prerequisite.
    pub to: NodeId,
}

impl Edge {
    /// Create an edge from a dependency to its dependent.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

/// A node in the topology table.
///
/// Both directions are stored as id sets rather than references to other
/// nodes, so the table never holds reference cycles even when the topology
/// itself is cyclic.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for this node.
    id: NodeId,

    /// Nodes this node declares as prerequisites, in declaration order.
    /// May include ids with no registered node (dangling references).
    dependencies: IndexSet<NodeId>,

    /// Nodes that declare this node as a prerequisite.
    /// Derived by the builder, never supplied by callers.
    dependents: IndexSet<NodeId>,

    /// The descriptor this node was built from.
    descriptor: Arc<NodeDescriptor>,
}

impl Node {
    /// Create a node from a descriptor. Repeated dependency ids collapse.
    pub(crate) fn from_descriptor(descriptor: Arc<NodeDescriptor>) -> Self {
        Self {
            id: descriptor.id().clone(),
            dependencies: descriptor.dependency_ids().iter().cloned().collect(),
            dependents: IndexSet::new(),
            descriptor,
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Get all declared dependencies, including dangling ones.
    pub fn dependencies(&self) -> &IndexSet<NodeId> {
        &self.dependencies
    }

    /// Get all dependents.
    pub fn dependents(&self) -> &IndexSet<NodeId> {
        &self.dependents
    }

    /// Get the descriptor this node was built from.
    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    /// Get the descriptor's metadata.
    pub fn metadata(&self) -> &NodeMetadata {
        self.descriptor.metadata()
    }

    /// Check whether this node declares `id` as a dependency.
    pub fn depends_on(&self, id: &NodeId) -> bool {
        self.dependencies.contains(id)
    }

    /// Add a dependent (a node that declares this one as a prerequisite).
    pub(crate) fn add_dependent(&mut self, node_id: NodeId) {
        self.dependents.insert(node_id);
    }

    pub(crate) fn shared_descriptor(&self) -> Arc<NodeDescriptor> {
        Arc::clone(&self.descriptor)
    }
}
