//! Snapshots and Summaries
//!
//! Read-only exports of graph state for diagnostics and logging. Both types
//! are built from owned copies, so holding one never pins or exposes the
//! graph's internal table.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::TopologyResult;
use crate::graph::builder::NodeTable;
use crate::graph::cycle;
use crate::registry::{NodeDescriptor, NodeId};

/// One node as seen in a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Copy of the node's descriptor.
    pub descriptor: NodeDescriptor,
    /// Always `true` for a node present in a live graph.
    pub active: bool,
}

/// Insertion-ordered, read-only map of every node in the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    nodes: IndexMap<NodeId, NodeSnapshot>,
}

impl Snapshot {
    pub(crate) fn capture(table: &NodeTable) -> Self {
        let nodes = table
            .nodes()
            .map(|node| {
                (
                    node.id().clone(),
                    NodeSnapshot {
                        descriptor: node.descriptor().clone(),
                        active: true,
                    },
                )
            })
            .collect();
        Self { nodes }
    }

    /// Look up one node.
    pub fn get(&self, id: &NodeId) -> Option<&NodeSnapshot> {
        self.nodes.get(id)
    }

    /// Check whether a node is present.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the snapshot holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeSnapshot)> {
        self.nodes.iter()
    }

    /// Render as a JSON object keyed by node id.
    pub fn to_json(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Position of one node in a [`GraphSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub id: NodeId,
    /// Insertion position.
    pub index: usize,
}

/// Compact description of a graph for logs and telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    /// Whether the graph has no dependency cycle.
    pub acyclic: bool,
    /// Number of nodes.
    pub size: usize,
    /// One entry per node, in insertion order.
    pub trace: Vec<TraceEntry>,
}

impl GraphSummary {
    pub(crate) fn capture(table: &NodeTable) -> Self {
        let summary = Self {
            acyclic: cycle::is_acyclic(table),
            size: table.len(),
            trace: table
                .ids()
                .into_iter()
                .enumerate()
                .map(|(index, id)| TraceEntry { id, index })
                .collect(),
        };
        debug!(acyclic = summary.acyclic, size = summary.size, "summarized topology");
        summary
    }

    /// Render as compact JSON.
    pub fn to_json(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
