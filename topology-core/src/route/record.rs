//! Route query inputs and results.

use serde::{Deserialize, Serialize};

use crate::registry::{ChannelKind, NodeId, RouteId};

/// Whether a route's origin has capacity to propagate right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteState {
    /// The origin declares no capacity.
    Pending,
    /// The origin declares positive capacity.
    Active,
}

impl RouteState {
    pub(crate) fn for_capacity(concurrency: u32) -> Self {
        if concurrency > 0 {
            Self::Active
        } else {
            Self::Pending
        }
    }
}

/// Filter for `TopologyGraph::select`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Only routes on this channel. `None` matches every channel.
    pub kind: Option<ChannelKind>,
    /// Per-query cap on route length; falls back to the graph's `max_depth`.
    pub max_depth: Option<usize>,
    /// Whether records carry the origin's full channel list.
    pub include_signals: bool,
}

impl RouteConfig {
    /// Match every channel.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match a single channel.
    pub fn for_kind(kind: ChannelKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Override the graph's `max_depth` for this query.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Include the origin's channel list in every record.
    pub fn with_signals(mut self, include_signals: bool) -> Self {
        self.include_signals = include_signals;
        self
    }
}

/// A downstream route from one origin node along one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    /// `origin:kind`.
    pub route_id: RouteId,
    /// The channel this route follows.
    pub kind: ChannelKind,
    /// The origin first, then reachable dependents in BFS order.
    pub node_ids: Vec<NodeId>,
    /// Whether the origin has capacity.
    pub state: RouteState,
    /// The origin's channels; empty unless requested.
    pub signals: Vec<ChannelKind>,
}

impl RouteRecord {
    /// The route's origin node.
    pub fn origin(&self) -> Option<&NodeId> {
        self.node_ids.first()
    }

    /// Render the route as `a -> b -> c`.
    pub fn label(&self) -> String {
        self.node_ids
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Aggregate view of the routes on one signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    /// Number of routes selected.
    pub route_count: usize,
    /// Distinct kinds with at least one active route, sorted.
    pub active_kinds: Vec<ChannelKind>,
    /// One label per route, in selection order.
    pub labels: Vec<String>,
}
