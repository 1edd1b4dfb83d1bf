//! Route Finder
//!
//! Bounded breadth-first searches over the frozen table.
//!
//! Every search is capped by an entry count rather than by wall-clock time,
//! so it terminates even when revisits are allowed on a cyclic graph.

use std::collections::{BTreeSet, VecDeque};

use tracing::trace;

use super::record::{RouteConfig, RouteRecord, RouteState, RouteSummary};
use crate::graph::builder::{Adjacency, NodeTable};
use crate::graph::GraphOptions;
use crate::registry::{ChannelKind, NodeId, RouteId};

/// Breadth-first walk from `start`, returning at most `cap` table indices.
///
/// With `allow_revisits` a node may appear more than once; otherwise the
/// first visit wins and later ones are skipped silently.
fn bounded_bfs<F>(
    len: usize,
    start: usize,
    cap: usize,
    allow_revisits: bool,
    mut expand: F,
) -> Vec<usize>
where
    F: FnMut(usize) -> Adjacency,
{
    let mut visited = Vec::with_capacity(cap.min(len));
    let mut seen = vec![false; len];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;

    while let Some(index) = queue.pop_front() {
        if visited.len() >= cap {
            break;
        }
        visited.push(index);

        for next in expand(index) {
            if visited.len() + queue.len() >= cap {
                break;
            }
            if !allow_revisits {
                if seen[next] {
                    trace!(index = next, "skipping revisit");
                    continue;
                }
                seen[next] = true;
            }
            queue.push_back(next);
        }
    }

    visited
}

fn to_ids(table: &NodeTable, indices: Vec<usize>) -> Vec<NodeId> {
    indices
        .into_iter()
        .filter_map(|index| table.node_at(index).map(|node| node.id().clone()))
        .collect()
}

/// Dependency path from `start`, at most `max_depth` entries.
///
/// The start node is the first entry. An unregistered start yields an empty
/// path.
pub(crate) fn path(table: &NodeTable, options: &GraphOptions, start: &NodeId) -> Vec<NodeId> {
    let Some(start) = table.index_of(start) else {
        return Vec::new();
    };

    let indices = bounded_bfs(
        table.len(),
        start,
        options.max_depth,
        options.allow_cycles,
        |index| table.dependency_indices(index),
    );
    to_ids(table, indices)
}

/// Downstream route from `origin` following edges whose source carries `kind`.
fn downstream(
    table: &NodeTable,
    options: &GraphOptions,
    origin: usize,
    kind: &ChannelKind,
    cap: usize,
) -> Vec<NodeId> {
    let indices = bounded_bfs(table.len(), origin, cap, options.allow_cycles, |index| {
        match table.node_at(index) {
            Some(node) if node.metadata().carries(kind) => table.dependent_indices(index),
            _ => Adjacency::new(),
        }
    });
    to_ids(table, indices)
}

/// One record per (node, channel) pair where the node has at least one
/// outgoing edge and the channel passes the filter.
pub(crate) fn select(
    table: &NodeTable,
    options: &GraphOptions,
    config: &RouteConfig,
) -> Vec<RouteRecord> {
    let cap = config.max_depth.unwrap_or(options.max_depth).max(1);
    let mut records = Vec::new();

    for index in 0..table.len() {
        let Some(node) = table.node_at(index) else {
            continue;
        };
        if node.dependents().is_empty() {
            continue;
        }

        let metadata = node.metadata();
        let matching = metadata
            .channels
            .iter()
            .filter(|kind| config.kind.as_ref().map_or(true, |wanted| wanted == *kind));

        for kind in matching {
            records.push(RouteRecord {
                route_id: RouteId::for_route(node.id(), kind),
                kind: kind.clone(),
                node_ids: downstream(table, options, index, kind, cap),
                state: RouteState::for_capacity(metadata.concurrency),
                signals: if config.include_signals {
                    metadata.channels.clone()
                } else {
                    Vec::new()
                },
            });
        }
    }

    records
}

/// Summarize every route on `signal`.
pub(crate) fn trace_signal(
    table: &NodeTable,
    options: &GraphOptions,
    signal: &ChannelKind,
    max_depth: usize,
) -> RouteSummary {
    let config = RouteConfig::for_kind(signal.clone())
        .with_max_depth(max_depth)
        .with_signals(true);
    let records = select(table, options, &config);

    let active_kinds: BTreeSet<ChannelKind> = records
        .iter()
        .filter(|record| record.state == RouteState::Active)
        .map(|record| record.kind.clone())
        .collect();

    RouteSummary {
        route_count: records.len(),
        active_kinds: active_kinds.into_iter().collect(),
        labels: records.iter().map(RouteRecord::label).collect(),
    }
}
