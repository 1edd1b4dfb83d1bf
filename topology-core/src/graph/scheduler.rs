//! Execution Ordering
//!
//! The scheduler linearizes the frozen table into an execution order.
//!
//! # Algorithm
//!
//! Both ordering policies share one Kahn loop and differ only in how the
//! in-degree table is seeded:
//!
//! 1. Seed `in_degree` per [`OrderingPolicy`]:
//!    - `PrerequisitesFirst`: number of registered dependencies of the node
//!    - `DependentsFirst`: number of dependents of the node
//! 2. Queue every node whose in-degree is zero, in insertion order
//! 3. Pop a node and place it; for each of its dependents with a positive
//!    in-degree, decrement it, record the consumed edge, and queue the
//!    dependent once it reaches zero
//! 4. If detached nodes are included, append every unplaced node in
//!    insertion order
//!
//! Nodes on a cycle never reach zero and only show up through step 4, which
//! is why the order is non-authoritative for cyclic graphs.

use std::collections::VecDeque;

use tracing::debug;

use super::builder::NodeTable;
use super::node::{Edge, Node};
use super::options::{GraphOptions, OrderingPolicy};
use crate::registry::NodeId;
use crate::route::finder;

/// Result of [`TopologyGraph::order`](super::TopologyGraph::order).
#[derive(Debug, Clone)]
pub struct ExecutionOrder {
    /// Nodes in execution order.
    pub ordered: Vec<Node>,
    /// Edges consumed while propagating, as `(dependency, dependent)`.
    pub matrix: Vec<Edge>,
    /// `paths[i]` is the dependency path of `ordered[i]`.
    pub paths: Vec<Vec<NodeId>>,
}

impl ExecutionOrder {
    /// Ids of the ordered nodes.
    pub fn ids(&self) -> Vec<NodeId> {
        self.ordered.iter().map(|node| node.id().clone()).collect()
    }

    /// Position of a node in the order.
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.ordered.iter().position(|node| node.id() == id)
    }
}

fn seed_in_degrees(table: &NodeTable, policy: OrderingPolicy) -> Vec<usize> {
    let mut in_degree = vec![0usize; table.len()];

    for index in 0..table.len() {
        let dependencies = table.dependency_indices(index);
        match policy {
            OrderingPolicy::PrerequisitesFirst => in_degree[index] = dependencies.len(),
            OrderingPolicy::DependentsFirst => {
                for dependency in dependencies {
                    in_degree[dependency] += 1;
                }
            }
        }
    }

    in_degree
}

/// Linearize the table per `options`.
pub(crate) fn order(table: &NodeTable, options: &GraphOptions) -> ExecutionOrder {
    let mut in_degree = seed_in_degrees(table, options.ordering);
    let mut placed = vec![false; table.len()];
    let mut sequence = Vec::with_capacity(table.len());
    let mut matrix = Vec::new();

    let mut queue: VecDeque<usize> = (0..table.len())
        .filter(|&index| in_degree[index] == 0)
        .collect();

    // Kahn's algorithm
    while let Some(index) = queue.pop_front() {
        if placed[index] {
            continue;
        }
        placed[index] = true;
        sequence.push(index);

        for dependent in table.dependent_indices(index) {
            let degree = &mut in_degree[dependent];
            if *degree == 0 {
                continue;
            }
            *degree -= 1;

            if let (Some(from), Some(to)) = (table.node_at(index), table.node_at(dependent)) {
                matrix.push(Edge::new(from.id().clone(), to.id().clone()));
            }
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    let propagated = sequence.len();
    if options.include_detached {
        sequence.extend((0..table.len()).filter(|&index| !placed[index]));
    }

    debug!(
        policy = ?options.ordering,
        propagated,
        appended = sequence.len() - propagated,
        consumed_edges = matrix.len(),
        "computed execution order"
    );

    let ordered: Vec<Node> = sequence
        .iter()
        .filter_map(|&index| table.node_at(index).cloned())
        .collect();
    let paths = ordered
        .iter()
        .map(|node| finder::path(table, options, node.id()))
        .collect();

    ExecutionOrder {
        ordered,
        matrix,
        paths,
    }
}
