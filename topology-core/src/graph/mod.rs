//! Dependency Graph
//!
//! This module builds and queries the frozen dependency topology of a set of
//! plugin nodes.
//!
//! # Overview
//!
//! The topology is a directed graph where:
//!
//! - Nodes represent registered plugins
//! - Edges represent dependencies: if A depends on B, there is an edge from B to A
//!
//! The graph is built once from descriptors and never mutated afterwards.
//! Queries (ordering, cycle checks, paths, routes) all run over that frozen
//! table and hand back owned copies.
//!
//! # Design Decisions
//!
//! 1. Nodes live in an insertion-ordered arena so every traversal is
//!    deterministic for a given descriptor order.
//!
//! 2. The table is indexed by node id for O(1) lookups, and algorithms work
//!    over dense indices rather than hashing ids in their inner loops.
//!
//! 3. We maintain both forward (dependencies) and reverse (dependents) edges
//!    to enable efficient traversal in both directions.
//!
//! 4. A dependency on an unregistered id is kept on the node but produces no
//!    edge. Strict mode turns it into a build error instead.

pub(crate) mod builder;
pub(crate) mod cycle;
mod node;
mod options;
mod resource;
mod scheduler;
mod topology;

pub use builder::DanglingReference;
pub use node::{Edge, Node};
pub use options::{GraphOptions, OrderingPolicy, DEFAULT_MAX_DEPTH};
pub use resource::{AsyncTeardown, Teardown};
pub use scheduler::ExecutionOrder;
pub use topology::TopologyGraph;
