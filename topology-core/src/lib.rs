//! Topology Core
//!
//! This crate provides the dependency topology engine for plugin
//! orchestration graphs. It implements:
//!
//! - A node registry keyed by unique plugin id
//! - A frozen dependency graph with forward and reverse edges
//! - Cycle detection and topological execution ordering
//! - Bounded path and signal-route traversal
//! - Read-only snapshots and summaries for diagnostics
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `registry`: Node identity, descriptors, and the registration store
//! - `graph`: Graph construction, cycle detection, ordering, and lifecycle
//! - `route`: Dependency paths and channel-filtered route queries
//! - `snapshot`: Owned exports of graph state
//! - `error`: The crate-wide error type
//!
//! # Example
//!
//! ```rust
//! use topology_core::graph::{GraphOptions, TopologyGraph};
//! use topology_core::registry::{NodeDescriptor, NodeId};
//!
//! let graph = TopologyGraph::build(
//!     vec![
//!         NodeDescriptor::parse("ingest", &[]).unwrap(),
//!         NodeDescriptor::parse("normalize", &["ingest"]).unwrap(),
//!         NodeDescriptor::parse("emit", &["normalize"]).unwrap(),
//!     ],
//!     GraphOptions::default(),
//! )
//! .unwrap();
//!
//! // Dependencies come before the nodes that need them.
//! let plan = graph.order().unwrap();
//! assert_eq!(plan.position(&NodeId::new("ingest").unwrap()), Some(0));
//!
//! // Walk back from a node to everything it needs.
//! let path = graph.get_path(&NodeId::new("emit").unwrap()).unwrap();
//! assert_eq!(path.len(), 3);
//! ```

pub mod error;
pub mod graph;
pub mod registry;
pub mod route;
pub mod snapshot;

pub use error::{TopologyError, TopologyResult};
pub use graph::{ExecutionOrder, GraphOptions, OrderingPolicy, TopologyGraph};
pub use registry::{ChannelKind, NodeDescriptor, NodeId, NodeMetadata, NodeRegistry};
pub use route::{RouteConfig, RouteRecord, RouteState, RouteSummary};
pub use snapshot::{GraphSummary, Snapshot};
