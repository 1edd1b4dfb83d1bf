//! Node Registry
//!
//! Collaborators describe their plugins as [`NodeDescriptor`]s. The registry
//! is the staging area where descriptors are collected and checked for id
//! uniqueness before a `TopologyGraph` is built from them.
//!
//! # Overview
//!
//! - [`NodeId`] and [`ChannelKind`] are validated newtypes; an empty or
//!   whitespace-padded id never makes it past construction.
//! - [`NodeRegistry`] rejects a second registration of the same id rather
//!   than merging it.
//! - Dependency ids are *not* checked here. A descriptor may name a node that
//!   is registered later, or never; the graph builder decides what to do with
//!   such dangling references.

mod descriptor;
mod store;

pub use descriptor::{ChannelKind, NodeDescriptor, NodeId, NodeMetadata, RouteId};
pub use store::NodeRegistry;
