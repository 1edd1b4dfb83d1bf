//! Route Discovery
//!
//! Answers "what is reachable from X via signal Y within depth D".
//!
//! # Overview
//!
//! - `get_path` walks *upstream*, through a node's dependencies, and is used
//!   to explain what a node needs.
//! - `select` walks *downstream*, through dependents, along edges whose
//!   source node carries the requested channel. A node's channels label every
//!   one of its outgoing edges.
//! - `trace` rolls a `select` up into a [`RouteSummary`] for diagnostics.
//!
//! All searches are breadth-first and capped by an entry count, never by
//! time. Results are owned values produced per query and never cached.

pub(crate) mod finder;
mod record;

pub use record::{RouteConfig, RouteRecord, RouteState, RouteSummary};
