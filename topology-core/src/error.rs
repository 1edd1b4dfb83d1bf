//! Error Types
//!
//! Every fallible operation in the crate returns [`TopologyResult`].
//!
//! Structural problems found while building a graph (duplicate ids, dangling
//! references in strict mode) are fatal and reported immediately. A cyclic
//! topology is *not* an error: it is a queryable state exposed through
//! `TopologyGraph::is_acyclic` and `TopologyGraph::find_cycle`, so callers can
//! decide whether to proceed, rebuild with `allow_cycles`, or abort.

use thiserror::Error;

use crate::registry::NodeId;

/// Result type for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors that can occur while registering, building, or querying a graph.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TopologyError {
    /// An identifier was empty or carried surrounding whitespace.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidId {
        /// Which identifier kind was rejected ("node", "channel").
        kind: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// A node id was registered twice.
    #[error("duplicate node id: {id}")]
    DuplicateNode {
        /// The id that was already registered.
        id: NodeId,
    },

    /// A dependency references a node that was never registered.
    ///
    /// Only raised when the graph is built in strict mode.
    #[error("node '{node}' depends on unknown node '{dependency}'")]
    UnknownDependency {
        /// The node that declared the dependency.
        node: NodeId,
        /// The dependency id with no registered node.
        dependency: NodeId,
    },

    /// The graph was disposed and can no longer be queried.
    #[error("graph has been disposed")]
    GraphClosed,

    /// Construction options were rejected.
    #[error("invalid graph options: {reason}")]
    InvalidConfig {
        /// Why the options were rejected.
        reason: String,
    },

    /// Descriptors or options could not be decoded from JSON.
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TopologyError {
    /// Creates an invalid identifier error.
    pub fn invalid_id(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidId {
            kind,
            value: value.into(),
        }
    }

    /// Creates a duplicate node error.
    pub fn duplicate_node(id: NodeId) -> Self {
        Self::DuplicateNode { id }
    }

    /// Creates an unknown dependency error.
    pub fn unknown_dependency(node: NodeId, dependency: NodeId) -> Self {
        Self::UnknownDependency { node, dependency }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error came from using a disposed graph.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::GraphClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_ids() {
        let node = NodeId::new("emit").unwrap();
        let dep = NodeId::new("missing").unwrap();

        let err = TopologyError::unknown_dependency(node.clone(), dep);
        assert_eq!(
            err.to_string(),
            "node 'emit' depends on unknown node 'missing'"
        );

        let err = TopologyError::duplicate_node(node);
        assert_eq!(err.to_string(), "duplicate node id: emit");
    }

    #[test]
    fn closed_is_detectable() {
        assert!(TopologyError::GraphClosed.is_closed());
        assert!(!TopologyError::invalid_config("zero depth").is_closed());
    }
}
