//! Construction Options
//!
//! Options are passed explicitly into every graph. There is no process-wide
//! default registry to consult.

use serde::{Deserialize, Serialize};

use crate::error::{TopologyError, TopologyResult};

/// Default cap on path and route lengths.
pub const DEFAULT_MAX_DEPTH: usize = 12;

/// Which direction `TopologyGraph::order` linearizes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Conventional prerequisite-first ordering.
    ///
    /// Indegree counts a node's registered dependencies, so every dependency
    /// is placed before its dependents. For `A depends on B` this yields
    /// `[B, A]`.
    #[default]
    PrerequisitesFirst,

    /// Nodes with the fewest dependents come first.
    ///
    /// Indegree counts a node's *dependents*, the queue is seeded with nodes
    /// nobody depends on, and propagation walks toward dependents. A seeded
    /// node has no dependents, so propagation never advances past the seeds:
    /// the result is every leaf in insertion order, followed (when detached
    /// nodes are included) by everything else in insertion order. For
    /// `A depends on B` this yields `[A, B]`.
    DependentsFirst,
}

/// Options fixed at graph construction.
///
/// # Examples
///
/// ```
/// use topology_core::graph::{GraphOptions, OrderingPolicy};
///
/// let options = GraphOptions::default()
///     .with_max_depth(4)
///     .with_ordering(OrderingPolicy::DependentsFirst);
/// assert!(options.include_detached);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Maximum number of entries in a path or route.
    pub max_depth: usize,
    /// Whether path traversal may revisit nodes.
    pub allow_cycles: bool,
    /// Whether nodes unreached by ordering propagation are appended.
    pub include_detached: bool,
    /// Whether a dangling dependency reference fails the build.
    pub strict: bool,
    /// Ordering direction.
    pub ordering: OrderingPolicy,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_cycles: false,
            include_detached: true,
            strict: false,
            ordering: OrderingPolicy::default(),
        }
    }
}

impl GraphOptions {
    /// Decode options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> TopologyResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check the options for values the engine cannot honor.
    pub fn validate(&self) -> TopologyResult<()> {
        if self.max_depth == 0 {
            return Err(TopologyError::invalid_config("max_depth must be at least 1"));
        }
        Ok(())
    }

    /// Set the path and route length cap.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Allow path traversal to revisit nodes.
    pub fn with_allow_cycles(mut self, allow_cycles: bool) -> Self {
        self.allow_cycles = allow_cycles;
        self
    }

    /// Append nodes unreached by ordering propagation.
    pub fn with_include_detached(mut self, include_detached: bool) -> Self {
        self.include_detached = include_detached;
        self
    }

    /// Fail the build on dangling dependency references.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the ordering direction.
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }
}
