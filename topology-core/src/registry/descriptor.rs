//! Identifiers and Node Descriptors
//!
//! This module defines the caller-supplied side of the engine: validated
//! identifier newtypes and the immutable descriptor each plugin hands in.
//!
//! Identifiers are checked once, at construction. Everything downstream can
//! then treat a `NodeId` or `ChannelKind` as known-good without re-validating
//! raw strings, and the two kinds can never be confused for each other.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TopologyError, TopologyResult};

fn validate(kind: &'static str, raw: &str) -> TopologyResult<Arc<str>> {
    if raw.is_empty() || raw.trim() != raw {
        return Err(TopologyError::invalid_id(kind, raw));
    }
    Ok(Arc::from(raw))
}

/// Unique identifier for a node in the topology.
///
/// Cloning is cheap: the string is shared.
///
/// # Examples
///
/// ```
/// use topology_core::registry::NodeId;
///
/// let id = NodeId::new("normalize").unwrap();
/// assert_eq!(id.as_str(), "normalize");
/// assert!(NodeId::new("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create a node id, rejecting empty or whitespace-padded values.
    pub fn new(raw: impl AsRef<str>) -> TopologyResult<Self> {
        validate("node", raw.as_ref()).map(Self)
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl TryFrom<String> for NodeId {
    type Error = TopologyError;

    fn try_from(raw: String) -> TopologyResult<Self> {
        Self::new(raw)
    }
}

impl TryFrom<&str> for NodeId {
    type Error = TopologyError;

    fn try_from(raw: &str) -> TopologyResult<Self> {
        Self::new(raw)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0.to_string()
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A channel (signal kind) label carried on a node's outgoing edges.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelKind(Arc<str>);

impl ChannelKind {
    /// Create a channel label, rejecting empty or whitespace-padded values.
    pub fn new(raw: impl AsRef<str>) -> TopologyResult<Self> {
        validate("channel", raw.as_ref()).map(Self)
    }

    /// Get the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelKind({})", self.0)
    }
}

impl TryFrom<String> for ChannelKind {
    type Error = TopologyError;

    fn try_from(raw: String) -> TopologyResult<Self> {
        Self::new(raw)
    }
}

impl From<ChannelKind> for String {
    fn from(kind: ChannelKind) -> Self {
        kind.0.to_string()
    }
}

/// Identifier of a route produced by a query.
///
/// Route ids are always derived by the engine from the route's origin node
/// and channel, so there is no public fallible constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    pub(crate) fn for_route(origin: &NodeId, kind: &ChannelKind) -> Self {
        Self(format!("{origin}:{kind}"))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque payload attached to a descriptor.
///
/// Only `concurrency` and `channels` influence the engine (route state and
/// route filtering). The rest travels through to snapshots untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetadata {
    /// Display name.
    pub name: Option<String>,
    /// Logical namespace the plugin belongs to.
    pub namespace: Option<String>,
    /// Relative weight; informational.
    pub weight: f64,
    /// Declared capacity. Routes out of a node with zero capacity are pending.
    pub concurrency: u32,
    /// Signal kinds this node propagates on its outgoing edges.
    pub channels: Vec<ChannelKind>,
    /// Free-form attributes.
    pub attributes: Map<String, Value>,
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            name: None,
            namespace: None,
            weight: 1.0,
            concurrency: 0,
            channels: Vec::new(),
            attributes: Map::new(),
        }
    }
}

impl NodeMetadata {
    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the declared capacity.
    pub fn with_concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Add a channel. Adding the same channel twice has no effect.
    pub fn with_channel(mut self, kind: ChannelKind) -> Self {
        if !self.channels.contains(&kind) {
            self.channels.push(kind);
        }
        self
    }

    /// Set a free-form attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Check whether this node propagates the given channel.
    pub fn carries(&self, kind: &ChannelKind) -> bool {
        self.channels.contains(kind)
    }
}

/// An immutable description of one plugin/node supplied by a collaborator.
///
/// # Examples
///
/// ```
/// use topology_core::registry::{NodeDescriptor, NodeId};
///
/// let emit = NodeDescriptor::new(NodeId::new("emit").unwrap())
///     .depends_on(NodeId::new("normalize").unwrap());
/// assert_eq!(emit.dependency_ids().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    id: NodeId,
    #[serde(default, alias = "dependencyIds")]
    dependency_ids: Vec<NodeId>,
    #[serde(default)]
    metadata: NodeMetadata,
}

impl NodeDescriptor {
    /// Create a descriptor with no dependencies and default metadata.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            dependency_ids: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    /// Create a descriptor from raw strings, validating every id.
    pub fn parse(id: &str, dependency_ids: &[&str]) -> TopologyResult<Self> {
        let mut descriptor = Self::new(NodeId::new(id)?);
        for dep in dependency_ids {
            descriptor = descriptor.depends_on(NodeId::new(dep)?);
        }
        Ok(descriptor)
    }

    /// Declare a prerequisite.
    pub fn depends_on(mut self, dependency: NodeId) -> Self {
        self.dependency_ids.push(dependency);
        self
    }

    /// Replace the metadata payload.
    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Decode a list of descriptors from a JSON array.
    pub fn list_from_json(json: &str) -> TopologyResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the node id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Get the declared prerequisites, as supplied.
    pub fn dependency_ids(&self) -> &[NodeId] {
        &self.dependency_ids
    }

    /// Get the metadata payload.
    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }

    /// Check whether this descriptor declares `id` as a prerequisite.
    pub fn depends_on_id(&self, id: &NodeId) -> bool {
        self.dependency_ids.contains(id)
    }
}
