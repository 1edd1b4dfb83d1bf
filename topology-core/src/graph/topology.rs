//! Topology Graph Handle
//!
//! [`TopologyGraph`] is the public face of the engine. It owns the frozen
//! node table, any sub-resources attached to it, and the disposal contract.
//!
//! # Lifecycle
//!
//! 1. Build once from a fixed descriptor list (or a prepared registry).
//! 2. Query freely; every query works on the frozen table and returns owned
//!    copies.
//! 3. Dispose with [`TopologyGraph::dispose`] or [`TopologyGraph::close`].
//!    Both are idempotent. Dropping an undisposed graph disposes it.
//!
//! After disposal every query fails with `GraphClosed`.
//!
//! # Thread Safety
//!
//! The handle is `Send + Sync`. The table sits behind a read-write lock so a
//! graph shared through an `Arc` can be disposed from any holder while other
//! holders only ever see either the full table or `GraphClosed`.

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::builder::{DanglingReference, NodeTable};
use super::cycle;
use super::node::{Edge, Node};
use super::options::GraphOptions;
use super::resource::{AsyncTeardown, ResourceSet, Teardown};
use super::scheduler::{self, ExecutionOrder};
use crate::error::{TopologyError, TopologyResult};
use crate::registry::{ChannelKind, NodeDescriptor, NodeId, NodeRegistry};
use crate::route::finder;
use crate::route::{RouteConfig, RouteRecord, RouteSummary};
use crate::snapshot::{GraphSummary, Snapshot};

/// An immutable dependency topology built from node descriptors.
///
/// # Example
///
/// ```
/// use topology_core::graph::{GraphOptions, TopologyGraph};
/// use topology_core::registry::NodeDescriptor;
///
/// let graph = TopologyGraph::build(
///     vec![
///         NodeDescriptor::parse("ingest", &[]).unwrap(),
///         NodeDescriptor::parse("normalize", &["ingest"]).unwrap(),
///         NodeDescriptor::parse("emit", &["normalize"]).unwrap(),
///     ],
///     GraphOptions::default(),
/// )
/// .unwrap();
///
/// assert!(graph.is_acyclic().unwrap());
/// let order: Vec<String> = graph
///     .order_ids()
///     .unwrap()
///     .into_iter()
///     .map(String::from)
///     .collect();
/// assert_eq!(order, ["ingest", "normalize", "emit"]);
///
/// graph.dispose();
/// assert!(graph.nodes().is_err());
/// ```
#[derive(Debug)]
pub struct TopologyGraph {
    options: GraphOptions,
    table: RwLock<Option<NodeTable>>,
    resources: Mutex<ResourceSet>,
}

impl TopologyGraph {
    /// Build a graph from descriptors.
    ///
    /// Fails with `DuplicateNode` on the first repeated id, with
    /// `UnknownDependency` on a dangling reference in strict mode, and with
    /// `InvalidConfig` if the options are unusable. A cycle does not fail the
    /// build.
    pub fn build<I>(descriptors: I, options: GraphOptions) -> TopologyResult<Self>
    where
        I: IntoIterator<Item = NodeDescriptor>,
    {
        let mut registry = NodeRegistry::new();
        registry.extend(descriptors)?;
        Self::from_registry(&registry, options)
    }

    /// Build a graph from every descriptor in a registry.
    pub fn from_registry(registry: &NodeRegistry, options: GraphOptions) -> TopologyResult<Self> {
        options.validate()?;
        let table = NodeTable::build(registry.shared_descriptors(), &options)?;

        if !options.allow_cycles {
            if let Some(path) = cycle::find_cycle(&table) {
                let path: Vec<&str> = path.iter().map(NodeId::as_str).collect();
                warn!(cycle = ?path, "topology contains a dependency cycle");
            }
        }

        Ok(Self {
            options,
            table: RwLock::new(Some(table)),
            resources: Mutex::new(ResourceSet::default()),
        })
    }

    fn read<T>(&self, query: impl FnOnce(&NodeTable) -> T) -> TopologyResult<T> {
        let table = self.table.read();
        table.as_ref().map(query).ok_or(TopologyError::GraphClosed)
    }

    fn node_ids<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<NodeId> {
        ids.into_iter().cloned().collect()
    }

    /// Options the graph was built with.
    pub fn options(&self) -> TopologyResult<&GraphOptions> {
        self.read(|_| &self.options)
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> TopologyResult<Vec<NodeId>> {
        self.read(NodeTable::ids)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> TopologyResult<usize> {
        self.read(NodeTable::len)
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> TopologyResult<bool> {
        self.read(|table| table.len() == 0)
    }

    /// A copy of one node.
    pub fn get(&self, id: &NodeId) -> TopologyResult<Option<Node>> {
        self.read(|table| table.get(id).cloned())
    }

    /// Declared dependencies of a node, dangling ones included.
    pub fn dependencies_of(&self, id: &NodeId) -> TopologyResult<Vec<NodeId>> {
        self.read(|table| {
            table
                .get(id)
                .map(|node| Self::node_ids(node.dependencies()))
                .unwrap_or_default()
        })
    }

    /// Nodes that declare `id` as a dependency.
    pub fn dependents_of(&self, id: &NodeId) -> TopologyResult<Vec<NodeId>> {
        self.read(|table| {
            table
                .get(id)
                .map(|node| Self::node_ids(node.dependents()))
                .unwrap_or_default()
        })
    }

    /// Every edge between registered nodes.
    pub fn edges(&self) -> TopologyResult<Vec<Edge>> {
        self.read(|table| table.edges().to_vec())
    }

    /// Every dependency reference with no registered node.
    pub fn dangling(&self) -> TopologyResult<Vec<DanglingReference>> {
        self.read(|table| table.dangling().to_vec())
    }

    /// Nodes with no registered dependencies.
    pub fn roots(&self) -> TopologyResult<Vec<NodeId>> {
        self.read(NodeTable::roots)
    }

    /// Nodes nothing depends on.
    pub fn leaves(&self) -> TopologyResult<Vec<NodeId>> {
        self.read(NodeTable::leaves)
    }

    /// Nodes with no edges at all.
    pub fn detached(&self) -> TopologyResult<Vec<NodeId>> {
        self.read(NodeTable::detached)
    }

    /// Whether the graph has no dependency cycle.
    ///
    /// Check this before treating [`order`](Self::order) as a safe plan.
    pub fn is_acyclic(&self) -> TopologyResult<bool> {
        self.read(cycle::is_acyclic)
    }

    /// One dependency cycle as a closed path, if any.
    pub fn find_cycle(&self) -> TopologyResult<Option<Vec<NodeId>>> {
        self.read(cycle::find_cycle)
    }

    /// Linearize the graph per the configured ordering policy.
    ///
    /// Always succeeds on a live graph, cyclic or not; the result is only
    /// authoritative when [`is_acyclic`](Self::is_acyclic) holds.
    pub fn order(&self) -> TopologyResult<ExecutionOrder> {
        self.read(|table| scheduler::order(table, &self.options))
    }

    /// Ids of [`order`](Self::order), without nodes, edges, or paths.
    pub fn order_ids(&self) -> TopologyResult<Vec<NodeId>> {
        self.order().map(|order| order.ids())
    }

    /// Bounded dependency path starting at `id`.
    pub fn get_path(&self, id: &NodeId) -> TopologyResult<Vec<NodeId>> {
        self.read(|table| finder::path(table, &self.options, id))
    }

    /// Downstream routes matching `config`.
    pub fn select(&self, config: &RouteConfig) -> TopologyResult<Vec<RouteRecord>> {
        self.read(|table| finder::select(table, &self.options, config))
    }

    /// Summary of the routes on one signal.
    pub fn trace(&self, signal: &ChannelKind, max_depth: usize) -> TopologyResult<RouteSummary> {
        self.read(|table| finder::trace_signal(table, &self.options, signal, max_depth))
    }

    /// Owned copy of every node's descriptor.
    pub fn snapshot(&self) -> TopologyResult<Snapshot> {
        self.read(Snapshot::capture)
    }

    /// Acyclicity, size, and insertion-order trace.
    pub fn summarize(&self) -> TopologyResult<GraphSummary> {
        self.read(GraphSummary::capture)
    }

    /// Attach a resource released synchronously on disposal.
    pub fn own(&self, resource: impl Teardown + 'static) -> TopologyResult<()> {
        let table = self.table.read();
        if table.is_none() {
            return Err(TopologyError::GraphClosed);
        }
        self.resources.lock().push(Box::new(resource));
        Ok(())
    }

    /// Attach a resource whose release is awaited by [`close`](Self::close).
    pub fn own_async(&self, resource: impl AsyncTeardown + 'static) -> TopologyResult<()> {
        let table = self.table.read();
        if table.is_none() {
            return Err(TopologyError::GraphClosed);
        }
        self.resources.lock().push_async(Box::new(resource));
        Ok(())
    }

    /// Whether the graph has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.table.read().is_none()
    }

    /// Clear the table and take the owned resources. `None` if already
    /// disposed.
    fn take(&self) -> Option<ResourceSet> {
        let mut slot = self.table.write();
        let mut table = slot.take()?;
        let nodes = table.len();
        table.clear();

        // Taken under the write lock so no resource can be attached after.
        let resources = std::mem::take(&mut *self.resources.lock());
        debug!(nodes, resources = resources.len(), "disposing topology graph");
        Some(resources)
    }

    /// Dispose the graph, releasing owned resources without awaiting.
    ///
    /// Async teardowns are spawned on the current tokio runtime when there is
    /// one; use [`close`](Self::close) to await them. Calling this again is a
    /// no-op.
    pub fn dispose(&self) {
        if let Some(resources) = self.take() {
            resources.release_now();
        }
    }

    /// Dispose the graph and await every owned resource's teardown.
    ///
    /// Calling this again, or after [`dispose`](Self::dispose), is a no-op.
    pub async fn close(&self) {
        if let Some(resources) = self.take() {
            resources.release().await;
        }
    }
}

impl Drop for TopologyGraph {
    fn drop(&mut self) {
        self.dispose();
    }
}
