//! Node Registry
//!
//! Holds descriptors by unique id before a graph is built. Lookups, inserts,
//! and removals are O(1) on average; each entry remembers its registration
//! sequence so iteration can still be replayed in registration order.

use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::{NodeDescriptor, NodeId};
use crate::error::{TopologyError, TopologyResult};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    descriptor: Arc<NodeDescriptor>,
}

/// Stores immutable node descriptors by id.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    entries: HashMap<NodeId, Entry>,
    next_seq: u64,
}

impl NodeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor.
    ///
    /// Fails with `DuplicateNode` if the id is already registered. The
    /// existing entry is left untouched.
    pub fn register(&mut self, descriptor: NodeDescriptor) -> TopologyResult<()> {
        if self.entries.contains_key(descriptor.id()) {
            return Err(TopologyError::duplicate_node(descriptor.id().clone()));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            descriptor.id().clone(),
            Entry {
                seq,
                descriptor: Arc::new(descriptor),
            },
        );
        Ok(())
    }

    /// Register many descriptors, stopping at the first duplicate.
    ///
    /// Descriptors registered before the failure stay registered.
    pub fn extend<I>(&mut self, descriptors: I) -> TopologyResult<()>
    where
        I: IntoIterator<Item = NodeDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    /// Remove a descriptor, returning it if it was registered.
    pub fn remove(&mut self, id: &NodeId) -> Option<Arc<NodeDescriptor>> {
        self.entries.remove(id).map(|entry| entry.descriptor)
    }

    /// Check whether an id is registered.
    pub fn has(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Get the stored descriptor for an id.
    pub fn get(&self, id: &NodeId) -> Option<&NodeDescriptor> {
        self.entries.get(id).map(|entry| entry.descriptor.as_ref())
    }

    /// Every descriptor that lists `id` among its dependencies, in
    /// registration order. Answers "what depends on X".
    pub fn collect_by_dependency(&self, id: &NodeId) -> Vec<&NodeDescriptor> {
        self.ordered()
            .into_iter()
            .filter(|entry| entry.descriptor.depends_on_id(id))
            .map(|entry| entry.descriptor.as_ref())
            .collect()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.ordered()
            .into_iter()
            .map(|entry| entry.descriptor.id().clone())
            .collect()
    }

    /// Registered descriptors in registration order.
    pub fn descriptors(&self) -> Vec<&NodeDescriptor> {
        self.ordered()
            .into_iter()
            .map(|entry| entry.descriptor.as_ref())
            .collect()
    }

    /// Shared handles to every descriptor, in registration order.
    pub(crate) fn shared_descriptors(&self) -> Vec<Arc<NodeDescriptor>> {
        self.ordered()
            .into_iter()
            .map(|entry| Arc::clone(&entry.descriptor))
            .collect()
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every descriptor.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn ordered(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, deps: &[&str]) -> NodeDescriptor {
        NodeDescriptor::parse(id, deps).unwrap()
    }

    fn id(raw: &str) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    #[test]
    fn register_and_get() {
        let mut registry = NodeRegistry::new();
        let stored = descriptor("ingest", &[]);
        registry.register(stored.clone()).unwrap();

        assert!(registry.has(&id("ingest")));
        assert_eq!(registry.get(&id("ingest")), Some(&stored));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected_not_merged() {
        let mut registry = NodeRegistry::new();
        registry.register(descriptor("ingest", &[])).unwrap();

        let result = registry.register(descriptor("ingest", &["other"]));
        assert!(matches!(result, Err(TopologyError::DuplicateNode { .. })));

        // The first registration wins untouched.
        let kept = registry.get(&id("ingest")).unwrap();
        assert!(kept.dependency_ids().is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_then_reregister() {
        let mut registry = NodeRegistry::new();
        registry.register(descriptor("a", &[])).unwrap();

        let removed = registry.remove(&id("a")).unwrap();
        assert_eq!(removed.id(), &id("a"));
        assert!(!registry.has(&id("a")));
        assert!(registry.remove(&id("a")).is_none());

        registry.register(descriptor("a", &[])).unwrap();
        assert!(registry.has(&id("a")));
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut registry = NodeRegistry::new();
        for name in ["zeta", "alpha", "mid", "beta"] {
            registry.register(descriptor(name, &[])).unwrap();
        }
        registry.remove(&id("mid"));

        assert_eq!(registry.ids(), vec![id("zeta"), id("alpha"), id("beta")]);
    }

    #[test]
    fn collect_by_dependency_finds_dependents() {
        let mut registry = NodeRegistry::new();
        registry
            .extend([
                descriptor("ingest", &[]),
                descriptor("normalize", &["ingest"]),
                descriptor("audit", &["ingest"]),
                descriptor("emit", &["normalize"]),
            ])
            .unwrap();

        let dependents: Vec<_> = registry
            .collect_by_dependency(&id("ingest"))
            .into_iter()
            .map(|d| d.id().as_str().to_string())
            .collect();
        assert_eq!(dependents, vec!["normalize", "audit"]);

        assert!(registry.collect_by_dependency(&id("emit")).is_empty());
    }

    #[test]
    fn extend_stops_at_first_duplicate() {
        let mut registry = NodeRegistry::new();
        let result = registry.extend([
            descriptor("a", &[]),
            descriptor("a", &[]),
            descriptor("b", &[]),
        ]);

        assert!(result.is_err());
        assert!(registry.has(&id("a")));
        assert!(!registry.has(&id("b")));
    }
}
