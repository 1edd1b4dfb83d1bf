//! Owned Sub-resources
//!
//! A graph may own resources whose lifetime is tied to it (caches, worker
//! handles, subscriptions held on behalf of the graph's consumers). They are
//! released, in reverse attach order, when the graph is disposed.
//!
//! Synchronous teardown runs inline. Asynchronous teardown is awaited by
//! `TopologyGraph::close`; the synchronous `dispose` path can only hand it to
//! the ambient tokio runtime, if there is one.

use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

/// A resource released synchronously.
pub trait Teardown: Send {
    fn release(self: Box<Self>);
}

impl<F> Teardown for F
where
    F: FnOnce() + Send + 'static,
{
    fn release(self: Box<Self>) {
        (*self)()
    }
}

/// A resource whose release must be awaited.
pub trait AsyncTeardown: Send {
    fn release(self: Box<Self>) -> BoxFuture<'static, ()>;
}

impl<F, Fut> AsyncTeardown for F
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn release(self: Box<Self>) -> BoxFuture<'static, ()> {
        (*self)().boxed()
    }
}

enum OwnedResource {
    Sync(Box<dyn Teardown>),
    Async(Box<dyn AsyncTeardown>),
}

/// Resources owned by one graph.
#[derive(Default)]
pub(crate) struct ResourceSet {
    resources: Vec<OwnedResource>,
}

impl ResourceSet {
    pub(crate) fn push(&mut self, resource: Box<dyn Teardown>) {
        self.resources.push(OwnedResource::Sync(resource));
    }

    pub(crate) fn push_async(&mut self, resource: Box<dyn AsyncTeardown>) {
        self.resources.push(OwnedResource::Async(resource));
    }

    pub(crate) fn len(&self) -> usize {
        self.resources.len()
    }

    /// Release everything without awaiting.
    ///
    /// Async teardowns are spawned onto the current tokio runtime. Without a
    /// runtime they cannot run and are dropped.
    pub(crate) fn release_now(self) {
        let count = self.resources.len();

        for resource in self.resources.into_iter().rev() {
            match resource {
                OwnedResource::Sync(resource) => resource.release(),
                OwnedResource::Async(resource) => match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(resource.release());
                    }
                    Err(_) => {
                        warn!("no tokio runtime available, dropping async teardown");
                    }
                },
            }
        }

        debug!(count, "released owned resources");
    }

    /// Release everything, awaiting each async teardown in turn.
    pub(crate) async fn release(self) {
        let count = self.resources.len();

        for resource in self.resources.into_iter().rev() {
            match resource {
                OwnedResource::Sync(resource) => resource.release(),
                OwnedResource::Async(resource) => resource.release().await,
            }
        }

        debug!(count, "released owned resources");
    }
}

impl std::fmt::Debug for ResourceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSet")
            .field("len", &self.resources.len())
            .finish()
    }
}
