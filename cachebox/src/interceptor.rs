//! Caching decorator over a fetch capability.
//!
//! [`CachedFetch`] wraps the real [`Fetch`] implementation and implements
//! [`Fetch`] itself, so it can be handed to anything that expects the
//! undecorated capability. The wrapped fetch is only invoked on misses and
//! when caching is disabled.

use std::fmt;
use std::sync::Arc;

use cachebox_backend::BackendError;
use cachebox_core::{Cacheable, Fetch, FetchRequest};
use futures::future::BoxFuture;
use tracing::instrument;

use crate::entry::Fetched;
use crate::error::CacheError;
use crate::query::Query;
use crate::registry::Registry;

/// A [`Fetch`] capability with a cache in front of it.
pub struct CachedFetch<F> {
    fetch: Arc<F>,
    registry: Arc<Registry>,
}

impl<F> CachedFetch<F> {
    /// Wraps `fetch` with the cache held by `registry`.
    pub fn new(fetch: F, registry: Arc<Registry>) -> Self {
        Self {
            fetch: Arc::new(fetch),
            registry,
        }
    }

    /// The registry backing this cache.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The wrapped fetch capability.
    pub fn inner(&self) -> &F {
        &self.fetch
    }

    /// Binds `request` to its cache controller.
    ///
    /// Fails only when the namespace's storage adapter cannot be created.
    pub fn query(&self, request: FetchRequest) -> Result<Query<F>, BackendError> {
        let entry = self.registry.entry(&request)?;
        Ok(Query::new(request, entry, Arc::clone(&self.fetch)))
    }
}

impl<F> CachedFetch<F>
where
    F: Fetch,
    F::Output: Cacheable,
{
    /// Executes `request` through the cache with the settings of its
    /// fingerprint.
    #[instrument(skip_all, fields(namespace = %request.namespace()))]
    pub async fn execute(
        &self,
        request: FetchRequest,
    ) -> Result<Fetched<F::Output>, CacheError<F::Error>> {
        let entry = self.registry.entry(&request)?;
        entry.execute(self.fetch.as_ref(), request).await
    }
}

impl<F> Fetch for CachedFetch<F>
where
    F: Fetch + 'static,
    F::Output: Cacheable,
    F::Error: Send + 'static,
    F::Future: 'static,
{
    type Output = F::Output;
    type Error = CacheError<F::Error>;
    type Future = BoxFuture<'static, Result<Self::Output, Self::Error>>;

    fn fetch(&self, request: FetchRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { this.execute(request).await.map(Fetched::into_inner) })
    }
}

impl<F> Clone for CachedFetch<F> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<F> fmt::Debug for CachedFetch<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFetch")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
