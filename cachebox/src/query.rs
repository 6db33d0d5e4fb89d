//! Per-request handle with fluent cache controls.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cachebox_core::{Cacheable, Fetch, FetchRequest, Fingerprint};

use crate::entry::{CacheEntry, EntryState, Fetched};
use crate::error::CacheError;
use crate::middleware::Decision;

/// A [`FetchRequest`] bound to its cache controller and fetch capability.
///
/// Created by [`CachedFetch::query`](crate::CachedFetch::query). Settings
/// changed through a handle are shared with every other handle of a
/// logically identical request, and stick to the fingerprint across
/// executions.
///
/// ```
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # use cachebox::{CachedFetch, EntryState, FetchRequest, Registry};
/// # use cachebox::backend::Backend;
/// # use cachebox_moka::MokaBackend;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let registry = Registry::builder()
/// #     .backends(|_| Ok(Arc::new(MokaBackend::builder().max_entries(16).build()) as Arc<dyn Backend>))
/// #     .build();
/// # let fetch = CachedFetch::new(
/// #     |_: FetchRequest| async { Ok::<_, std::io::Error>(1u32) },
/// #     Arc::new(registry),
/// # );
/// let query = fetch.query(FetchRequest::new("people"))?;
/// query.cache_for(Duration::from_secs(60));
///
/// query.execute().await?;
/// assert!(query.execute().await?.from_cache);
///
/// // A new TTL invalidates the value stored under the old one.
/// query.set_ttl(Duration::from_secs(30));
/// assert_eq!(query.state(), EntryState::PendingRecache);
/// assert!(!query.execute().await?.from_cache);
/// # Ok(())
/// # }
/// ```
pub struct Query<F> {
    request: FetchRequest,
    entry: Arc<CacheEntry>,
    fetch: Arc<F>,
}

impl<F> Query<F> {
    pub(crate) fn new(request: FetchRequest, entry: Arc<CacheEntry>, fetch: Arc<F>) -> Self {
        Self {
            request,
            entry,
            fetch,
        }
    }

    /// The request this handle executes.
    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Cache identity of the request.
    pub fn fingerprint(&self) -> &Fingerprint {
        self.entry.fingerprint()
    }

    /// Shared cache controller of the request.
    pub fn entry(&self) -> &Arc<CacheEntry> {
        &self.entry
    }

    /// Enables caching with the current TTL.
    pub fn cache(&self) -> &Self {
        self.entry.cache(None);
        self
    }

    /// Enables caching with `ttl`.
    pub fn cache_for(&self, ttl: Duration) -> &Self {
        self.entry.cache(Some(ttl));
        self
    }

    /// Enables or disables caching.
    pub fn set_cache(&self, enabled: bool) -> &Self {
        self.entry.set_enabled(enabled);
        self
    }

    /// Disables caching.
    pub fn uncache(&self) -> &Self {
        self.entry.uncache();
        self
    }

    /// Current TTL.
    pub fn ttl(&self) -> Duration {
        self.entry.ttl()
    }

    /// Sets the TTL without changing whether caching is enabled.
    pub fn set_ttl(&self, ttl: Duration) -> &Self {
        self.entry.set_ttl(ttl);
        self
    }

    /// Whether the last execution was served from cache.
    pub fn is_from_cache(&self) -> bool {
        self.entry.is_from_cache()
    }

    /// Whether caching is enabled.
    pub fn is_cache_enabled(&self) -> bool {
        self.entry.is_enabled()
    }

    /// Current controller state.
    pub fn state(&self) -> EntryState {
        self.entry.state()
    }
}

impl<F> Query<F>
where
    F: Fetch,
    F::Output: Cacheable,
{
    /// Installs a middleware for this request's fingerprint.
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use cachebox::{CachedFetch, Decision, FetchRequest, Registry};
    /// # use cachebox::backend::Backend;
    /// # use cachebox_moka::MokaBackend;
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let registry = Registry::builder()
    /// #     .backends(|_| Ok(Arc::new(MokaBackend::builder().max_entries(16).build()) as Arc<dyn Backend>))
    /// #     .build();
    /// # let fetch = CachedFetch::new(
    /// #     |_: FetchRequest| async { Ok::<_, std::io::Error>(1u32) },
    /// #     Arc::new(registry),
    /// # );
    /// let query = fetch.query(FetchRequest::new("people"))?;
    /// query
    ///     .cache()
    ///     .intercept(|_key, cached, _ttl| async move { Decision::Cached(cached.unwrap_or(7)) });
    ///
    /// let fetched = query.execute().await?;
    /// assert_eq!(fetched.value, 7);
    /// assert!(fetched.from_cache);
    /// # Ok(())
    /// # }
    /// ```
    pub fn intercept<M, Fut>(&self, middleware: M) -> &Self
    where
        M: Fn(Fingerprint, Option<F::Output>, Duration) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Decision<F::Output>> + Send + 'static,
    {
        self.entry.set_middleware::<F::Output, M>(middleware);
        self
    }

    /// Removes the middleware of this request's fingerprint.
    pub fn clear_intercept(&self) -> &Self {
        self.entry.clear_middleware();
        self
    }

    /// Executes the request through the cache.
    pub async fn execute(&self) -> Result<Fetched<F::Output>, CacheError<F::Error>> {
        self.entry
            .execute(self.fetch.as_ref(), self.request.clone())
            .await
    }
}

impl<F> Clone for Query<F> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            entry: Arc::clone(&self.entry),
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<F> fmt::Debug for Query<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("request", &self.request)
            .field("entry", &self.entry)
            .finish()
    }
}
