//! Per-fingerprint cache entry controller.
//!
//! # States
//!
//! ```text
//!                  set_enabled(true)
//!    Disabled  <---------------------->  Enabled
//!        |        set_enabled(false)        |
//!        |                                  | set_ttl(new ttl)
//!        |                                  v
//!        +--------------------------->  PendingRecache
//!             set_enabled(true) with        |
//!             a TTL change pending          | execute: drop stored value
//!                                           v
//!                                        Enabled
//! ```
//!
//! A controller is `Uninitialized` until its first execution with caching
//! enabled, because nothing can have been stored for it before that. TTL
//! changes on an uninitialized controller take effect without a recache.
//!
//! # Execution
//!
//! 1. Caching disabled: the fetch runs directly and nothing is stored.
//! 2. Recache pending: the stored value is dropped and the lookup is treated
//!    as a miss. If the drop fails, the flag stays armed and the fetched
//!    value is returned without being stored.
//! 3. Otherwise storage is consulted. Read errors surface to the caller.
//! 4. An installed middleware decides between serving a value as cached and
//!    recomputing. Without one, stored values are served and absent ones are
//!    fetched.
//! 5. Fetched values are stored under the current TTL. A failed write is
//!    logged, and the value is still returned.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use cachebox_backend::{Backend, BackendError, CacheBackend, DeleteStatus};
use cachebox_core::{Cacheable, Fetch, FetchRequest, Fingerprint};
use tracing::{debug, trace, warn};

use crate::error::CacheError;
use crate::metrics::{self, Event};
use crate::middleware::{Decision, Middleware};

/// Observable state of a [`CacheEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// No execution with caching enabled has happened yet.
    Uninitialized,
    /// Caching enabled, stored values are served.
    Enabled,
    /// Caching disabled, every execution fetches.
    Disabled,
    /// The TTL changed. The next execution drops the stored value.
    PendingRecache,
}

/// Result of an execution, tagged with where the value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    /// The value returned to the caller.
    pub value: T,
    /// Whether the value was served from cache rather than fetched.
    pub from_cache: bool,
}

impl<T> Fetched<T> {
    /// Returns the value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[derive(Debug)]
struct Settings {
    initialized: bool,
    enabled: bool,
    ttl: Duration,
    from_cache: bool,
    // Recache is pending while these differ.
    ttl_generation: u64,
    dropped_generation: u64,
}

impl Settings {
    fn recache_pending(&self) -> bool {
        self.ttl_generation != self.dropped_generation
    }
}

type InstalledMiddleware = Arc<dyn Any + Send + Sync>;

/// Cache controller of one fingerprint.
///
/// Controllers are shared: every handle built for a logically identical
/// request observes and mutates the same settings. Obtain them through
/// [`Registry::entry`](crate::Registry::entry).
pub struct CacheEntry {
    fingerprint: Fingerprint,
    backend: Arc<dyn Backend>,
    settings: Mutex<Settings>,
    middleware: RwLock<Option<InstalledMiddleware>>,
    fill: Option<tokio::sync::Mutex<()>>,
}

impl CacheEntry {
    /// Creates a controller with the given initial settings.
    pub fn new(
        fingerprint: Fingerprint,
        backend: Arc<dyn Backend>,
        enabled: bool,
        ttl: Duration,
    ) -> Self {
        Self {
            fingerprint,
            backend,
            settings: Mutex::new(Settings {
                initialized: false,
                enabled,
                ttl,
                from_cache: false,
                ttl_generation: 0,
                dropped_generation: 0,
            }),
            middleware: RwLock::new(None),
            fill: None,
        }
    }

    /// Lets only one execution at a time fetch a missing value.
    ///
    /// Concurrent misses wait for the running fetch and then re-read storage.
    pub fn with_single_flight(mut self, single_flight: bool) -> Self {
        self.fill = single_flight.then(|| tokio::sync::Mutex::new(()));
        self
    }

    fn settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fingerprint this controller caches.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Storage adapter of the fingerprint's namespace.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Current state.
    pub fn state(&self) -> EntryState {
        let settings = self.settings();
        match (settings.initialized, settings.enabled) {
            (false, _) => EntryState::Uninitialized,
            (true, false) => EntryState::Disabled,
            (true, true) if settings.recache_pending() => EntryState::PendingRecache,
            (true, true) => EntryState::Enabled,
        }
    }

    /// Current TTL.
    pub fn ttl(&self) -> Duration {
        self.settings().ttl
    }

    /// Whether caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.settings().enabled
    }

    /// Whether the last execution was served from cache.
    pub fn is_from_cache(&self) -> bool {
        self.settings().from_cache
    }

    /// Enables or disables caching.
    pub fn set_enabled(&self, enabled: bool) {
        self.settings().enabled = enabled;
    }

    /// Sets the TTL used for future writes.
    ///
    /// Changing the TTL of an initialized controller schedules the stored
    /// value for removal, so no value outlives a TTL it was not stored with.
    pub fn set_ttl(&self, ttl: Duration) {
        let mut settings = self.settings();
        if settings.ttl == ttl {
            return;
        }
        settings.ttl = ttl;
        if settings.initialized {
            settings.ttl_generation += 1;
            debug!(fingerprint = %self.fingerprint, ?ttl, "ttl changed, recache scheduled");
        }
    }

    /// Enables caching, optionally with a new TTL. The current TTL is kept
    /// when `ttl` is `None`.
    pub fn cache(&self, ttl: Option<Duration>) {
        self.set_enabled(true);
        if let Some(ttl) = ttl {
            self.set_ttl(ttl);
        }
    }

    /// Disables caching.
    pub fn uncache(&self) {
        self.set_enabled(false);
    }

    /// Installs a middleware, replacing the previous one.
    ///
    /// The middleware applies to executions whose fetch produces `T`.
    pub fn set_middleware<T, M>(&self, middleware: M)
    where
        T: Cacheable,
        M: Middleware<T> + 'static,
    {
        let installed: Arc<dyn Middleware<T>> = Arc::new(middleware);
        *self.middleware.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::new(installed));
    }

    /// Removes the installed middleware.
    pub fn clear_middleware(&self) {
        *self.middleware.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn middleware<T: Cacheable>(&self) -> Option<Arc<dyn Middleware<T>>> {
        let installed = self
            .middleware
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        let middleware = installed.downcast_ref::<Arc<dyn Middleware<T>>>().cloned();
        if middleware.is_none() {
            debug!(fingerprint = %self.fingerprint, "middleware ignored, value type differs");
        }
        middleware
    }

    /// Drops the stored value of this fingerprint.
    pub async fn evict(&self) -> Result<DeleteStatus, BackendError> {
        self.backend.delete(&self.fingerprint).await
    }

    /// Executes `request` through the cache.
    pub async fn execute<F>(
        &self,
        fetch: &F,
        request: FetchRequest,
    ) -> Result<Fetched<F::Output>, CacheError<F::Error>>
    where
        F: Fetch + ?Sized,
        F::Output: Cacheable,
    {
        let namespace = self.fingerprint.namespace();
        let (enabled, ttl, generation, recache) = {
            let mut settings = self.settings();
            if settings.enabled {
                settings.initialized = true;
            } else {
                settings.from_cache = false;
            }
            let recache = settings.recache_pending();
            (
                settings.enabled,
                settings.ttl,
                settings.ttl_generation,
                recache,
            )
        };

        if !enabled {
            trace!(fingerprint = %self.fingerprint, "cache disabled, bypassing");
            metrics::record(namespace, Event::Bypass);
            let value = self.fetch(fetch, request).await?;
            return Ok(Fetched {
                value,
                from_cache: false,
            });
        }

        let mut fill_guard = None;
        let cached = if recache {
            if let Err(error) = self.backend.delete(&self.fingerprint).await {
                warn!(
                    fingerprint = %self.fingerprint,
                    backend = self.backend.name(),
                    %error,
                    "failed to drop value stored under the previous ttl"
                );
                let value = self.fetch(fetch, request).await?;
                self.settings().from_cache = false;
                return Ok(Fetched {
                    value,
                    from_cache: false,
                });
            }
            {
                let mut settings = self.settings();
                settings.dropped_generation = settings.dropped_generation.max(generation);
            }
            debug!(fingerprint = %self.fingerprint, "dropped value stored under old ttl");
            metrics::record(namespace, Event::Recache);
            None
        } else {
            match self.backend.get::<F::Output>(&self.fingerprint).await? {
                Some(value) => Some(value.into_inner()),
                None => match &self.fill {
                    Some(fill) => {
                        fill_guard = Some(fill.lock().await);
                        self.backend
                            .get::<F::Output>(&self.fingerprint)
                            .await?
                            .map(|value| value.into_inner())
                    }
                    None => None,
                },
            }
        };

        let decision = match self.middleware::<F::Output>() {
            Some(middleware) => {
                metrics::record(namespace, Event::Override);
                middleware
                    .intercept(self.fingerprint.clone(), cached, ttl)
                    .await
            }
            None => Decision::proceed(cached),
        };

        match decision {
            Decision::Cached(value) => {
                trace!(fingerprint = %self.fingerprint, "serving cached value");
                metrics::record(namespace, Event::Hit);
                self.settings().from_cache = true;
                Ok(Fetched {
                    value,
                    from_cache: true,
                })
            }
            Decision::Recompute => {
                trace!(fingerprint = %self.fingerprint, "cache miss");
                metrics::record(namespace, Event::Miss);
                let value = self.fetch(fetch, request).await?;
                self.store(&value, ttl, generation).await;
                drop(fill_guard);
                self.settings().from_cache = false;
                Ok(Fetched {
                    value,
                    from_cache: false,
                })
            }
        }
    }

    async fn fetch<F>(
        &self,
        fetch: &F,
        request: FetchRequest,
    ) -> Result<F::Output, CacheError<F::Error>>
    where
        F: Fetch + ?Sized,
    {
        let started = Instant::now();
        let result = fetch.fetch(request).await;
        metrics::record_fetch_duration(self.fingerprint.namespace(), started.elapsed());
        result.map_err(CacheError::Fetch)
    }

    /// Writes `value` under `ttl`, which was current at `generation`.
    ///
    /// Values fetched before a TTL change are never written. If the TTL
    /// changes while the write is in flight, the recache is armed again.
    async fn store<T: Cacheable>(&self, value: &T, ttl: Duration, generation: u64) {
        if ttl.is_zero() {
            trace!(fingerprint = %self.fingerprint, "zero ttl, value not stored");
            return;
        }
        if self.settings().ttl_generation != generation {
            trace!(fingerprint = %self.fingerprint, "ttl changed during fetch, value not stored");
            return;
        }
        if let Err(error) = self.backend.set(&self.fingerprint, value, Some(ttl)).await {
            warn!(
                fingerprint = %self.fingerprint,
                backend = self.backend.name(),
                %error,
                "failed to store fetched value"
            );
            metrics::record(self.fingerprint.namespace(), Event::WriteError);
            return;
        }
        let mut settings = self.settings();
        if settings.ttl_generation != generation {
            settings.dropped_generation = settings.dropped_generation.min(generation);
        }
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.settings();
        f.debug_struct("CacheEntry")
            .field("fingerprint", &self.fingerprint)
            .field("backend", &self.backend.name())
            .field("enabled", &settings.enabled)
            .field("ttl", &settings.ttl)
            .field("recache", &settings.recache_pending())
            .field("single_flight", &self.fill.is_some())
            .finish()
    }
}
