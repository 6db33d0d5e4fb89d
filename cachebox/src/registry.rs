//! Registry of cache entries and storage adapters.
//!
//! The registry owns two maps:
//!
//! - fingerprint to [`CacheEntry`], so logically identical requests share one
//!   controller
//! - namespace to storage adapter, so a namespace never gets more than one
//!   adapter instance
//!
//! Both are populated lazily and kept until [`Registry::evict`] or
//! [`Registry::reset`]. Concurrent first registrations of the same key
//! converge to one surviving value.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cachebox_backend::{Backend, BackendResult};
use cachebox_core::{FetchRequest, Fingerprint, Namespace};
use dashmap::DashMap;
use tracing::debug;

use crate::config::{CacheDefaults, NamespacePolicy, NotSet};
use crate::entry::CacheEntry;

/// Creates the storage adapter of a namespace.
///
/// Called at most once per namespace, the first time one of its requests
/// goes through the cache.
pub trait BackendFactory: Send + Sync {
    /// Creates the adapter for `namespace`.
    fn create(&self, namespace: &Namespace) -> BackendResult<Arc<dyn Backend>>;
}

impl<F> BackendFactory for F
where
    F: Fn(&Namespace) -> BackendResult<Arc<dyn Backend>> + Send + Sync,
{
    fn create(&self, namespace: &Namespace) -> BackendResult<Arc<dyn Backend>> {
        (self)(namespace)
    }
}

/// Registry of cache entries and per-namespace storage adapters.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use cachebox::backend::Backend;
/// use cachebox::{FetchRequest, NamespacePolicy, Registry};
/// use cachebox_moka::MokaBackend;
///
/// let registry = Registry::builder()
///     .default_ttl(Duration::from_secs(30))
///     .namespace("people", NamespacePolicy::cached(Duration::from_secs(90)))
///     .backends(|namespace| {
///         let backend = MokaBackend::builder()
///             .label(namespace.as_str())
///             .max_entries(1_000)
///             .build();
///         Ok(Arc::new(backend) as Arc<dyn Backend>)
///     })
///     .build();
///
/// let people = registry.entry(&FetchRequest::new("people")).unwrap();
/// let pets = registry.entry(&FetchRequest::new("pets")).unwrap();
///
/// assert!(people.is_enabled());
/// assert_eq!(people.ttl(), Duration::from_secs(90));
/// assert!(!pets.is_enabled());
/// assert_eq!(pets.ttl(), Duration::from_secs(30));
/// assert_eq!(registry.bucket_count(), 2);
/// ```
pub struct Registry {
    entries: DashMap<Fingerprint, Arc<CacheEntry>>,
    buckets: DashMap<Namespace, Arc<dyn Backend>>,
    policies: DashMap<Namespace, NamespacePolicy>,
    factory: Arc<dyn BackendFactory>,
    defaults: CacheDefaults,
}

impl Registry {
    /// Creates a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder<NotSet> {
        RegistryBuilder::new()
    }

    /// Returns the storage adapter of `namespace`, creating it on first use.
    pub fn backend(&self, namespace: &Namespace) -> BackendResult<Arc<dyn Backend>> {
        if let Some(backend) = self.buckets.get(namespace) {
            return Ok(Arc::clone(backend.value()));
        }
        let backend = self
            .buckets
            .entry(namespace.clone())
            .or_try_insert_with(|| {
                debug!(%namespace, "creating storage adapter");
                self.factory.create(namespace)
            })?;
        Ok(Arc::clone(backend.value()))
    }

    /// Returns the controller of `request`, creating it on first use.
    ///
    /// New controllers take their settings from the namespace policy, falling
    /// back to the registry defaults. Existing controllers are returned as
    /// they are.
    pub fn entry(&self, request: &FetchRequest) -> BackendResult<Arc<CacheEntry>> {
        let fingerprint = request.fingerprint();
        if let Some(entry) = self.get(&fingerprint) {
            return Ok(entry);
        }

        let backend = self.backend(request.namespace())?;
        let (enabled, ttl) = self.policy(request.namespace()).resolve(&self.defaults);
        let entry = self
            .entries
            .entry(fingerprint.clone())
            .or_insert_with(|| {
                debug!(%fingerprint, enabled, ?ttl, "registering cache entry");
                Arc::new(
                    CacheEntry::new(fingerprint, backend, enabled, ttl)
                        .with_single_flight(self.defaults.single_flight),
                )
            });
        Ok(Arc::clone(entry.value()))
    }

    /// Returns the controller of `fingerprint`, if registered.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<CacheEntry>> {
        self.entries
            .get(fingerprint)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Forgets the controller of `fingerprint`.
    ///
    /// The stored value is left in place; use [`CacheEntry::evict`] to drop it.
    pub fn evict(&self, fingerprint: &Fingerprint) -> Option<Arc<CacheEntry>> {
        self.entries.remove(fingerprint).map(|(_, entry)| entry)
    }

    /// Forgets every controller and storage adapter.
    ///
    /// Handles created earlier keep working on their own controllers, which
    /// are no longer shared with new ones.
    pub fn reset(&self) {
        debug!(
            entries = self.entries.len(),
            buckets = self.buckets.len(),
            "resetting registry"
        );
        self.entries.clear();
        self.buckets.clear();
    }

    /// Sets the policy for controllers of `namespace` created from now on.
    pub fn set_policy(&self, namespace: impl Into<Namespace>, policy: NamespacePolicy) {
        self.policies.insert(namespace.into(), policy);
    }

    /// Returns the policy of `namespace`.
    pub fn policy(&self, namespace: &Namespace) -> NamespacePolicy {
        self.policies
            .get(namespace)
            .map(|policy| *policy.value())
            .unwrap_or_default()
    }

    /// Registry-wide defaults.
    pub fn defaults(&self) -> &CacheDefaults {
        &self.defaults
    }

    /// Number of registered controllers.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of created storage adapters.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.len())
            .field("buckets", &self.buckets.len())
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Builder for [`Registry`].
///
/// Use [`Registry::builder()`] to create a new builder. The adapter factory
/// is required, everything else has defaults.
pub struct RegistryBuilder<B> {
    factory: B,
    defaults: CacheDefaults,
    policies: DashMap<Namespace, NamespacePolicy>,
}

impl RegistryBuilder<NotSet> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            factory: NotSet,
            defaults: CacheDefaults::default(),
            policies: DashMap::new(),
        }
    }
}

impl Default for RegistryBuilder<NotSet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> RegistryBuilder<B> {
    /// Creates each namespace's storage adapter with `factory`.
    pub fn backends<F>(self, factory: F) -> RegistryBuilder<Arc<dyn BackendFactory>>
    where
        F: Fn(&Namespace) -> BackendResult<Arc<dyn Backend>> + Send + Sync + 'static,
    {
        self.factory(factory)
    }

    /// Creates each namespace's storage adapter with a [`BackendFactory`].
    pub fn factory<F>(self, factory: F) -> RegistryBuilder<Arc<dyn BackendFactory>>
    where
        F: BackendFactory + 'static,
    {
        RegistryBuilder {
            factory: Arc::new(factory),
            defaults: self.defaults,
            policies: self.policies,
        }
    }

    /// Replaces the registry defaults.
    pub fn defaults(mut self, defaults: CacheDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sets the TTL of new controllers.
    ///
    /// # Default
    ///
    /// 60 seconds
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.defaults.ttl = ttl;
        self
    }

    /// Sets whether new controllers start with caching enabled.
    ///
    /// # Default
    ///
    /// `false`, requests opt in through [`Query::cache`](crate::Query::cache)
    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.defaults.enabled = enabled;
        self
    }

    /// Serializes concurrent misses on one fingerprint behind a single fetch.
    ///
    /// # Default
    ///
    /// `false`
    pub fn single_flight(mut self, single_flight: bool) -> Self {
        self.defaults.single_flight = single_flight;
        self
    }

    /// Sets the policy of `namespace`.
    pub fn namespace(self, namespace: impl Into<Namespace>, policy: NamespacePolicy) -> Self {
        self.policies.insert(namespace.into(), policy);
        self
    }
}

impl RegistryBuilder<Arc<dyn BackendFactory>> {
    /// Builds the [`Registry`].
    pub fn build(self) -> Registry {
        Registry {
            entries: DashMap::new(),
            buckets: DashMap::new(),
            policies: self.policies,
            factory: self.factory,
            defaults: self.defaults,
        }
    }
}
