//! Builder for configuring [`MokaBackend`].

use std::mem::size_of;
use std::time::{Duration, Instant};

use cachebox_backend::format::{Format, JsonFormat};
use cachebox_core::{CacheValue, Fingerprint, Raw};
use moka::Expiry;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;

use crate::backend::MokaBackend;

/// Expiration policy: the entry's own remaining TTL, capped by the adapter's
/// maximum age.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Expiration {
    max_age: Option<Duration>,
}

impl Expiry<Fingerprint, CacheValue<Raw>> for Expiration {
    fn expire_after_create(
        &self,
        _key: &Fingerprint,
        value: &CacheValue<Raw>,
        _created_at: Instant,
    ) -> Option<Duration> {
        self.calculate_ttl(value)
    }

    fn expire_after_update(
        &self,
        _key: &Fingerprint,
        value: &CacheValue<Raw>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // Moka keeps the old deadline by default. A rewrite carries a new TTL.
        self.calculate_ttl(value)
    }
}

impl Expiration {
    fn calculate_ttl(&self, value: &CacheValue<Raw>) -> Option<Duration> {
        match (value.remaining(), self.max_age) {
            (Some(remaining), Some(max_age)) => Some(remaining.min(max_age)),
            (remaining, max_age) => remaining.or(max_age),
        }
    }
}

/// Marker type: capacity has not been configured yet.
///
/// You must call either [`max_entries()`](MokaBackendBuilder::max_entries) or
/// [`max_bytes()`](MokaBackendBuilder::max_bytes) before calling `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: entry-count capacity has been configured.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: byte-based capacity has been configured.
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for creating and configuring a [`MokaBackend`].
///
/// Use [`MokaBackend::builder`] to create a new builder instance.
///
/// Capacity is required and set with exactly one of
/// [`max_entries(n)`](Self::max_entries) or [`max_bytes(n)`](Self::max_bytes).
/// The typestate makes `build()` available only afterwards.
///
/// ```
/// use cachebox_moka::MokaBackend;
/// use std::time::Duration;
///
/// let backend = MokaBackend::builder()
///     .label("people")
///     .max_bytes(64 * 1024 * 1024)
///     .max_age(Duration::from_secs(60))
///     .build();
/// ```
pub struct MokaBackendBuilder<Cap, S = JsonFormat>
where
    S: Format,
{
    capacity: Cap,
    serializer: S,
    label: String,
    max_age: Option<Duration>,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaBackendBuilder<NoCapacity, JsonFormat> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            serializer: JsonFormat,
            label: "moka".to_owned(),
            max_age: None,
            eviction_policy: None,
        }
    }
}

impl Default for MokaBackendBuilder<NoCapacity, JsonFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MokaBackendBuilder<NoCapacity, S>
where
    S: Format,
{
    /// Sets the maximum number of entries the cache can hold.
    pub fn max_entries(self, capacity: u64) -> MokaBackendBuilder<EntryCapacity, S> {
        MokaBackendBuilder {
            capacity: EntryCapacity(capacity),
            serializer: self.serializer,
            label: self.label,
            max_age: self.max_age,
            eviction_policy: self.eviction_policy,
        }
    }

    /// Sets the maximum memory budget in bytes.
    ///
    /// The byte count includes the serialized value, the fingerprint text and
    /// a fixed per-entry overhead.
    pub fn max_bytes(self, bytes: u64) -> MokaBackendBuilder<ByteCapacity, S> {
        MokaBackendBuilder {
            capacity: ByteCapacity(bytes),
            serializer: self.serializer,
            label: self.label,
            max_age: self.max_age,
            eviction_policy: self.eviction_policy,
        }
    }
}

impl<Cap, S> MokaBackendBuilder<Cap, S>
where
    S: Format,
{
    /// Sets a custom label for this adapter.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Caps the lifetime of every entry, whatever TTL it was stored with.
    ///
    /// Entries stored without a TTL live for exactly `max_age`.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Sets the eviction policy for the cache.
    ///
    /// # Default
    ///
    /// [`EvictionPolicy::lru()`], least recently used entries go first.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Sets the cache value serialization format.
    ///
    /// # Default
    ///
    /// [`JsonFormat`]
    pub fn value_format<NewS>(self, serializer: NewS) -> MokaBackendBuilder<Cap, NewS>
    where
        NewS: Format,
    {
        MokaBackendBuilder {
            capacity: self.capacity,
            serializer,
            label: self.label,
            max_age: self.max_age,
            eviction_policy: self.eviction_policy,
        }
    }

    fn expiration(&self) -> Expiration {
        Expiration {
            max_age: self.max_age,
        }
    }
}

impl<S> MokaBackendBuilder<EntryCapacity, S>
where
    S: Format,
{
    /// Builds the [`MokaBackend`] with entry-count based capacity.
    pub fn build(self) -> MokaBackend<S> {
        let expiration = self.expiration();
        let policy = self.eviction_policy.unwrap_or_else(EvictionPolicy::lru);
        let cache: Cache<Fingerprint, CacheValue<Raw>> = CacheBuilder::new(self.capacity.0)
            .name(&self.label)
            .eviction_policy(policy)
            .expire_after(expiration)
            .build();

        MokaBackend {
            cache,
            serializer: self.serializer,
            label: self.label,
        }
    }
}

impl<S> MokaBackendBuilder<ByteCapacity, S>
where
    S: Format,
{
    /// Builds the [`MokaBackend`] with byte-based capacity.
    pub fn build(self) -> MokaBackend<S> {
        let expiration = self.expiration();
        let policy = self.eviction_policy.unwrap_or_else(EvictionPolicy::lru);
        let cache: Cache<Fingerprint, CacheValue<Raw>> = CacheBuilder::new(self.capacity.0)
            .name(&self.label)
            .weigher(byte_weigher)
            .eviction_policy(policy)
            .expire_after(expiration)
            .build();

        MokaBackend {
            cache,
            serializer: self.serializer,
            label: self.label,
        }
    }
}

/// Approximate byte cost of a cache entry.
fn byte_weigher(key: &Fingerprint, value: &CacheValue<Raw>) -> u32 {
    let key_size = size_of::<Fingerprint>() + key.as_str().len();
    (key_size + value.memory_size()).min(u32::MAX as usize) as u32
}
