//! Moka adapter implementation.

use async_trait::async_trait;
use cachebox_backend::format::{Format, JsonFormat};
use cachebox_backend::{Backend, BackendResult, CacheBackend, DeleteStatus};
use cachebox_core::{CacheValue, Fingerprint, Raw};
use moka::future::Cache;
use tracing::trace;

use crate::builder::{MokaBackendBuilder, NoCapacity};

/// In-memory storage adapter powered by Moka.
///
/// Entries are bounded by count or by approximate byte size and evicted in
/// least-recently-used order. Every entry expires after its own TTL, capped by
/// the adapter's maximum age.
///
/// # Examples
///
/// ```
/// use cachebox_moka::MokaBackend;
/// use cachebox_backend::format::RonFormat;
///
/// let backend = MokaBackend::builder()
///     .max_entries(1_000)
///     .value_format(RonFormat)
///     .build();
/// ```
///
/// # Caveats
///
/// - Data is **not persisted** and is lost on process restart
/// - Data is **not shared** across processes, use the redis adapter for that
/// - Expiration is **best-effort**, but readers re-check the TTL, so an
///   expired entry is never served
#[derive(Clone)]
pub struct MokaBackend<S = JsonFormat>
where
    S: Format,
{
    pub(crate) cache: Cache<Fingerprint, CacheValue<Raw>>,
    pub(crate) serializer: S,
    pub(crate) label: String,
}

impl<S> std::fmt::Debug for MokaBackend<S>
where
    S: Format,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .field("serializer", &std::any::type_name::<S>())
            .finish()
    }
}

impl MokaBackend<JsonFormat> {
    /// Creates a new builder for `MokaBackend`.
    ///
    /// Capacity must be set with `max_entries` or `max_bytes` before `build`.
    pub fn builder() -> MokaBackendBuilder<NoCapacity, JsonFormat> {
        MokaBackendBuilder::new()
    }
}

impl<S> MokaBackend<S>
where
    S: Format,
{
    /// The underlying Moka async cache instance.
    pub fn cache(&self) -> &Cache<Fingerprint, CacheValue<Raw>> {
        &self.cache
    }
}

#[async_trait]
impl<S> Backend for MokaBackend<S>
where
    S: Format + Send + Sync,
{
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        trace!(backend = %self.label, %key, "insert");
        self.cache.insert(key.clone(), value).await;
        crate::metrics::record_occupancy(
            &self.label,
            self.cache.entry_count(),
            self.cache.weighted_size(),
        );
        Ok(())
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
        let value = self.cache.remove(key).await;
        match value {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}

// Explicit CacheBackend implementation using default trait methods
impl<S> CacheBackend for MokaBackend<S> where S: Format + Send + Sync {}
