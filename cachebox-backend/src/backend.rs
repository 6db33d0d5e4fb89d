use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use cachebox_core::{CacheValue, Cacheable, Fingerprint, Raw};
use chrono::Utc;
use tracing::trace;

use crate::{
    BackendError, CacheKeyFormat, DeleteStatus,
    format::{Format, FormatExt, JsonFormat},
};

/// Result of a storage adapter operation.
pub type BackendResult<T> = Result<T, BackendError>;

/// Raw, byte-level storage adapter.
///
/// Implementations store opaque serialized values. Expiry is the adapter's
/// business as far as eviction goes, but readers never trust it alone:
/// [`CacheBackend::get`] re-checks the stored TTL on every read.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads the value stored under `key`.
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// The value carries its own TTL.
    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()>;

    /// Removes the value stored under `key`.
    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus>;

    /// Returns the name of this adapter, used in logs.
    fn name(&self) -> &str {
        "backend"
    }

    /// Format used to encode values.
    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }

    /// Format used to build storage keys.
    fn key_format(&self) -> &CacheKeyFormat {
        &CacheKeyFormat::Plain
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        (*self).write(key, value).await
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    fn name(&self) -> &str {
        (*self).name()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }

    fn key_format(&self) -> &CacheKeyFormat {
        (*self).key_format()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }

    fn key_format(&self) -> &CacheKeyFormat {
        (**self).key_format()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend> {
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }

    fn key_format(&self) -> &CacheKeyFormat {
        (**self).key_format()
    }
}

/// High-level storage adapter trait with typed operations.
///
/// This trait provides typed `get`, `set`, and `delete` operations that handle
/// serialization, deserialization and TTL verification.
pub trait CacheBackend: Backend {
    /// Reads and decodes the value stored under `key`.
    ///
    /// A value whose TTL has elapsed is reported as absent, even if the
    /// adapter has not evicted it yet.
    fn get<T>(
        &self,
        key: &Fingerprint,
    ) -> impl Future<Output = BackendResult<Option<CacheValue<T>>>> + Send
    where
        T: Cacheable,
    {
        async move {
            let Some(value) = self.read(key).await? else {
                return Ok(None);
            };

            if value.is_expired() {
                trace!(backend = self.name(), %key, "stored value outlived its ttl");
                return Ok(None);
            }

            let (meta, raw) = value.into_parts();
            let data: T = self.value_format().deserialize(&raw)?;
            Ok(Some(CacheValue::from_parts(meta, data)))
        }
    }

    /// Encodes `value` and stores it under `key` with the given TTL.
    fn set<T>(
        &self,
        key: &Fingerprint,
        value: &T,
        ttl: Option<Duration>,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Cacheable,
    {
        async move {
            let raw = self.value_format().serialize(value)?;
            trace!(backend = self.name(), %key, bytes = raw.len(), "storing value");
            self.write(key, CacheValue::new(raw, Utc::now(), ttl)).await
        }
    }

    /// Removes the value stored under `key`.
    fn delete(&self, key: &Fingerprint) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move { self.remove(key).await }
    }
}

// Explicit CacheBackend implementations for trait objects
// These use the default implementations from the trait
impl CacheBackend for &dyn Backend {}

impl CacheBackend for Box<dyn Backend> {}

impl CacheBackend for Arc<dyn Backend> {}
