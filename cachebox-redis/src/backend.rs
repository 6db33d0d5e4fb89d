//! Redis adapter implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cachebox_backend::{
    Backend, BackendError, BackendResult, CacheBackend, CacheKeyFormat, DeleteStatus,
    format::{Format, JsonFormat},
};
use cachebox_core::{CacheValue, Fingerprint, Raw};
use chrono::{DateTime, Utc};
use redis::{Client, aio::ConnectionManager};
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::Error;

const DATA_FIELD: &str = "d";
const STORED_AT_FIELD: &str = "t";
const TTL_FIELD: &str = "l";

/// Redis storage adapter based on the redis-rs crate.
///
/// Each value is a hash with the encoded data (`d`), the storage time in unix
/// milliseconds (`t`) and the TTL in milliseconds (`l`). The key itself carries
/// a native `PEXPIRE`, so Redis evicts it on time without any sweeper.
///
/// It uses a [`ConnectionManager`] for asynchronous network interaction,
/// created on first use.
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
#[derive(Clone)]
pub struct RedisBackend<S = JsonFormat>
where
    S: Format,
{
    client: Client,
    connection: OnceCell<ConnectionManager>,
    serializer: S,
    key_format: CacheKeyFormat,
    fallback_ttl: Option<Duration>,
    name: String,
}

impl RedisBackend<JsonFormat> {
    /// Create new adapter instance with default settings.
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self::builder().build()?)
    }

    /// Creates new RedisBackend builder with default settings.
    #[must_use]
    pub fn builder() -> RedisBackendBuilder<JsonFormat> {
        RedisBackendBuilder::default()
    }
}

impl<S> RedisBackend<S>
where
    S: Format,
{
    /// Create lazy connection to redis via [`ConnectionManager`]
    pub async fn connection(&self) -> Result<&ConnectionManager, BackendError> {
        trace!("Get connection manager");
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!("Initialize new redis connection manager");
                self.client.get_connection_manager()
            })
            .await
            .map_err(Error::from)?;
        Ok(manager)
    }

    /// Expiry applied to values stored without a TTL of their own.
    pub fn fallback_ttl(&self) -> Option<Duration> {
        self.fallback_ttl
    }
}

/// Part of builder pattern implementation for RedisBackend.
pub struct RedisBackendBuilder<S = JsonFormat>
where
    S: Format,
{
    connection_info: String,
    serializer: S,
    key_format: CacheKeyFormat,
    fallback_ttl: Option<Duration>,
    name: String,
}

impl Default for RedisBackendBuilder<JsonFormat> {
    fn default() -> Self {
        Self {
            connection_info: "redis://127.0.0.1/".to_owned(),
            serializer: JsonFormat,
            key_format: CacheKeyFormat::default(),
            fallback_ttl: None,
            name: "redis".to_owned(),
        }
    }
}

impl<S> RedisBackendBuilder<S>
where
    S: Format,
{
    /// Set connection info (host, port, password, database) as a redis URL.
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Set value serialization format.
    pub fn value_format<NewS>(self, serializer: NewS) -> RedisBackendBuilder<NewS>
    where
        NewS: Format,
    {
        RedisBackendBuilder {
            connection_info: self.connection_info,
            serializer,
            key_format: self.key_format,
            fallback_ttl: self.fallback_ttl,
            name: self.name,
        }
    }

    /// Set storage key format.
    pub fn key_format(mut self, key_format: CacheKeyFormat) -> Self {
        self.key_format = key_format;
        self
    }

    /// Expire values stored without a TTL after `ttl`.
    pub fn fallback_ttl(mut self, ttl: Duration) -> Self {
        self.fallback_ttl = Some(ttl);
        self
    }

    /// Set a custom label for this adapter, used in logs.
    ///
    /// # Default
    ///
    /// `"redis"`
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.name = label.into();
        self
    }

    /// Create new instance of Redis adapter with passed settings.
    ///
    /// Only the connection URL is validated here, no connection is opened.
    pub fn build(self) -> Result<RedisBackend<S>, Error> {
        Ok(RedisBackend {
            client: Client::open(self.connection_info)?,
            connection: OnceCell::new(),
            serializer: self.serializer,
            key_format: self.key_format,
            fallback_ttl: self.fallback_ttl,
            name: self.name,
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl<S> Backend for RedisBackend<S>
where
    S: Format + Send + Sync,
{
    async fn read(&self, key: &Fingerprint) -> BackendResult<Option<CacheValue<Raw>>> {
        let mut con = self.connection().await?.clone();
        let cache_key = self.key_format.storage_key(key);

        let (data, stored_at_ms, ttl_ms): (Option<Vec<u8>>, Option<i64>, Option<u64>) =
            redis::cmd("HMGET")
                .arg(&cache_key)
                .arg(DATA_FIELD)
                .arg(STORED_AT_FIELD)
                .arg(TTL_FIELD)
                .query_async(&mut con)
                .await
                .map_err(Error::from)?;

        // If data is None, key doesn't exist
        let data = match data {
            Some(data) => Bytes::from(data),
            None => return Ok(None),
        };

        let stored_at = stored_at_ms
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now);
        let ttl = ttl_ms.map(Duration::from_millis);

        Ok(Some(CacheValue::new(data, stored_at, ttl)))
    }

    async fn write(&self, key: &Fingerprint, value: CacheValue<Raw>) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();
        let cache_key = self.key_format.storage_key(key);

        let mut hset = redis::cmd("HSET");
        hset.arg(&cache_key)
            .arg(DATA_FIELD)
            .arg(value.data().as_ref())
            .arg(STORED_AT_FIELD)
            .arg(value.stored_at().timestamp_millis());
        if let Some(ttl) = value.ttl() {
            hset.arg(TTL_FIELD).arg(millis(ttl));
        }

        // DEL first so that no field of a previous value survives the rewrite.
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("DEL").arg(&cache_key).ignore();
        pipe.add_command(hset).ignore();
        if let Some(expire_in) = value.remaining().or(self.fallback_ttl) {
            pipe.cmd("PEXPIRE")
                .arg(&cache_key)
                .arg(millis(expire_in).max(1))
                .ignore();
        }

        trace!(backend = %self.name, key = %cache_key, "write");
        pipe.query_async::<()>(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn remove(&self, key: &Fingerprint) -> BackendResult<DeleteStatus> {
        let mut con = self.connection().await?.clone();
        let cache_key = self.key_format.storage_key(key);

        let deleted: u32 = redis::cmd("DEL")
            .arg(cache_key)
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        if deleted > 0 {
            Ok(DeleteStatus::Deleted(deleted))
        } else {
            Ok(DeleteStatus::Missing)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }

    fn key_format(&self) -> &CacheKeyFormat {
        &self.key_format
    }
}

// Explicit CacheBackend implementation using default trait methods
impl<S> CacheBackend for RedisBackend<S> where S: Format + Send + Sync {}
