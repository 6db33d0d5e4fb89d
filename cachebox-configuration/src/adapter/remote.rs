use std::sync::Arc;
use std::time::Duration;

use cachebox::BackendFactory;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::serialization::AdapterConfig;

/// Remote key-value adapter options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Remote {
    /// Server URL, e.g. `redis://127.0.0.1:6379/0`.
    pub connection_string: String,
    /// Expiry of values stored without a TTL of their own.
    #[serde(
        default,
        alias = "fallback_ttl",
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<Duration>,
    /// Label used in logs. Defaults to the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AdapterConfig<Remote> {
    #[cfg(feature = "redis")]
    pub(crate) fn into_factory(self) -> Result<Arc<dyn BackendFactory>, ConfigError> {
        use cachebox::Namespace;
        use cachebox_backend::{Backend, BackendError, BackendResult, Format};
        use cachebox_redis::{RedisBackend, RedisBackendBuilder};

        let key_format = self.key.format.to_cache_key_format();
        let serializer = self.value.format.to_serializer();
        let Remote {
            connection_string,
            expires,
            label,
        } = self.adapter;

        let builder = move || -> RedisBackendBuilder<Arc<dyn Format>> {
            let mut builder = RedisBackend::builder()
                .server(connection_string.clone())
                .key_format(key_format)
                .value_format(Arc::clone(&serializer));
            if let Some(expires) = expires {
                builder = builder.fallback_ttl(expires);
            }
            builder
        };

        // Opening a client only parses the URL, no connection is made.
        builder()
            .build()
            .map_err(|error| ConfigError::invalid("connection_string", error.to_string()))?;

        let factory = move |namespace: &Namespace| -> BackendResult<Arc<dyn Backend>> {
            let label = label.clone().unwrap_or_else(|| namespace.to_string());
            let backend = builder().label(label).build().map_err(BackendError::from)?;
            Ok(Arc::new(backend))
        };
        Ok(Arc::new(factory))
    }

    #[cfg(not(feature = "redis"))]
    pub(crate) fn into_factory(self) -> Result<Arc<dyn BackendFactory>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("remote".to_string()))
    }
}
