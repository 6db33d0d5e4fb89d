use std::sync::Arc;
use std::time::Duration;

use cachebox::BackendFactory;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::serialization::AdapterConfig;

/// Capacity of the memory adapter when neither bound is configured.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// In-process LRU adapter options.
///
/// Each namespace gets its own store with these bounds. At most one of
/// `max_entries` and `max_bytes` may be set.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Memory {
    /// Maximum number of stored values per namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<u64>,
    /// Memory budget in bytes per namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
    /// Upper bound on the lifetime of any stored value.
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_age: Option<Duration>,
    /// Label used in logs and metrics. Defaults to the namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[cfg_attr(not(feature = "moka"), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capacity {
    Entries(u64),
    Bytes(u64),
}

impl Memory {
    fn capacity(&self) -> Result<Capacity, ConfigError> {
        let capacity = match (self.max_entries, self.max_bytes) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::invalid(
                    "max_entries",
                    "cannot be combined with max_bytes",
                ));
            }
            (Some(entries), None) => Capacity::Entries(entries),
            (None, Some(bytes)) => Capacity::Bytes(bytes),
            (None, None) => Capacity::Entries(DEFAULT_MAX_ENTRIES),
        };
        match capacity {
            Capacity::Entries(0) => Err(ConfigError::invalid("max_entries", "must be positive")),
            Capacity::Bytes(0) => Err(ConfigError::invalid("max_bytes", "must be positive")),
            capacity => Ok(capacity),
        }
    }

    fn validate(&self) -> Result<Capacity, ConfigError> {
        if self.max_age.is_some_and(|max_age| max_age.is_zero()) {
            return Err(ConfigError::invalid("max_age", "must be positive"));
        }
        self.capacity()
    }
}

impl AdapterConfig<Memory> {
    #[cfg(feature = "moka")]
    pub(crate) fn into_factory(self) -> Result<Arc<dyn BackendFactory>, ConfigError> {
        use cachebox::Namespace;
        use cachebox_backend::{Backend, BackendResult};
        use cachebox_moka::MokaBackend;

        let capacity = self.adapter.validate()?;
        let serializer = self.value.format.to_serializer();
        let Memory { max_age, label, .. } = self.adapter;

        let factory = move |namespace: &Namespace| -> BackendResult<Arc<dyn Backend>> {
            let label = label.clone().unwrap_or_else(|| namespace.to_string());
            let mut builder = MokaBackend::builder()
                .label(label)
                .value_format(Arc::clone(&serializer));
            if let Some(max_age) = max_age {
                builder = builder.max_age(max_age);
            }
            let backend: Arc<dyn Backend> = match capacity {
                Capacity::Entries(entries) => Arc::new(builder.max_entries(entries).build()),
                Capacity::Bytes(bytes) => Arc::new(builder.max_bytes(bytes).build()),
            };
            Ok(backend)
        };
        Ok(Arc::new(factory))
    }

    #[cfg(not(feature = "moka"))]
    pub(crate) fn into_factory(self) -> Result<Arc<dyn BackendFactory>, ConfigError> {
        self.adapter.validate()?;
        Err(ConfigError::BackendNotAvailable("memory".to_string()))
    }
}
