use std::sync::Arc;

use cachebox_backend::CacheKeyFormat;
use cachebox_backend::format::{Format, JsonFormat, RonFormat};
use serde::{Deserialize, Serialize};

/// Adapter options shared by the built-in adapters.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AdapterConfig<T> {
    /// Storage key format.
    #[serde(default)]
    pub key: KeyFormat,
    /// Value encoding.
    #[serde(default)]
    pub value: ValueFormat,
    /// Adapter specific options.
    #[serde(flatten)]
    pub adapter: T,
}

/// Storage key settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct KeyFormat {
    /// Key format.
    pub format: KeySerialization,
}

/// Value encoding settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ValueFormat {
    /// Value format.
    pub format: ValueSerialization,
}

/// Storage key format.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum KeySerialization {
    /// The fingerprint verbatim.
    #[default]
    Plain,
    /// Namespace followed by the SHA-256 digest of the fingerprint.
    Sha256,
}

impl KeySerialization {
    /// Convert configuration key serialization format to adapter key format
    pub fn to_cache_key_format(self) -> CacheKeyFormat {
        match self {
            KeySerialization::Plain => CacheKeyFormat::Plain,
            KeySerialization::Sha256 => CacheKeyFormat::Sha256,
        }
    }
}

/// Value encoding.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ValueSerialization {
    /// JSON.
    #[default]
    Json,
    /// Rusty Object Notation.
    Ron,
}

impl ValueSerialization {
    /// Returns the value format.
    pub fn to_serializer(self) -> Arc<dyn Format> {
        match self {
            ValueSerialization::Json => Arc::new(JsonFormat),
            ValueSerialization::Ron => Arc::new(RonFormat),
        }
    }
}
