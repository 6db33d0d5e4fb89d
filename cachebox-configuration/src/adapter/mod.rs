//! Storage adapter selection.
//!
//! ```yaml
//! adapter:
//!   type: memory        # memory | remote | custom
//!   max_entries: 10000
//!   value:
//!     format: Json
//! ```

use std::sync::Arc;

use cachebox::BackendFactory;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

mod custom;
mod memory;
mod remote;
mod serialization;

pub use custom::{Custom, CustomAdapters};
pub use memory::{DEFAULT_MAX_ENTRIES, Memory};
pub use remote::Remote;
pub use serialization::{AdapterConfig, KeyFormat, KeySerialization, ValueFormat, ValueSerialization};

/// Storage adapter of every namespace.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Adapter {
    /// In-process LRU store.
    Memory(AdapterConfig<Memory>),
    /// Remote key-value store.
    #[serde(alias = "redis")]
    Remote(AdapterConfig<Remote>),
    /// Adapter registered programmatically in [`CustomAdapters`].
    Custom(Custom),
}

impl Default for Adapter {
    fn default() -> Self {
        Adapter::Memory(AdapterConfig::default())
    }
}

impl Adapter {
    /// Validates the adapter options and returns the per-namespace factory.
    pub fn into_factory(
        self,
        custom: &CustomAdapters,
    ) -> Result<Arc<dyn BackendFactory>, ConfigError> {
        let factory = match self {
            Adapter::Memory(config) => config.into_factory()?,
            Adapter::Remote(config) => config.into_factory()?,
            Adapter::Custom(config) => custom.resolve(&config.name)?,
        };
        debug!("storage adapter configured");
        Ok(factory)
    }
}
