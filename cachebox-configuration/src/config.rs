use cachebox::{BackendFactory, CacheDefaults, Namespace, NamespacePolicy, Registry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{Adapter, CustomAdapters};
use crate::error::ConfigError;

/// Complete cache configuration.
///
/// Registry defaults (`ttl`, `cache`, `single_flight`) sit at the top level
/// next to `adapter` and `namespaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Storage adapter created for every namespace.
    #[serde(default)]
    pub adapter: Adapter,
    /// Registry defaults.
    #[serde(flatten)]
    pub defaults: CacheDefaults,
    /// Per-namespace policies, keyed by namespace.
    #[serde(default)]
    pub namespaces: IndexMap<String, NamespacePolicy>,
}

impl CacheConfig {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|error| ConfigError::Parse(error.to_string()))
    }

    /// Builds a [`Registry`] with the built-in adapters only.
    pub fn into_registry(self) -> Result<Registry, ConfigError> {
        self.into_registry_with(&CustomAdapters::default())
    }

    /// Builds a [`Registry`], resolving `custom` adapters against `custom`.
    pub fn into_registry_with(self, custom: &CustomAdapters) -> Result<Registry, ConfigError> {
        let factory = self.adapter.into_factory(custom)?;
        debug!(
            defaults = ?self.defaults,
            namespaces = self.namespaces.len(),
            "building cache registry"
        );

        let mut builder = Registry::builder().defaults(self.defaults);
        for (namespace, policy) in self.namespaces {
            builder = builder.namespace(namespace, policy);
        }
        Ok(builder
            .backends(move |namespace: &Namespace| factory.create(namespace))
            .build())
    }
}
