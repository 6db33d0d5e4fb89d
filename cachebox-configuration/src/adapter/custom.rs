use std::fmt;
use std::sync::Arc;

use cachebox::BackendFactory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reference to an adapter registered in [`CustomAdapters`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Custom {
    /// Registered adapter name.
    pub name: String,
}

/// Adapter factories that `type: custom` can refer to by name.
///
/// ```
/// use std::sync::Arc;
/// use cachebox::Namespace;
/// use cachebox::backend::{Backend, BackendError};
/// use cachebox_configuration::{CacheConfig, CustomAdapters};
///
/// let adapters = CustomAdapters::new().register("unavailable", |_: &Namespace| {
///     Err::<Arc<dyn Backend>, _>(BackendError::internal(std::io::Error::other("offline")))
/// });
///
/// let config = CacheConfig::from_yaml("adapter:\n  type: custom\n  name: unavailable").unwrap();
/// assert!(config.into_registry_with(&adapters).is_ok());
/// ```
#[derive(Clone, Default)]
pub struct CustomAdapters {
    factories: IndexMap<String, Arc<dyn BackendFactory>>,
}

impl CustomAdapters {
    /// Creates an empty set of adapters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any previous one.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: BackendFactory + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<Arc<dyn BackendFactory>, ConfigError> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownAdapter(name.to_owned()))
    }
}

impl fmt::Debug for CustomAdapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
