use serde::{Serialize, de::DeserializeOwned};

/// Trait that abstracts the requirements for values produced by a fetch and
/// stored in the cache.
///
/// Values must round-trip through a textual or binary format and cross task
/// boundaries, hence the serde and thread-safety bounds.
pub trait Cacheable: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Cacheable for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}
