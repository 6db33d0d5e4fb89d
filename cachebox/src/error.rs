use cachebox_backend::BackendError;
use thiserror::Error;

/// Error of a cached execution.
///
/// Only failures the caller can act on surface here. A failed write of a
/// freshly fetched value is logged and swallowed instead, and the value is
/// still returned.
#[derive(Debug, Error)]
pub enum CacheError<E> {
    /// The storage adapter failed on the read path or could not be created.
    #[error("cache storage error: {0}")]
    Backend(#[from] BackendError),

    /// The underlying fetch failed.
    #[error("fetch error: {0}")]
    Fetch(E),
}

impl<E> CacheError<E> {
    /// Returns the fetch error, if this is one.
    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            CacheError::Fetch(error) => Some(error),
            CacheError::Backend(_) => None,
        }
    }
}
