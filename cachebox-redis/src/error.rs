//! Error types for Redis adapter operations.
//!
//! All errors convert to [`BackendError`] for uniform handling across
//! adapters.
//!
//! [`BackendError`]: cachebox_backend::BackendError

use cachebox_backend::BackendError;
use redis::RedisError;

/// Error type for Redis adapter operations.
///
/// # When You'll Encounter This
///
/// - Using [`RedisBackendBuilder::build`] with an invalid connection URL
/// - Performing the first cache operation when Redis is unreachable
///   (the connection is established lazily)
/// - Performing cache operations when the Redis server returns an error
///
/// [`RedisBackendBuilder::build`]: crate::RedisBackendBuilder::build
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("Redis backend error: {0}")]
    Redis(#[from] RedisError),
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        let connection = match &error {
            Error::Redis(redis) => {
                redis.is_io_error()
                    || redis.is_connection_refusal()
                    || redis.is_connection_dropped()
                    || redis.is_timeout()
            }
        };
        if connection {
            Self::ConnectionError(Box::new(error))
        } else {
            Self::InternalError(Box::new(error))
        }
    }
}
