//! Error types for storage adapter operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for storage adapter operations.
///
/// This enum categorizes errors that can occur during adapter interactions
/// into distinct groups for appropriate handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal adapter error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote stores (e.g., Redis).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

impl BackendError {
    /// Wraps any error as an internal adapter error.
    pub fn internal(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        BackendError::InternalError(Box::new(error))
    }

    /// Wraps any error as a connection error.
    pub fn connection(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        BackendError::ConnectionError(Box::new(error))
    }
}
