//! Configuration errors.

use cachebox_backend::BackendError;
use thiserror::Error;

/// Error raised while loading a configuration or building a registry from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// An option has an invalid value.
    #[error("invalid option `{option}`: {reason}")]
    InvalidOption {
        /// Name of the offending option.
        option: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A custom adapter name was not registered.
    #[error("unknown adapter `{0}`")]
    UnknownAdapter(String),

    /// The adapter was compiled out by a disabled cargo feature.
    #[error("adapter not available: {0}")]
    BackendNotAvailable(String),

    /// The adapter could not be created.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ConfigError {
    pub(crate) fn invalid(option: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidOption {
            option,
            reason: reason.into(),
        }
    }
}
