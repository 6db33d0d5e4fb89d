//! Storage key formats.
//!
//! This module provides different strategies for turning a [`Fingerprint`]
//! into the key an adapter stores the value under.
//!
//! # Available Formats
//!
//! | Format | Size | Reversible | Use Case |
//! |--------|------|------------|----------|
//! | [`Plain`](CacheKeyFormat::Plain) | Grows with the request | Yes | Default, debugging |
//! | [`Sha256`](CacheKeyFormat::Sha256) | Fixed | No | Remote stores, large filters |

use cachebox_core::Fingerprint;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Storage key format.
///
/// Determines how a [`Fingerprint`] is converted to the key string used by
/// the adapter. Both formats keep the namespace as a readable prefix.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheKeyFormat {
    /// The fingerprint verbatim: `namespace:canonical-json`.
    #[default]
    Plain,

    /// `namespace:` followed by the hex SHA-256 digest of the fingerprint.
    Sha256,
}

impl CacheKeyFormat {
    /// Builds the storage key for a fingerprint.
    pub fn storage_key(&self, key: &Fingerprint) -> String {
        match self {
            CacheKeyFormat::Plain => key.as_str().to_owned(),
            CacheKeyFormat::Sha256 => {
                let digest = Sha256::digest(key.as_str().as_bytes());
                format!("{}:{}", key.namespace(), hex::encode(digest))
            }
        }
    }
}
