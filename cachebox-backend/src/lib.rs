//! Traits and structs for cachebox storage adapters.
//!
//! A storage adapter persists serialized [`CacheValue`](cachebox_core::CacheValue)s
//! under [`Fingerprint`](cachebox_core::Fingerprint)s. Implement [`Backend`] for the
//! raw byte-level operations, then opt into [`CacheBackend`] to get typed
//! `get`/`set`/`delete` with TTL verification on read.
mod backend;
pub mod error;
pub mod format;
mod key;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use error::BackendError;
pub use format::{Format, FormatError, FormatExt, JsonFormat, RonFormat};
pub use key::CacheKeyFormat;

/// Status of deleting result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}
