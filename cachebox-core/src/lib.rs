#![warn(missing_docs)]
//! # cachebox-core
//!
//! Core types for the cachebox query-result caching layer.
//!
//! This crate holds the vocabulary shared by every other cachebox crate:
//!
//! - [`FetchRequest`] describes one read against a data store
//! - [`Fingerprint`] is its deterministic cache identity
//! - [`CacheValue`] wraps stored data with its storage time and TTL
//! - [`Fetch`] is the capability that actually talks to the data store
//!
//! Storage adapters live in `cachebox-backend` and its implementations, the
//! caching logic itself lives in `cachebox`.

pub mod cacheable;
pub mod fetch;
pub mod fingerprint;
pub mod namespace;
pub mod request;
pub mod value;

pub use cacheable::Cacheable;
pub use fetch::Fetch;
pub use fingerprint::Fingerprint;
pub use namespace::Namespace;
pub use request::{FetchRequest, SortOrder};
pub use value::{CacheMeta, CacheValue};

/// Raw byte data type used for serialized cache values.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
