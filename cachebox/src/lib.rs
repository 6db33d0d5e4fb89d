//! # cachebox
//!
//! Transparent query-result caching for data store reads.
//!
//! Application code describes a read as a [`FetchRequest`] and hands it to a
//! [`CachedFetch`], which wraps the real fetch capability. Per fingerprint, a
//! [`CacheEntry`] decides whether to serve a stored result, fetch and store a
//! fresh one, or bypass the cache entirely. Callers can always tell which of
//! these happened.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use cachebox::{CachedFetch, FetchRequest, Registry};
//! use cachebox::backend::Backend;
//! use cachebox_moka::MokaBackend;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::builder()
//!     .backends(|_: &cachebox::Namespace| {
//!         Ok(Arc::new(MokaBackend::builder().max_entries(1_000).build()) as Arc<dyn Backend>)
//!     })
//!     .build();
//!
//! let people = CachedFetch::new(
//!     |request: FetchRequest| async move {
//!         Ok::<_, std::io::Error>(vec![format!("result of {}", request.fingerprint())])
//!     },
//!     Arc::new(registry),
//! );
//!
//! let query = people.query(FetchRequest::new("people"))?;
//! query.cache_for(Duration::from_secs(30));
//!
//! let first = query.execute().await?;
//! let second = query.execute().await?;
//! assert!(!first.from_cache);
//! assert!(second.from_cache);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics` - record hit/miss/bypass counters and fetch latency via the
//!   [`metrics`](https://docs.rs/metrics) facade
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Storage adapter re-exports.
///
/// This module re-exports the storage adapter traits from `cachebox-backend`
/// so custom adapters can be written against `cachebox` alone.
pub mod backend;

/// Cache defaults and per-namespace policies.
pub mod config;

/// Per-fingerprint cache entry controller.
///
/// [`CacheEntry`](entry::CacheEntry) holds the enabled flag, TTL and recache
/// state of one fingerprint and runs the lookup, fetch and store cycle.
pub mod entry;

/// Error types for cache operations.
pub mod error;

/// Caching decorator over a fetch capability.
pub mod interceptor;

/// Metrics collection for cache observability.
///
/// When the `metrics` feature is enabled, this module provides counters
/// for hits, misses, bypasses, recaches, middleware overrides and failed
/// writes, plus a fetch latency histogram.
pub mod metrics;

/// Interception middleware invoked on every cache lookup.
pub mod middleware;

/// Per-request handle with fluent cache controls.
pub mod query;

/// Registry of cache entries and per-namespace storage adapters.
pub mod registry;

pub use cachebox_core::{
    CacheValue, Cacheable, Fetch, FetchRequest, Fingerprint, Namespace, SortOrder,
};
pub use config::{CacheDefaults, NamespacePolicy, NotSet};
pub use entry::{CacheEntry, EntryState, Fetched};
pub use error::CacheError;
pub use interceptor::CachedFetch;
pub use middleware::{Decision, Middleware};
pub use query::Query;
pub use registry::{BackendFactory, Registry, RegistryBuilder};

/// The `cachebox` prelude.
///
/// ```rust
/// use cachebox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CacheError, CachedFetch, Decision, Fetch, FetchRequest, Fetched, Registry, SortOrder,
    };
}
