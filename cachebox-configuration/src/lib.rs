//! Declarative configuration for cachebox.
//!
//! A [`CacheConfig`] describes the storage adapter, the registry defaults and
//! per-namespace policies. It is usually read from YAML:
//!
//! ```
//! use cachebox_configuration::CacheConfig;
//!
//! let config = CacheConfig::from_yaml(
//!     r#"
//! adapter:
//!   type: memory
//!   max_entries: 10000
//!   max_age: 5m
//! ttl: 60s
//! cache: true
//! namespaces:
//!   people: { ttl: 90s }
//!   audit: { cache: false }
//! "#,
//! )
//! .unwrap();
//!
//! let registry = config.into_registry().unwrap();
//! assert!(registry.defaults().enabled);
//! ```
//!
//! Initialization validates the whole configuration up front, so an invalid
//! setup never produces a registry.
//!
//! ## Feature Flags
//!
//! - `moka` (default) - the `memory` adapter
//! - `redis` - the `remote` adapter
#![warn(missing_docs)]

pub mod adapter;
mod config;
pub mod error;

pub use adapter::{Adapter, CustomAdapters};
pub use config::CacheConfig;
pub use error::ConfigError;
