//! In-memory storage adapter for cachebox.
//!
//! [`MokaBackend`] keeps serialized values in a bounded, least-recently-used
//! [moka](https://docs.rs/moka) cache. Each entry expires after the TTL it was
//! stored with, capped by the adapter-wide maximum age when one is set.
//!
//! ```
//! use cachebox_moka::MokaBackend;
//! use std::time::Duration;
//!
//! let backend = MokaBackend::builder()
//!     .max_entries(10_000)
//!     .max_age(Duration::from_secs(300))
//!     .build();
//! ```
#![warn(missing_docs)]

mod backend;
mod builder;
mod metrics;

pub use backend::MokaBackend;
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
