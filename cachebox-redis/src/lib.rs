//! Remote key-value storage adapter for cachebox.
//!
//! [`RedisBackend`] stores each cached value as a Redis hash holding the
//! encoded data, the storage timestamp and the TTL, and lets Redis expire the
//! key natively. Values are JSON-encoded by default so other processes can
//! read them.
//!
//! The connection is established lazily on first use. Building an adapter only
//! validates the connection URL.
#![warn(missing_docs)]

pub mod backend;
pub mod error;

#[doc(inline)]
pub use crate::backend::{RedisBackend, RedisBackendBuilder};
#[doc(inline)]
pub use crate::error::Error;
