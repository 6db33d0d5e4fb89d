//! Storage adapter traits.
//!
//! - `Backend` - byte-level storage operations
//! - `CacheBackend` - typed get/set/delete with TTL verification
//! - `BackendError` - error type for adapter operations
//! - `DeleteStatus` - result of removing a stored value
//!
//! ## Built-in Adapters
//!
//! | Adapter | Crate | Use Case |
//! |---------|-------|----------|
//! | Memory | `cachebox-moka` | In-process LRU, single instance |
//! | Remote | `cachebox-redis` | Shared across processes |

pub use cachebox_backend::{
    Backend, BackendError, BackendResult, CacheBackend, CacheKeyFormat, DeleteStatus,
};
