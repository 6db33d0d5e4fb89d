//! Interception middleware.
//!
//! A middleware sees every lookup of its fingerprint, hits and misses alike,
//! right before the controller decides what to return. It receives the stored
//! value (if any) and the controller's TTL, and answers with a [`Decision`]:
//! serve a value as cached, or recompute it through the fetch capability.
//!
//! Any async function of the right shape is a middleware:
//!
//! ```
//! use std::time::Duration;
//! use cachebox::{Decision, Fingerprint, Middleware};
//!
//! async fn log_lookups(key: Fingerprint, cached: Option<u64>, ttl: Duration) -> Decision<u64> {
//!     println!("{key} ({ttl:?}): {cached:?}");
//!     Decision::proceed(cached)
//! }
//!
//! fn assert_middleware<M: Middleware<u64>>(_: M) {}
//! assert_middleware(log_lookups);
//! ```

use std::future::Future;
use std::time::Duration;

use cachebox_core::Fingerprint;
use futures::future::BoxFuture;

/// Outcome of an intercepted lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<T> {
    /// Return this value, marked as served from cache.
    Cached(T),
    /// Ignore storage, fetch a fresh value and store it.
    Recompute,
}

impl<T> Decision<T> {
    /// Continues with the normal flow: a stored value is served, an absent
    /// one is fetched.
    pub fn proceed(cached: Option<T>) -> Self {
        match cached {
            Some(value) => Decision::Cached(value),
            None => Decision::Recompute,
        }
    }
}

/// Hook invoked on every cache lookup of one fingerprint.
pub trait Middleware<T>: Send + Sync {
    /// Decides the outcome of a lookup.
    fn intercept(
        &self,
        key: Fingerprint,
        cached: Option<T>,
        ttl: Duration,
    ) -> BoxFuture<'static, Decision<T>>;
}

impl<T, F, Fut> Middleware<T> for F
where
    F: Fn(Fingerprint, Option<T>, Duration) -> Fut + Send + Sync,
    Fut: Future<Output = Decision<T>> + Send + 'static,
{
    fn intercept(
        &self,
        key: Fingerprint,
        cached: Option<T>,
        ttl: Duration,
    ) -> BoxFuture<'static, Decision<T>> {
        Box::pin((self)(key, cached, ttl))
    }
}
