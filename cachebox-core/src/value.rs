//! Cached value type with storage metadata.
//!
//! - [`CacheValue`] wraps cached data with the time it was stored and the
//!   TTL it was stored under
//! - [`CacheMeta`] is the metadata without the data
//!
//! A value is expired once `stored_at + ttl` lies in the past. Values stored
//! without a TTL never expire on their own, though adapters may still evict
//! them.

use chrono::{DateTime, TimeDelta, Utc};
use std::mem::size_of;
use std::time::Duration;

use crate::Raw;

/// A cached value with storage metadata.
///
/// # Example
///
/// ```
/// use cachebox_core::CacheValue;
/// use std::time::Duration;
///
/// let value = CacheValue::fresh("user_data", Some(Duration::from_secs(60)));
///
/// assert_eq!(value.data(), &"user_data");
/// assert!(!value.is_expired());
/// assert!(value.remaining().is_some());
///
/// let data = value.into_inner();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValue<T> {
    data: T,
    stored_at: DateTime<Utc>,
    ttl: Option<Duration>,
}

impl<T> CacheValue<T> {
    /// Creates a cache value with explicit metadata.
    pub fn new(data: T, stored_at: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        CacheValue {
            data,
            stored_at,
            ttl,
        }
    }

    /// Creates a cache value stored now.
    pub fn fresh(data: T, ttl: Option<Duration>) -> Self {
        Self::new(data, Utc::now(), ttl)
    }

    /// Returns a reference to the cached data.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the data was stored.
    #[inline]
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Returns the TTL the data was stored under.
    #[inline]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns when the data expires.
    ///
    /// `None` when stored without a TTL, or when the TTL is too large to be
    /// represented as a point in time.
    pub fn expire(&self) -> Option<DateTime<Utc>> {
        let ttl = TimeDelta::from_std(self.ttl?).ok()?;
        self.stored_at.checked_add_signed(ttl)
    }

    /// Time left until expiry, measured from `now`.
    ///
    /// Returns `None` for values without expiry and [`Duration::ZERO`] for
    /// already expired values.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        let expire = self.expire()?;
        Some(
            expire
                .signed_duration_since(now)
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Time left until expiry, measured from the current time.
    pub fn remaining(&self) -> Option<Duration> {
        self.remaining_at(Utc::now())
    }

    /// Whether the value is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire().is_some_and(|expire| expire <= now)
    }

    /// Whether the value is expired at the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Consumes the cache value and returns the inner data.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Consumes the cache value and returns metadata and data separately.
    pub fn into_parts(self) -> (CacheMeta, T) {
        (CacheMeta::new(self.stored_at, self.ttl), self.data)
    }

    /// Reassembles a cache value from its parts.
    pub fn from_parts(meta: CacheMeta, data: T) -> Self {
        Self::new(data, meta.stored_at, meta.ttl)
    }
}

/// Cache storage metadata without the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMeta {
    /// When the data was stored.
    pub stored_at: DateTime<Utc>,
    /// TTL the data was stored under.
    pub ttl: Option<Duration>,
}

impl CacheMeta {
    /// Creates new cache metadata.
    pub fn new(stored_at: DateTime<Utc>, ttl: Option<Duration>) -> CacheMeta {
        CacheMeta { stored_at, ttl }
    }
}

impl CacheValue<Raw> {
    /// Returns the estimated memory usage of this cache value in bytes.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.data.len()
    }
}
