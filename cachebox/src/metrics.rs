//! Metrics declaration and recording.
//!
//! Every metric carries a `namespace` label.
//!
//! - `cachebox_cache_hit_total` - values served as cached, from storage or
//!   by a middleware
//! - `cachebox_cache_miss_total` - lookups that fell through to a fetch
//! - `cachebox_cache_bypass_total` - executions with caching disabled
//! - `cachebox_cache_recache_total` - stored values dropped after a TTL change
//! - `cachebox_cache_override_total` - lookups decided by an installed
//!   middleware, whatever it decided
//! - `cachebox_cache_write_error_total` - failed writes of fetched values
//! - `cachebox_fetch_duration_seconds` - duration of the underlying fetch

use std::time::Duration;

use cachebox_core::Namespace;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of cache hit events.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachebox_cache_hit_total",
            "Total number of cache hit events."
        );
        "cachebox_cache_hit_total"
    };
    /// Track number of cache miss events.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachebox_cache_miss_total",
            "Total number of cache miss events."
        );
        "cachebox_cache_miss_total"
    };
    /// Track number of executions that bypassed the cache.
    pub static ref CACHE_BYPASS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachebox_cache_bypass_total",
            "Total number of executions with caching disabled."
        );
        "cachebox_cache_bypass_total"
    };
    /// Track number of recache events.
    pub static ref CACHE_RECACHE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachebox_cache_recache_total",
            "Total number of stored values dropped after a TTL change."
        );
        "cachebox_cache_recache_total"
    };
    /// Track number of lookups decided by a middleware.
    pub static ref CACHE_OVERRIDE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachebox_cache_override_total",
            "Total number of lookups decided by a middleware."
        );
        "cachebox_cache_override_total"
    };
    /// Track number of failed writes.
    pub static ref CACHE_WRITE_ERROR_COUNTER: &'static str = {
        metrics::describe_counter!(
            "cachebox_cache_write_error_total",
            "Total number of failed writes of fetched values."
        );
        "cachebox_cache_write_error_total"
    };
    /// Histogram of fetch duration.
    pub static ref FETCH_DURATION: &'static str = {
        metrics::describe_histogram!(
            "cachebox_fetch_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of underlying fetches in seconds."
        );
        "cachebox_fetch_duration_seconds"
    };
}

/// Outcome of one cache-aware execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Served as cached, from storage or by a middleware.
    Hit,
    /// Fell through to a fetch.
    Miss,
    /// Caching disabled.
    Bypass,
    /// Stored value dropped after a TTL change.
    Recache,
    /// An installed middleware decided the lookup.
    Override,
    /// Writing the fetched value failed.
    WriteError,
}

#[cfg(feature = "metrics")]
impl Event {
    fn metric(self) -> &'static str {
        match self {
            Event::Hit => *CACHE_HIT_COUNTER,
            Event::Miss => *CACHE_MISS_COUNTER,
            Event::Bypass => *CACHE_BYPASS_COUNTER,
            Event::Recache => *CACHE_RECACHE_COUNTER,
            Event::Override => *CACHE_OVERRIDE_COUNTER,
            Event::WriteError => *CACHE_WRITE_ERROR_COUNTER,
        }
    }
}

/// Record a cache event.
#[cfg(feature = "metrics")]
#[inline]
pub fn record(namespace: &Namespace, event: Event) {
    metrics::counter!(event.metric(), "namespace" => namespace.to_string()).increment(1);
}

/// Record a cache event (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record(_namespace: &Namespace, _event: Event) {}

/// Record the duration of an underlying fetch.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_fetch_duration(namespace: &Namespace, duration: Duration) {
    metrics::histogram!(*FETCH_DURATION, "namespace" => namespace.to_string())
        .record(duration.as_secs_f64());
}

/// Record the duration of an underlying fetch (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_fetch_duration(_namespace: &Namespace, _duration: Duration) {}
