//! Occupancy gauges of the memory adapter, recorded after every write when
//! the `metrics` feature is enabled.
//!
//! | Gauge | Value |
//! |-------|-------|
//! | `cachebox_memory_entries` | stored values |
//! | `cachebox_memory_weighted_bytes` | weighted size, equal to the entry count without `max_bytes` |
//!
//! Each gauge is labelled with `adapter`, the adapter label.

#[cfg(feature = "metrics")]
lazy_static::lazy_static! {
    static ref ENTRIES: &'static str = {
        metrics::describe_gauge!("cachebox_memory_entries", "Values held by a memory adapter.");
        "cachebox_memory_entries"
    };
    static ref WEIGHTED_BYTES: &'static str = {
        metrics::describe_gauge!(
            "cachebox_memory_weighted_bytes",
            metrics::Unit::Bytes,
            "Weighted size of a memory adapter."
        );
        "cachebox_memory_weighted_bytes"
    };
}

/// Publishes the occupancy of the adapter labelled `adapter`.
#[cfg(feature = "metrics")]
pub(crate) fn record_occupancy(adapter: &str, entries: u64, weighted_size: u64) {
    let label = adapter.to_owned();
    metrics::gauge!(*ENTRIES, "adapter" => label.clone()).set(entries as f64);
    metrics::gauge!(*WEIGHTED_BYTES, "adapter" => label).set(weighted_size as f64);
}

#[cfg(not(feature = "metrics"))]
#[inline(always)]
pub(crate) fn record_occupancy(_adapter: &str, _entries: u64, _weighted_size: u64) {}
