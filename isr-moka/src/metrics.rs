//! Moka store capacity metrics.
//!
//! Enable the `metrics` feature to record these.
//!
//! ## Metrics
//!
//! - `isr_moka_entries` - Current number of pages in the store (gauge)
//! - `isr_moka_size_bytes` - Current weighted size in bytes (gauge)
//!
//! Both metrics carry a `backend` label to tell several Moka stores apart.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for the page count gauge.
    pub static ref MOKA_ENTRIES: &'static str = {
        metrics::describe_gauge!(
            "isr_moka_entries",
            "Current number of pages in the Moka store."
        );
        "isr_moka_entries"
    };

    /// Metric name for the size gauge.
    pub static ref MOKA_SIZE_BYTES: &'static str = {
        metrics::describe_gauge!(
            "isr_moka_size_bytes",
            "Current weighted size of the Moka store in bytes."
        );
        "isr_moka_size_bytes"
    };
}

/// Record current store capacity.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_capacity(backend: &str, entries: u64, size_bytes: u64) {
    metrics::gauge!(*MOKA_ENTRIES, "backend" => backend.to_string()).set(entries as f64);
    metrics::gauge!(*MOKA_SIZE_BYTES, "backend" => backend.to_string()).set(size_bytes as f64);
}

/// Record current store capacity (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_capacity(_backend: &str, _entries: u64, _size_bytes: u64) {}
