//! Metrics declaration and recording.
//!
//! Everything here compiles to no-ops unless the `metrics` feature is on.

use isr_core::CacheStatus;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Request outcome metrics

    /// Track number of requests served from a fresh page.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "isr_cache_hit_total",
            "Total number of requests served from a fresh page."
        );
        "isr_cache_hit_total"
    };
    /// Track number of requests rendered synchronously by the origin.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "isr_cache_miss_total",
            "Total number of requests rendered synchronously by the origin."
        );
        "isr_cache_miss_total"
    };
    /// Track number of requests served stale while regenerating.
    pub static ref CACHE_REVALIDATE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "isr_cache_revalidate_total",
            "Total number of requests served stale while the page regenerates."
        );
        "isr_cache_revalidate_total"
    };
    /// Track number of requests that bypassed the cache.
    pub static ref CACHE_BYPASS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "isr_cache_bypass_total",
            "Total number of requests that bypassed the cache."
        );
        "isr_cache_bypass_total"
    };

    // Regeneration metrics

    /// Track number of regenerations that wrote a fresh page.
    pub static ref REGENERATION_SUCCESS: &'static str = {
        metrics::describe_counter!(
            "isr_regeneration_success_total",
            "Total number of background regenerations that stored a fresh page."
        );
        "isr_regeneration_success_total"
    };
    /// Track number of regenerations that failed.
    pub static ref REGENERATION_FAILURE: &'static str = {
        metrics::describe_counter!(
            "isr_regeneration_failure_total",
            "Total number of background regenerations that failed."
        );
        "isr_regeneration_failure_total"
    };

    // Store metrics

    /// Track store read errors per backend.
    pub static ref STORE_READ_ERRORS: &'static str = {
        metrics::describe_counter!(
            "isr_store_read_errors_total",
            "Total number of store read errors per backend."
        );
        "isr_store_read_errors_total"
    };
    /// Track store write errors per backend.
    pub static ref STORE_WRITE_ERRORS: &'static str = {
        metrics::describe_counter!(
            "isr_store_write_errors_total",
            "Total number of store write errors per backend."
        );
        "isr_store_write_errors_total"
    };

    // Offload manager metrics

    /// Track number of offload tasks spawned.
    pub static ref OFFLOAD_TASKS_SPAWNED: &'static str = {
        metrics::describe_counter!(
            "isr_offload_tasks_spawned_total",
            "Total number of offload tasks spawned."
        );
        "isr_offload_tasks_spawned_total"
    };
    /// Track number of offload tasks completed.
    pub static ref OFFLOAD_TASKS_COMPLETED: &'static str = {
        metrics::describe_counter!(
            "isr_offload_tasks_completed_total",
            "Total number of offload tasks completed."
        );
        "isr_offload_tasks_completed_total"
    };
    /// Track number of offload tasks that timed out.
    pub static ref OFFLOAD_TASKS_TIMEOUT: &'static str = {
        metrics::describe_counter!(
            "isr_offload_tasks_timeout_total",
            "Total number of offload tasks that timed out."
        );
        "isr_offload_tasks_timeout_total"
    };
    /// Track number of offload tasks deduplicated (skipped).
    pub static ref OFFLOAD_TASKS_DEDUPLICATED: &'static str = {
        metrics::describe_counter!(
            "isr_offload_tasks_deduplicated_total",
            "Total number of offload tasks skipped because one was already in flight."
        );
        "isr_offload_tasks_deduplicated_total"
    };
    /// Gauge of currently active offload tasks.
    pub static ref OFFLOAD_TASKS_ACTIVE: &'static str = {
        metrics::describe_gauge!(
            "isr_offload_tasks_active",
            "Number of currently active offload tasks."
        );
        "isr_offload_tasks_active"
    };
    /// Histogram of offload task duration.
    pub static ref OFFLOAD_TASK_DURATION: &'static str = {
        metrics::describe_histogram!(
            "isr_offload_task_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of offload tasks in seconds."
        );
        "isr_offload_task_duration_seconds"
    };
}

/// Record how a request was answered.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_status(status: CacheStatus) {
    let counter = match status {
        CacheStatus::Hit => *CACHE_HIT_COUNTER,
        CacheStatus::Miss => *CACHE_MISS_COUNTER,
        CacheStatus::Revalidate => *CACHE_REVALIDATE_COUNTER,
        CacheStatus::Bypass => *CACHE_BYPASS_COUNTER,
    };
    metrics::counter!(counter).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_status(_status: CacheStatus) {}

/// Record the outcome of a background regeneration.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_regeneration(success: bool) {
    let counter = if success {
        *REGENERATION_SUCCESS
    } else {
        *REGENERATION_FAILURE
    };
    metrics::counter!(counter).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_regeneration(_success: bool) {}

/// Record a failed store read.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_read_error(backend: &str) {
    metrics::counter!(*STORE_READ_ERRORS, "backend" => backend.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_read_error(_backend: &str) {}

/// Record a failed store write.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_write_error(backend: &str) {
    metrics::counter!(*STORE_WRITE_ERRORS, "backend" => backend.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_write_error(_backend: &str) {}
