//! Offload trait for detached task execution.
//!
//! This module provides the [`Offload`] trait which abstracts over
//! different ways of running work after a response has been returned.

use std::future::Future;

use smol_str::SmolStr;

use crate::CacheKey;

/// Trait for spawning detached tasks.
///
/// Regeneration renders and store writes run through this trait so the
/// request that triggered them can complete without waiting. Spawned work
/// must be driven to completion even after the response has been flushed;
/// it has no cancellation token.
///
/// # Implementations
///
/// The primary implementation is `OffloadManager` in the `isr` crate, which
/// runs tasks on the tokio runtime with configurable timeouts. Hosts with
/// their own lifecycle manager (an edge runtime's "wait until" hook, a
/// thread pool) can implement it directly.
///
/// # Clone bound
///
/// Implementors should use `Arc` internally so all clones share the same
/// configuration and bookkeeping.
pub trait Offload: Send + Sync + Clone {
    /// Spawn a future to run in the background.
    ///
    /// # Arguments
    ///
    /// * `kind` - A label for the task type (`"revalidate"`, `"write"`).
    ///   Used for metrics and tracing.
    /// * `future` - The work to run. Must be `Send + 'static` as it outlives
    ///   the request that spawned it.
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Spawn a future working on a single cache key.
    ///
    /// Implementations may use the key to skip work already in flight for
    /// the same key and kind. The default just calls [`spawn`](Self::spawn).
    fn spawn_for<F>(&self, kind: impl Into<SmolStr>, _key: &CacheKey, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn(kind, future);
    }
}
