//! Registry of detached tasks.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use isr_core::{CacheKey, Offload};
use smol_str::SmolStr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::policy::{OffloadConfig, TimeoutPolicy};

#[cfg(feature = "metrics")]
use crate::metrics::{
    OFFLOAD_TASK_DURATION, OFFLOAD_TASKS_ACTIVE, OFFLOAD_TASKS_COMPLETED,
    OFFLOAD_TASKS_DEDUPLICATED, OFFLOAD_TASKS_SPAWNED, OFFLOAD_TASKS_TIMEOUT,
};

/// Identity of a detached task in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OffloadKey {
    /// Task working on a single page (enables deduplication).
    Keyed {
        /// Kind of the task (e.g. "revalidate", "write").
        kind: SmolStr,
        /// Key of the page the task works on.
        key: CacheKey,
    },
    /// Auto-generated key for tasks that are never deduplicated.
    Generated {
        /// Kind of the task.
        kind: SmolStr,
        /// Unique identifier within the manager.
        id: u64,
    },
}

impl OffloadKey {
    /// Kind of work, also used as the metrics label.
    pub fn kind(&self) -> &SmolStr {
        match self {
            Self::Keyed { kind, .. } | Self::Generated { kind, .. } => kind,
        }
    }
}

/// Join handle kept in the registry.
#[derive(Debug)]
pub struct OffloadHandle {
    handle: JoinHandle<()>,
}

impl OffloadHandle {
    /// Whether the task has settled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Aborts the task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

#[derive(Debug)]
struct OffloadManagerInner {
    config: OffloadConfig,
    tasks: DashMap<OffloadKey, OffloadHandle>,
    key_counter: AtomicU64,
}

/// Runs regenerations and store writes after the response is returned.
///
/// Clones share the same task registry, so any clone can wait for work
/// spawned through another.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    inner: Arc<OffloadManagerInner>,
}

impl OffloadManager {
    /// Creates a manager with its own empty registry.
    pub fn new(config: OffloadConfig) -> Self {
        Self {
            inner: Arc::new(OffloadManagerInner {
                config,
                tasks: DashMap::new(),
                key_counter: AtomicU64::new(0),
            }),
        }
    }

    /// Unbounded tasks, no deduplication.
    pub fn with_defaults() -> Self {
        Self::new(OffloadConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OffloadConfig {
        &self.inner.config
    }

    fn next_key(&self, kind: impl Into<SmolStr>) -> OffloadKey {
        let id = self.inner.key_counter.fetch_add(1, Ordering::Relaxed);
        OffloadKey::Generated {
            kind: kind.into(),
            id,
        }
    }

    /// Spawn a task with auto-generated key and specified kind.
    ///
    /// # Example
    /// ```ignore
    /// manager.spawn("revalidate", async { /* ... */ });
    /// ```
    pub fn spawn<F>(&self, kind: impl Into<SmolStr>, task: F) -> OffloadKey
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let key = self.next_key(kind);
        self.spawn_with_key(key.clone(), task);
        key
    }

    /// Spawn a task with a specific key.
    ///
    /// If deduplication is enabled and a keyed task with the same key is
    /// still running, the new task is dropped without being polled.
    ///
    /// Returns `true` if the task was spawned, `false` if it was deduplicated.
    pub fn spawn_with_key<F>(&self, key: OffloadKey, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.config.deduplicate
            && matches!(&key, OffloadKey::Keyed { .. })
            && self.is_in_flight(&key)
        {
            debug!(?key, "Task deduplicated - already in flight");
            #[cfg(feature = "metrics")]
            metrics::counter!(*OFFLOAD_TASKS_DEDUPLICATED, "kind" => key.kind().to_string())
                .increment(1);
            return false;
        }

        #[cfg(feature = "metrics")]
        {
            metrics::counter!(*OFFLOAD_TASKS_SPAWNED, "kind" => key.kind().to_string())
                .increment(1);
            metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "kind" => key.kind().to_string())
                .increment(1.0);
        }

        let (registered, on_registered) = oneshot::channel();
        let handle = self.spawn_inner(task, key.clone(), on_registered);
        self.inner.tasks.insert(key, handle);
        // The task removes its own entry when done, so it may only start once
        // the entry exists.
        let _ = registered.send(());
        true
    }

    /// Number of registered tasks still running.
    pub fn active_task_count(&self) -> usize {
        self.inner.tasks.iter().filter(|e| !e.is_finished()).count()
    }

    /// Drops handles of settled tasks.
    pub fn cleanup_finished(&self) {
        self.inner.tasks.retain(|_, handle| !handle.is_finished());
    }

    /// Aborts every registered task.
    pub fn cancel_all(&self) {
        for entry in self.inner.tasks.iter() {
            entry.abort();
        }
    }

    /// Whether a task under `key` is still running.
    pub fn is_in_flight(&self, key: &OffloadKey) -> bool {
        self.inner.tasks.get(key).is_some_and(|h| !h.is_finished())
    }

    /// Wait for all currently tracked tasks to complete.
    ///
    /// Tasks spawned while waiting are waited for too.
    pub async fn wait_all(&self) {
        loop {
            self.cleanup_finished();
            if self.inner.tasks.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Wait for all tasks with a timeout.
    ///
    /// Returns `true` if all tasks completed within the timeout,
    /// `false` if the timeout was reached.
    pub async fn wait_all_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_all()).await.is_ok()
    }

    fn spawn_inner<F>(
        &self,
        task: F,
        key: OffloadKey,
        on_registered: oneshot::Receiver<()>,
    ) -> OffloadHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let timeout_policy = self.inner.config.timeout_policy;
        let inner = self.inner.clone();
        let task = async move {
            let _ = on_registered.await;
            task.await;
        };

        let span = info_span!("offload_task", kind = %key.kind(), key = ?key);

        let handle = match timeout_policy {
            TimeoutPolicy::None => tokio::spawn(
                async move {
                    let start = Instant::now();
                    task.await;
                    inner.tasks.remove(&key);
                    Self::record_completion(start, key.kind());
                }
                .instrument(span),
            ),
            TimeoutPolicy::Cancel(duration) => tokio::spawn(
                async move {
                    let start = Instant::now();
                    match tokio::time::timeout(duration, task).await {
                        Ok(()) => Self::record_completion(start, key.kind()),
                        Err(_) => {
                            warn!(?key, "Offload task cancelled due to timeout");
                            Self::record_timeout(start, key.kind());
                        }
                    }
                    inner.tasks.remove(&key);
                }
                .instrument(span),
            ),
            TimeoutPolicy::Warn(duration) => tokio::spawn(
                async move {
                    let start = Instant::now();
                    task.await;
                    let elapsed = start.elapsed();
                    if elapsed > duration {
                        warn!(
                            ?key,
                            elapsed_ms = elapsed.as_millis(),
                            threshold_ms = duration.as_millis(),
                            "Offload task exceeded timeout threshold"
                        );
                    }
                    inner.tasks.remove(&key);
                    Self::record_completion(start, key.kind());
                }
                .instrument(span),
            ),
        };

        OffloadHandle { handle }
    }

    #[cfg(feature = "metrics")]
    fn record_completion(start: Instant, kind: &SmolStr) {
        let duration = start.elapsed().as_secs_f64();
        metrics::counter!(*OFFLOAD_TASKS_COMPLETED, "kind" => kind.to_string()).increment(1);
        metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "kind" => kind.to_string()).decrement(1.0);
        metrics::histogram!(*OFFLOAD_TASK_DURATION, "kind" => kind.to_string()).record(duration);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_completion(start: Instant, kind: &SmolStr) {
        debug!(%kind, elapsed_ms = start.elapsed().as_millis(), "Offload task completed");
    }

    #[cfg(feature = "metrics")]
    fn record_timeout(start: Instant, kind: &SmolStr) {
        let duration = start.elapsed().as_secs_f64();
        metrics::counter!(*OFFLOAD_TASKS_TIMEOUT, "kind" => kind.to_string()).increment(1);
        metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "kind" => kind.to_string()).decrement(1.0);
        metrics::histogram!(*OFFLOAD_TASK_DURATION, "kind" => kind.to_string()).record(duration);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_timeout(_start: Instant, _kind: &SmolStr) {}
}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Offload for OffloadManager {
    fn spawn<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        OffloadManager::spawn(self, kind, future);
    }

    fn spawn_for<F>(&self, kind: impl Into<SmolStr>, key: &CacheKey, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.config.deduplicate {
            let key = OffloadKey::Keyed {
                kind: kind.into(),
                key: key.clone(),
            };
            self.spawn_with_key(key, future);
        } else {
            OffloadManager::spawn(self, kind, future);
        }
    }
}
