//! Bounds and switches for detached work.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long a detached render or write may run.
///
/// In YAML the durations use humantime notation, e.g. `{ Cancel: 30s }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutPolicy {
    /// Unbounded.
    #[default]
    None,
    /// Drop the task once it has run this long.
    Cancel(#[serde(with = "humantime_serde")] Duration),
    /// Let the task finish but log when it overran.
    Warn(#[serde(with = "humantime_serde")] Duration),
}

/// Settings of an [`OffloadManager`](super::OffloadManager).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffloadConfig {
    /// Bound applied to every task.
    pub timeout_policy: TimeoutPolicy,
    /// Skip a keyed task when one of the same kind is already in flight
    /// for the same key.
    ///
    /// Off by default: two regenerations of one page racing each other
    /// only cost an extra render, and the later write wins.
    pub deduplicate: bool,
}

impl OffloadConfig {
    /// Starts from the defaults: no bound, no deduplication.
    pub fn builder() -> OffloadConfigBuilder {
        OffloadConfigBuilder::default()
    }
}

/// Builder for [`OffloadConfig`].
#[derive(Debug, Clone, Default)]
pub struct OffloadConfigBuilder {
    config: OffloadConfig,
}

impl OffloadConfigBuilder {
    /// Sets the bound applied to every task.
    pub fn timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.config.timeout_policy = policy;
        self
    }

    /// Cancels tasks running longer than `duration`.
    pub fn timeout(self, duration: Duration) -> Self {
        self.timeout_policy(TimeoutPolicy::Cancel(duration))
    }

    /// Turns per-key deduplication on or off.
    pub fn deduplicate(mut self, enabled: bool) -> Self {
        self.config.deduplicate = enabled;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> OffloadConfig {
        self.config
    }
}
