//! # isr
//!
//! Incremental static regeneration (ISR) for page-serving HTTP services.
//!
//! Pages are rendered by an origin once, stored, and served from the store
//! until their route's freshness window runs out. A request that finds a
//! stale page still gets it immediately, while a fresh copy is rendered and
//! stored in the background.
//!
//! ## Request flow
//!
//! | Route policy | Stored page | Outcome | Origin call |
//! |--------------|-------------|---------|-------------|
//! | `Disabled`, or not `GET`/`HEAD` | n/a | passthrough, no cache headers | synchronous |
//! | any enabled | absent | `MISS`, render stored in background | synchronous |
//! | any enabled | fresh | `HIT` | none |
//! | `Interval(n)` | older than `n` s | `REVALIDATE`, stale page served | background |
//!
//! The pieces:
//!
//! - [`fsm::CacheFuture`] drives one request through that table
//! - [`RouteTable`] resolves a path to its [`RoutePolicy`]
//! - [`IsrConfig`] holds key derivation, store TTL and header settings
//! - [`offload::OffloadManager`] runs detached writes and regenerations
//! - [`shaper`] sets `age`, `cache-control` and the cache-state marker
//!
//! Stores implement [`Backend`](isr_backend::Backend) from `isr-backend`;
//! `isr-moka` provides an in-memory one.
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Configuration for the regeneration state machine.
pub mod config;

/// Error types for configuration.
pub mod error;

/// Finite State Machine for page regeneration.
pub mod fsm;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, counters are recorded for every
/// request outcome, regeneration result, store failure and offload task.
pub mod metrics;

/// Background task offloading for writes and regeneration.
pub mod offload;

/// Route policy table.
pub mod routes;

/// Cache header shaping.
pub mod shaper;

pub use config::{IsrConfig, IsrConfigBuilder, NotSet};
pub use error::ConfigError;
pub use fsm::CacheFuture;
pub use offload::{OffloadConfig, OffloadManager, TimeoutPolicy};
pub use routes::{RouteRule, RouteTable, RouteTableBuilder};

pub use isr_backend::{Backend, BackendError, BackendResult, CompositionBackend, DeleteStatus};
pub use isr_core::{
    CacheContext, CacheKey, CacheStatus, CachedPage, Cacheability, Freshness, KeyStrategy,
    Offload, PageMeta, PageRequest, PolicyResolver, RenderedPage, RoutePolicy, Upstream, age_secs,
};
