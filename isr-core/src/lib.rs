#![warn(missing_docs)]
//! # isr-core
//!
//! Core types and traits for incremental static regeneration (ISR) at the edge.
//!
//! This crate holds everything the regeneration state machine in `isr` reasons
//! about, without committing to a particular store, router or runtime:
//!
//! - **Pages**: [`CachedPage`] and its [`PageMeta`], the unit persisted in a store
//! - **Policies**: [`RoutePolicy`], the per-route freshness rule
//! - **Keys**: [`CacheKey`] and the [`KeyStrategy`] that derives it from a request
//! - **Freshness**: [`Freshness::classify`] and [`age_secs`]
//! - **Messages**: [`PageRequest`] going to the origin, [`RenderedPage`] coming back
//!
//! It also defines the seams to the outside world:
//!
//! - [`Upstream`]: the origin renderer
//! - [`PolicyResolver`]: maps a path to its [`RoutePolicy`]
//! - [`Offload`]: runs detached work past the end of a request
//!
//! ## Freshness at a glance
//!
//! ```
//! use chrono::{Duration, Utc};
//! use isr_core::{CacheKey, CachedPage, Freshness, PageMeta, RoutePolicy};
//!
//! let now = Utc::now();
//! let policy = RoutePolicy::Interval(15);
//! let page = CachedPage::new(
//!     CacheKey::new("/blog"),
//!     "<html></html>",
//!     PageMeta::new(now - Duration::seconds(20), policy),
//! );
//!
//! assert_eq!(Freshness::classify(policy, Some(&page), now), Freshness::Stale);
//! assert_eq!(Freshness::classify(policy, None, now), Freshness::Absent);
//! ```

pub mod context;
pub mod freshness;
pub mod key;
pub mod offload;
pub mod page;
pub mod policy;
pub mod request;
pub mod resolver;
pub mod response;
pub mod upstream;

pub use context::{CacheContext, CacheStatus};
pub use freshness::{Freshness, age_secs};
pub use key::{CacheKey, KeyStrategy};
pub use offload::Offload;
pub use page::{CachedPage, PageMeta};
pub use policy::RoutePolicy;
pub use request::PageRequest;
pub use resolver::PolicyResolver;
pub use response::{Cacheability, RenderedPage};
pub use upstream::Upstream;

/// Raw page bytes.
/// Using `Bytes` keeps clones of cached bodies reference-counted.
pub type Raw = bytes::Bytes;
