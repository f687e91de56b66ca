//! Tower middleware for incremental static regeneration.
//!
//! This crate provides [`IsrLayer`], a Tower [`Layer`] that puts the `isr`
//! regeneration state machine in front of any Tower HTTP service. The wrapped
//! service acts as the origin renderer: it is called on a cold miss, for
//! bypassed routes, and from background regenerations of stale pages.
//!
//! # Quick Start
//!
//! ```ignore
//! use isr::{IsrConfig, RoutePolicy, RouteTable};
//! use isr_moka::MokaBackend;
//! use isr_tower::IsrLayer;
//! use tower::{ServiceBuilder, service_fn};
//!
//! let routes = RouteTable::builder()
//!     .route("/", RoutePolicy::Permanent)
//!     .route("/blog/{slug}", RoutePolicy::Interval(60))
//!     .build()?;
//!
//! let layer = IsrLayer::builder()
//!     .backend(MokaBackend::builder().max_entries(10_000).build())
//!     .config(IsrConfig::builder().routes(routes).build())
//!     .build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(layer)
//!     .service(service_fn(|_req| async {
//!         Ok::<_, std::convert::Infallible>(http::Response::new(
//!             http_body_util::Full::new(bytes::Bytes::from("<h1>hello</h1>")),
//!         ))
//!     }));
//! ```
//!
//! # Response Headers
//!
//! Pages handled by the cache carry:
//!
//! | Header | Value |
//! |--------|-------|
//! | `x-isr-cache` | `HIT`, `MISS` or `REVALIDATE` |
//! | `age` | seconds since the page was rendered |
//! | `cache-control` | `public, max-age=0, s-maxage=<n>, stale-while-revalidate` |
//!
//! Bypassed requests, redirects and error renders pass through untouched.
//! The marker header name comes from [`IsrConfig`](isr::IsrConfig).
//!
//! [`Layer`]: tower::Layer

#![warn(missing_docs)]

/// Errors surfaced by the middleware.
pub mod error;
/// Tower layer and builder.
pub mod layer;
/// The Tower service running the regeneration state machine.
pub mod service;
/// Upstream adapter for bridging Tower services to the state machine.
pub mod upstream;

pub use error::IsrServiceError;
pub use layer::{IsrLayer, IsrLayerBuilder};
pub use service::IsrService;
pub use upstream::TowerUpstream;
