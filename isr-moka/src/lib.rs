//! In-memory page store powered by [Moka](https://docs.rs/moka).
//!
//! `MokaBackend` is a good fit for a single-instance deployment, or as the
//! edge layer of an `isr_backend::CompositionBackend` in front of a shared
//! key-value store.
//!
//! ```
//! use isr_moka::MokaBackend;
//!
//! let backend = MokaBackend::builder().max_entries(10_000).build();
//! ```
#![warn(missing_docs)]

mod backend;
mod builder;
pub mod metrics;

pub use backend::MokaBackend;
pub use builder::{ByteCapacity, EntryCapacity, MokaBackendBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
