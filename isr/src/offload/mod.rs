//! Detached task runtime.
//!
//! Regeneration renders and store writes are spawned here so the request
//! that triggered them returns without waiting. Tasks run on the tokio
//! runtime until they settle, independent of the request's lifetime.
//!
//! # Example
//!
//! ```ignore
//! use isr::offload::{OffloadConfig, OffloadManager};
//!
//! let manager = OffloadManager::new(
//!     OffloadConfig::builder()
//!         .timeout(Duration::from_secs(30))
//!         .build(),
//! );
//!
//! manager.spawn("revalidate", async {
//!     // render and write the page
//! });
//! ```

mod manager;
mod policy;

pub use manager::{OffloadHandle, OffloadKey, OffloadManager};
pub use policy::{OffloadConfig, OffloadConfigBuilder, TimeoutPolicy};
