//! Finite State Machine for page regeneration.
//!
//! Coordinates one request: resolving the route policy, looking the page up,
//! classifying its freshness, serving it or calling the origin, and handing
//! store writes and regenerations to the detached-task runtime.

mod future;
mod regenerate;
mod states;

pub use future::CacheFuture;
pub use states::{PollCacheFuture, State};
