//! Page store trait for incremental static regeneration.
//!
//! If you want to plug your own key-value store in front of the regeneration
//! state machine, you are in the right place: implement [`Backend`].
//!
//! The crate also provides [`CompositionBackend`], which layers a best-effort
//! edge cache over the store of record.
mod backend;
pub mod composition;
mod error;

pub use backend::{Backend, BackendResult};
pub use composition::CompositionBackend;
pub use error::{BackendError, DeleteStatus};
