use std::fmt::Debug;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::Response;
use isr_core::{CachedPage, PageRequest, Upstream};
use pin_project::pin_project;

/// Future that reads the store. Read errors have already been logged and
/// turned into `None`.
pub type PollCacheFuture = BoxFuture<'static, Option<CachedPage>>;

#[allow(missing_docs)]
#[pin_project(project = StateProj)]
pub enum State<U>
where
    U: Upstream,
{
    /// Initial state - policy not resolved yet
    Initial,
    /// Reading the page from the store
    PollCache {
        #[pin]
        poll_cache: PollCacheFuture,
        request: Option<PageRequest>,
    },
    /// Waiting for the origin to render
    PollUpstream {
        #[pin]
        upstream_future: U::Future,
        /// Whether a cacheable render goes to the store
        store: bool,
    },
    /// Final state with response
    Response {
        response: Option<Result<Response<Bytes>, U::Error>>,
    },
}

impl<U> Debug for State<U>
where
    U: Upstream,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Initial => f.write_str("State::Initial"),
            State::PollCache { .. } => f.write_str("State::PollCache"),
            State::PollUpstream { .. } => f.write_str("State::PollUpstream"),
            State::Response { .. } => f.write_str("State::Response"),
        }
    }
}
