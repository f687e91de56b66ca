//! Route policy resolution.

use std::sync::Arc;

use crate::RoutePolicy;

/// Maps a request path to its [`RoutePolicy`].
///
/// Resolution is a pure lookup against route configuration: no side
/// effects, and the same path always resolves to the same policy for the
/// lifetime of the resolver.
pub trait PolicyResolver: Send + Sync {
    /// Resolves the policy for a path.
    fn resolve(&self, path: &str) -> RoutePolicy;

    /// Whether the query string takes part in the cache key for a path.
    fn query_sensitive(&self, _path: &str) -> bool {
        false
    }
}

/// A single policy applied to every path.
impl PolicyResolver for RoutePolicy {
    fn resolve(&self, _path: &str) -> RoutePolicy {
        *self
    }
}

impl<T> PolicyResolver for Arc<T>
where
    T: PolicyResolver + ?Sized,
{
    fn resolve(&self, path: &str) -> RoutePolicy {
        (**self).resolve(path)
    }

    fn query_sensitive(&self, path: &str) -> bool {
        (**self).query_sensitive(path)
    }
}
