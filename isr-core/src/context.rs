//! Cache context types for tracking how a request was answered.

use crate::{CacheKey, RoutePolicy};

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    /// Fresh page served from the store.
    Hit,
    /// No page stored; rendered by the origin.
    Miss,
    /// Stale page served while a regeneration runs in the background.
    Revalidate,
    /// Cache not involved: ISR disabled for the route, the method is not
    /// cacheable, or the origin answered with a redirect or an error.
    #[default]
    Bypass,
}

impl CacheStatus {
    /// Returns the status as a lowercase string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Revalidate => "revalidate",
            CacheStatus::Bypass => "bypass",
        }
    }

    /// Returns the value of the cache-state marker header.
    ///
    /// Bypassed responses carry no marker.
    #[inline]
    pub const fn marker(&self) -> Option<&'static str> {
        match self {
            CacheStatus::Hit => Some("HIT"),
            CacheStatus::Miss => Some("MISS"),
            CacheStatus::Revalidate => Some("REVALIDATE"),
            CacheStatus::Bypass => None,
        }
    }
}

/// Outcome of one pass through the regeneration state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheContext {
    /// How the request was answered.
    pub status: CacheStatus,
    /// Policy resolved for the request path.
    pub policy: RoutePolicy,
    /// Age of the served page in whole seconds; 0 for origin renders.
    pub age: u64,
    /// Key the request was looked up under, if it got that far.
    pub key: Option<CacheKey>,
}

impl CacheContext {
    /// Creates a context for a request under the given policy.
    pub fn new(policy: RoutePolicy) -> Self {
        CacheContext {
            policy,
            ..Default::default()
        }
    }
}
