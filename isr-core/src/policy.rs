//! Route freshness policy.
//!
//! [`RoutePolicy`] is resolved once per request from route configuration and
//! never changes while the request is handled. The state machine matches on
//! it exhaustively instead of probing optional configuration fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Freshness rule for a route.
///
/// In YAML configuration:
///
/// ```yaml
/// policy: Disabled
/// policy: { Interval: 60 }
/// policy: Permanent
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoutePolicy {
    /// ISR does not apply; requests go straight to the origin.
    #[default]
    Disabled,
    /// Pages are fresh for this many seconds after creation, then stale
    /// until regenerated.
    Interval(u64),
    /// Pages are generated once and stay fresh forever.
    Permanent,
}

impl RoutePolicy {
    /// Returns `true` unless the policy is [`RoutePolicy::Disabled`].
    #[inline]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, RoutePolicy::Disabled)
    }

    /// Returns the freshness window of an interval policy.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            RoutePolicy::Interval(seconds) => Some(Duration::from_secs(*seconds)),
            RoutePolicy::Disabled | RoutePolicy::Permanent => None,
        }
    }
}
