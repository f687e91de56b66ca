//! Freshness classification of stored pages.
//!
//! [`Freshness::classify`] is a pure function of the route policy, the page
//! read from the store (if any) and the current time:
//!
//! | Policy | Page | Result |
//! |--------|------|--------|
//! | any | absent | [`Freshness::Absent`] |
//! | `Permanent` | present | [`Freshness::Fresh`] |
//! | `Interval(n)` | age < n | [`Freshness::Fresh`] |
//! | `Interval(n)` | age ≥ n | [`Freshness::Stale`] |
//!
//! Ages are whole seconds rounded **up**, so a page written 0.4s ago is
//! one second old. Rounding up never reports a page as fresher than it is
//! when clocks are slightly skewed.

use chrono::{DateTime, Utc};

use crate::{CachedPage, RoutePolicy};

/// Freshness of a stored page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing is stored for the key.
    Absent,
    /// The page may be served without regeneration.
    Fresh,
    /// The page may be served but must be regenerated.
    Stale,
}

impl Freshness {
    /// Classifies a page under a route policy.
    ///
    /// [`RoutePolicy::Disabled`] routes bypass the cache before any lookup
    /// happens; classifying under it reports [`Freshness::Absent`] so a
    /// misrouted call can only ever lead to an origin render.
    pub fn classify(policy: RoutePolicy, page: Option<&CachedPage>, now: DateTime<Utc>) -> Self {
        let Some(page) = page else {
            return Freshness::Absent;
        };
        match policy {
            RoutePolicy::Disabled => Freshness::Absent,
            RoutePolicy::Permanent => Freshness::Fresh,
            RoutePolicy::Interval(window) => {
                if age_secs(page.created_at(), now) < window {
                    Freshness::Fresh
                } else {
                    Freshness::Stale
                }
            }
        }
    }
}

/// Age of a page in whole seconds, rounded up.
///
/// Creation times in the future (clock skew between writers) count as age 0.
pub fn age_secs(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (now - created_at).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis as u64).div_ceil(1000)
    }
}
