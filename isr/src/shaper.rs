//! Response shaping.
//!
//! Every response the cache took part in carries three headers:
//!
//! - `age`: seconds since the served page was rendered, `0` for a render
//!   made for this very request
//! - `cache-control`: the route's freshness window for shared caches, plus
//!   `stale-while-revalidate`
//! - the cache-state marker (`x-isr-cache` by default): `HIT`, `MISS` or
//!   `REVALIDATE`
//!
//! These headers are output only. Nothing in this crate reads them back.

use bytes::Bytes;
use http::header::{AGE, CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderName, HeaderValue, Response};
use isr_core::{CacheContext, CachedPage, RoutePolicy};

/// Shared-cache lifetime advertised for [`RoutePolicy::Permanent`] pages: one year.
pub const PERMANENT_S_MAXAGE: u64 = 31_536_000;

/// Content type of pages served from the store.
pub const CACHED_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Builds the `cache-control` value for a policy.
///
/// Returns `None` for [`RoutePolicy::Disabled`].
pub fn cache_control(policy: RoutePolicy) -> Option<HeaderValue> {
    let s_maxage = match policy {
        RoutePolicy::Interval(seconds) => seconds,
        RoutePolicy::Permanent => PERMANENT_S_MAXAGE,
        RoutePolicy::Disabled => return None,
    };
    HeaderValue::try_from(format!(
        "public, max-age=0, s-maxage={s_maxage}, stale-while-revalidate"
    ))
    .ok()
}

/// Adds or overwrites the cache headers on a response.
///
/// Bypassed responses are left untouched.
pub fn shape<B>(response: &mut Response<B>, ctx: &CacheContext, marker_header: &HeaderName) {
    let Some(marker) = ctx.status.marker() else {
        return;
    };
    let headers = response.headers_mut();
    headers.insert(AGE, HeaderValue::from(ctx.age));
    if let Some(value) = cache_control(ctx.policy) {
        headers.insert(CACHE_CONTROL, value);
    }
    headers.insert(marker_header.clone(), HeaderValue::from_static(marker));
}

/// Turns a stored page into a `200 OK` HTML response.
pub fn page_response(page: CachedPage) -> Response<Bytes> {
    let mut response = Response::new(page.into_body());
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(CACHED_CONTENT_TYPE));
    response
}
