//! Detached work: store writes and background regeneration.
//!
//! Both run on the detached-task runtime after the response has been
//! returned, so every failure here ends in a log line, never in an error.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use isr_backend::Backend;
use isr_core::{CacheKey, CachedPage, Cacheability, PageMeta, PageRequest, RoutePolicy, Upstream};
use tracing::{debug, warn};

use crate::metrics;

/// Writes a page, logging and dropping any store error.
///
/// Returns whether the page was stored.
pub(crate) async fn write_page<B>(backend: Arc<B>, page: CachedPage) -> bool
where
    B: Backend + ?Sized,
{
    let key = page.key().clone();
    match backend.write(page).await {
        Ok(()) => {
            debug!(%key, backend = backend.name(), "page stored");
            true
        }
        Err(error) => {
            warn!(%key, backend = backend.name(), %error, "store write failed");
            metrics::record_write_error(backend.name());
            false
        }
    }
}

/// Re-renders a stale page and replaces the stored copy.
///
/// Origin errors and non-2xx renders are swallowed: the stale copy keeps
/// being served until a later regeneration succeeds.
pub(crate) async fn regenerate<B, U>(
    backend: Arc<B>,
    mut upstream: U,
    request: PageRequest,
    key: CacheKey,
    policy: RoutePolicy,
    store_ttl: Duration,
) where
    B: Backend + ?Sized,
    U: Upstream,
    U::Error: Debug,
{
    let rendered = match upstream.call(request).await {
        Ok(rendered) => rendered,
        Err(error) => {
            warn!(%key, ?error, "regeneration render failed");
            metrics::record_regeneration(false);
            return;
        }
    };

    match rendered.cacheability() {
        Cacheability::Cacheable => {
            let page = CachedPage::new(key, rendered.body_or_empty(), PageMeta::now(policy))
                .with_ttl(Some(store_ttl));
            let stored = write_page(backend, page).await;
            metrics::record_regeneration(stored);
        }
        Cacheability::Redirect | Cacheability::Uncacheable => {
            warn!(
                %key,
                status = %rendered.effective_status(),
                "regeneration returned an uncacheable render, keeping stale page"
            );
            metrics::record_regeneration(false);
        }
    }
}
