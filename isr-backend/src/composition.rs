//! Composition backend that layers an edge cache over the store of record.
//!
//! - Edge: a fast, possibly lossy cache close to the client (e.g. Moka).
//! - Store: the durable key-value store every instance shares.
//!
//! # Read Strategy
//! 1. Check edge → Hit: return page
//! 2. Check store → Hit: refill edge, return page
//! 3. Miss: return None
//!
//! # Write Strategy
//! - The store is written first and its result is the result of the write.
//! - The edge is written afterwards; edge failures are logged and ignored.
//!
//! Pages keep their original `created_at` through the edge, so freshness
//! stays judged against the moment the page was rendered no matter which
//! layer served it.
//!
//! # Example
//! ```ignore
//! use isr_backend::CompositionBackend;
//! use isr_moka::MokaBackend;
//!
//! let edge = MokaBackend::builder().max_entries(1_000).build();
//! let backend = CompositionBackend::new(edge, kv_store)
//!     .edge_ttl(Duration::from_secs(60));
//! ```

use std::time::Duration;

use async_trait::async_trait;
use isr_core::{CacheKey, CachedPage};
use tracing::warn;

use crate::{Backend, BackendResult, DeleteStatus};

/// Two-layer store: a best-effort edge in front of the store of record.
#[derive(Debug, Clone)]
pub struct CompositionBackend<E, S> {
    edge: E,
    store: S,
    edge_ttl: Option<Duration>,
}

impl<E, S> CompositionBackend<E, S>
where
    E: Backend,
    S: Backend,
{
    /// Creates a composition of an edge cache and the store of record.
    pub fn new(edge: E, store: S) -> Self {
        CompositionBackend {
            edge,
            store,
            edge_ttl: None,
        }
    }

    /// Caps how long the edge keeps its copies.
    ///
    /// Without a cap the edge uses the page's own TTL.
    pub fn edge_ttl(mut self, ttl: Duration) -> Self {
        self.edge_ttl = Some(ttl);
        self
    }

    /// Returns the edge layer.
    pub fn edge(&self) -> &E {
        &self.edge
    }

    /// Returns the store of record.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn edge_copy(&self, page: CachedPage) -> CachedPage {
        match self.edge_ttl {
            Some(cap) => {
                let ttl = page.ttl().map_or(cap, |ttl| ttl.min(cap));
                page.with_ttl(Some(ttl))
            }
            None => page,
        }
    }
}

#[async_trait]
impl<E, S> Backend for CompositionBackend<E, S>
where
    E: Backend,
    S: Backend,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        match self.edge.read(key).await {
            Ok(Some(page)) => return Ok(Some(page)),
            Ok(None) => {}
            Err(error) => {
                warn!(backend = self.edge.name(), %key, %error, "edge read failed");
            }
        }

        let page = self.store.read(key).await?;
        if let Some(page) = &page
            && let Err(error) = self.edge.write(self.edge_copy(page.clone())).await
        {
            warn!(backend = self.edge.name(), %key, %error, "edge refill failed");
        }
        Ok(page)
    }

    async fn write(&self, page: CachedPage) -> BackendResult<()> {
        self.store.write(page.clone()).await?;
        let key = page.key().clone();
        if let Err(error) = self.edge.write(self.edge_copy(page)).await {
            warn!(backend = self.edge.name(), %key, %error, "edge write failed");
        }
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        if let Err(error) = self.edge.remove(key).await {
            warn!(backend = self.edge.name(), %key, %error, "edge remove failed");
        }
        self.store.remove(key).await
    }

    fn name(&self) -> &str {
        "composition"
    }
}
