//! Moka backend implementation.

use async_trait::async_trait;
use isr_backend::{Backend, BackendResult, DeleteStatus};
use isr_core::{CacheKey, CachedPage};
use moka::future::Cache;
use smol_str::SmolStr;

use crate::metrics::record_capacity;

/// In-memory page store powered by Moka.
///
/// Entries expire after the TTL carried by each [`CachedPage`]; pages
/// without a TTL stay until evicted for capacity.
///
/// # Caveats
///
/// - Pages are **not persisted** and are lost on process restart
/// - Pages are **not shared** across processes
/// - Expiration is **best-effort**: an expired page may briefly remain
///   readable until Moka's housekeeping runs
#[derive(Clone)]
pub struct MokaBackend {
    /// The underlying Moka async cache instance.
    pub cache: Cache<CacheKey, CachedPage>,
    /// Name identifying this store in logs and metrics.
    pub name: SmolStr,
}

impl std::fmt::Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .finish()
    }
}

impl MokaBackend {
    /// Creates a new builder for `MokaBackend`.
    ///
    /// Capacity must be set with `max_entries` or `max_bytes` before `build`.
    pub fn builder() -> crate::builder::MokaBackendBuilder<crate::builder::NoCapacity> {
        crate::builder::MokaBackendBuilder::new()
    }
}

#[async_trait]
impl Backend for MokaBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, page: CachedPage) -> BackendResult<()> {
        self.cache.insert(page.key().clone(), page).await;
        record_capacity(
            &self.name,
            self.cache.entry_count(),
            self.cache.weighted_size(),
        );
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
