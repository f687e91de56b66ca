use std::sync::Arc;

use async_trait::async_trait;
use isr_core::{CacheKey, CachedPage};

use crate::{BackendError, DeleteStatus};

/// Result type for store operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Key-value store holding rendered pages with their metadata.
///
/// Stores only ever see whole pages: a write replaces whatever was stored
/// under the page's key, and the last writer wins. The page's TTL
/// ([`CachedPage::ttl`]) is an expiry hint the store may honour to reclaim
/// space; it has no bearing on whether a page is fresh.
#[async_trait]
pub trait Backend: Sync + Send {
    /// Reads the page stored under `key`.
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedPage>>;

    /// Stores a page under its own key, replacing any previous page.
    async fn write(&self, page: CachedPage) -> BackendResult<()>;

    /// Removes the page stored under `key`.
    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// Returns the name of this store for logs and metrics labels.
    fn name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl<T> Backend for Arc<T>
where
    T: Backend + ?Sized,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        (**self).read(key).await
    }

    async fn write(&self, page: CachedPage) -> BackendResult<()> {
        (**self).write(page).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T> Backend for Box<T>
where
    T: Backend + ?Sized,
{
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        (**self).read(key).await
    }

    async fn write(&self, page: CachedPage) -> BackendResult<()> {
        (**self).write(page).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
