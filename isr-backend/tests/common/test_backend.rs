//! Simple in-memory test stores using DashMap.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use isr_backend::{Backend, BackendError, BackendResult, DeleteStatus};
use isr_core::{CacheKey, CachedPage};

/// In-memory store counting reads and writes.
///
/// Clones share the same map and counters.
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<CacheKey, CachedPage>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &CacheKey) -> bool {
        self.store.contains_key(key)
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedPage> {
        self.store.get(key).map(|page| page.clone())
    }

    pub fn insert(&self, page: CachedPage) {
        self.store.insert(page.key().clone(), page);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(key))
    }

    async fn write(&self, page: CachedPage) -> BackendResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(page);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn name(&self) -> &str {
        "test"
    }
}

/// Store whose every operation fails with a connection error.
#[derive(Clone, Default)]
pub struct FailingBackend;

fn unreachable_store() -> BackendError {
    BackendError::ConnectionError(Box::new(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "store unreachable",
    )))
}

#[async_trait]
impl Backend for FailingBackend {
    async fn read(&self, _key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        Err(unreachable_store())
    }

    async fn write(&self, _page: CachedPage) -> BackendResult<()> {
        Err(unreachable_store())
    }

    async fn remove(&self, _key: &CacheKey) -> BackendResult<DeleteStatus> {
        Err(unreachable_store())
    }

    fn name(&self) -> &str {
        "failing"
    }
}
