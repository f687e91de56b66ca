//! Test doubles: an in-memory store with counters and a scripted origin.
#![allow(dead_code)]

pub mod spans;

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use futures::future::BoxFuture;
use isr::{
    Backend, BackendError, BackendResult, CacheKey, CachedPage, DeleteStatus, PageMeta,
    PageRequest, RenderedPage, RoutePolicy, Upstream,
};

#[derive(Debug, Default)]
pub struct BackendCounters {
    pub read_count: AtomicUsize,
    pub write_count: AtomicUsize,
}

#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    pub pages: Arc<DashMap<CacheKey, CachedPage>>,
    pub counters: Arc<BackendCounters>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a page written `age` ago, bypassing the counters.
    pub fn seed(&self, key: &str, body: &'static str, policy: RoutePolicy, age: Duration) {
        let created_at = Utc::now() - chrono::Duration::from_std(age).unwrap();
        let page = CachedPage::new(CacheKey::new(key), body, PageMeta::new(created_at, policy));
        self.pages.insert(page.key().clone(), page);
    }

    pub fn get(&self, key: &str) -> Option<CachedPage> {
        self.pages.get(&CacheKey::new(key)).map(|page| page.clone())
    }

    pub fn read_count(&self) -> usize {
        self.counters.read_count.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.counters.write_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        self.counters.read_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.get(key).map(|page| page.clone()))
    }

    async fn write(&self, page: CachedPage) -> BackendResult<()> {
        self.counters.write_count.fetch_add(1, Ordering::SeqCst);
        self.pages.insert(page.key().clone(), page);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.pages.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Store that is down.
#[derive(Clone, Debug, Default)]
pub struct FailingBackend {
    pub write_attempts: Arc<AtomicUsize>,
}

fn unavailable() -> BackendError {
    BackendError::ConnectionError(Box::new(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "store unavailable",
    )))
}

#[async_trait]
impl Backend for FailingBackend {
    async fn read(&self, _key: &CacheKey) -> BackendResult<Option<CachedPage>> {
        Err(unavailable())
    }

    async fn write(&self, _page: CachedPage) -> BackendResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        Err(unavailable())
    }

    async fn remove(&self, _key: &CacheKey) -> BackendResult<DeleteStatus> {
        Err(unavailable())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginError(pub &'static str);

/// Origin returning a scripted render and recording every request.
#[derive(Clone)]
pub struct MockUpstream {
    render: Arc<Mutex<Result<RenderedPage, OriginError>>>,
    requests: Arc<Mutex<Vec<PageRequest>>>,
    delay: Option<Duration>,
}

impl MockUpstream {
    pub fn new(render: RenderedPage) -> Self {
        MockUpstream {
            render: Arc::new(Mutex::new(Ok(render))),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn html(body: &'static str) -> Self {
        Self::new(RenderedPage::new().with_body(body))
    }

    pub fn failing(error: &'static str) -> Self {
        let upstream = Self::html("");
        upstream.fail_with(error);
        upstream
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub fn respond_with(&self, render: RenderedPage) {
        *self.render.lock().unwrap() = Ok(render);
    }

    pub fn fail_with(&self, error: &'static str) {
        *self.render.lock().unwrap() = Err(OriginError(error));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Upstream for MockUpstream {
    type Error = OriginError;
    type Future = BoxFuture<'static, Result<RenderedPage, OriginError>>;

    fn call(&mut self, req: PageRequest) -> Self::Future {
        self.requests.lock().unwrap().push(req);
        let render = self.render.lock().unwrap().clone();
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            render
        })
    }
}
