//! Integration tests for CompositionBackend.

mod common;

use std::time::Duration;

use chrono::Utc;
use isr_backend::{Backend, CompositionBackend, DeleteStatus};
use isr_core::{CacheKey, CachedPage, PageMeta, RoutePolicy};

use common::{FailingBackend, TestBackend};

fn page(key: &str, body: &'static str) -> CachedPage {
    CachedPage::new(
        CacheKey::new(key),
        body,
        PageMeta::new(Utc::now(), RoutePolicy::Interval(15)),
    )
    .with_ttl(Some(Duration::from_secs(3600)))
}

#[tokio::test]
async fn read_prefers_edge() {
    let edge = TestBackend::new();
    let store = TestBackend::new();
    edge.insert(page("/blog", "edge"));
    store.insert(page("/blog", "store"));

    let backend = CompositionBackend::new(edge.clone(), store.clone());
    let found = backend.read(&CacheKey::new("/blog")).await.unwrap().unwrap();

    assert_eq!(found.body().as_ref(), b"edge");
    assert_eq!(store.reads(), 0);
}

#[tokio::test]
async fn store_hit_refills_edge() {
    let edge = TestBackend::new();
    let store = TestBackend::new();
    let original = page("/blog", "store");
    let created_at = original.created_at();
    store.insert(original);

    let backend = CompositionBackend::new(edge.clone(), store.clone());
    let found = backend.read(&CacheKey::new("/blog")).await.unwrap().unwrap();

    assert_eq!(found.body().as_ref(), b"store");
    let refilled = edge.get(&CacheKey::new("/blog")).unwrap();
    assert_eq!(refilled.created_at(), created_at);
}

#[tokio::test]
async fn miss_in_both_layers() {
    let backend = CompositionBackend::new(TestBackend::new(), TestBackend::new());
    let found = backend.read(&CacheKey::new("/missing")).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn write_goes_to_both_layers() {
    let edge = TestBackend::new();
    let store = TestBackend::new();
    let backend = CompositionBackend::new(edge.clone(), store.clone());

    backend.write(page("/about", "v1")).await.unwrap();

    assert!(edge.has(&CacheKey::new("/about")));
    assert!(store.has(&CacheKey::new("/about")));
}

#[tokio::test]
async fn edge_ttl_caps_edge_copy_only() {
    let edge = TestBackend::new();
    let store = TestBackend::new();
    let backend =
        CompositionBackend::new(edge.clone(), store.clone()).edge_ttl(Duration::from_secs(60));

    backend.write(page("/about", "v1")).await.unwrap();

    let key = CacheKey::new("/about");
    assert_eq!(edge.get(&key).unwrap().ttl(), Some(Duration::from_secs(60)));
    assert_eq!(
        store.get(&key).unwrap().ttl(),
        Some(Duration::from_secs(3600))
    );
}

#[tokio::test]
async fn failing_edge_is_ignored() {
    let store = TestBackend::new();
    let backend = CompositionBackend::new(FailingBackend, store.clone());

    backend.write(page("/about", "v1")).await.unwrap();
    let found = backend.read(&CacheKey::new("/about")).await.unwrap();

    assert!(found.is_some());
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn failing_store_fails_write() {
    let edge = TestBackend::new();
    let backend = CompositionBackend::new(edge.clone(), FailingBackend);

    let result = backend.write(page("/about", "v1")).await;

    assert!(result.is_err());
    assert_eq!(edge.writes(), 0);
}

#[tokio::test]
async fn remove_clears_both_layers() {
    let edge = TestBackend::new();
    let store = TestBackend::new();
    let backend = CompositionBackend::new(edge.clone(), store.clone());
    backend.write(page("/about", "v1")).await.unwrap();

    let key = CacheKey::new("/about");
    assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Deleted(1));
    assert!(!edge.has(&key));
    assert_eq!(backend.remove(&key).await.unwrap(), DeleteStatus::Missing);
}

#[tokio::test]
async fn boxed_and_shared_stores_are_backends() {
    let store = TestBackend::new();
    let boxed: Box<dyn Backend> = Box::new(store.clone());
    let shared = std::sync::Arc::new(store.clone());

    boxed.write(page("/a", "a")).await.unwrap();
    let found = shared.read(&CacheKey::new("/a")).await.unwrap();

    assert!(found.is_some());
    assert_eq!(shared.name(), "test");
}
