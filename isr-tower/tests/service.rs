use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use isr::{Backend, CacheKey, IsrConfig, OffloadManager, RoutePolicy, RouteTable};
use isr_moka::MokaBackend;
use isr_tower::{IsrLayer, IsrServiceError};
use pretty_assertions::assert_eq;
use tower::{Layer, ServiceExt, service_fn};

fn routes() -> RouteTable {
    RouteTable::builder()
        .bypass("/api/")
        .route("/", RoutePolicy::Permanent)
        .route("/blog/{slug}", RoutePolicy::Interval(60))
        .build()
        .unwrap()
}

fn request(method: Method, uri: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

async fn body(response: Response<Full<Bytes>>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn pages_are_cached_behind_the_layer() {
    let calls = Arc::new(AtomicUsize::new(0));
    let origin = {
        let calls = calls.clone();
        service_fn(move |req: Request<Full<Bytes>>| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let page = format!("<h1>{}</h1>", req.uri().path());
                Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(page))))
            }
        })
    };
    let backend = MokaBackend::builder().max_entries(100).build();
    let offload = OffloadManager::default();
    let layer = IsrLayer::builder()
        .backend(backend.clone())
        .config(IsrConfig::builder().routes(routes()).build())
        .offload(offload.clone())
        .build();
    let service = layer.layer(origin);

    let response = service
        .clone()
        .oneshot(request(Method::GET, "/blog/hello"))
        .await
        .unwrap();
    assert_eq!(response.headers()["x-isr-cache"], "MISS");
    assert_eq!(
        response.headers()[http::header::CACHE_CONTROL],
        "public, max-age=0, s-maxage=60, stale-while-revalidate"
    );
    assert_eq!(body(response).await, "<h1>/blog/hello</h1>");
    offload.wait_all().await;
    assert!(backend.read(&CacheKey::new("/blog/hello")).await.unwrap().is_some());

    let response = service
        .clone()
        .oneshot(request(Method::GET, "/blog/hello"))
        .await
        .unwrap();
    assert_eq!(response.headers()["x-isr-cache"], "HIT");
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(body(response).await, "<h1>/blog/hello</h1>");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn bypassed_paths_reach_the_origin_every_time() {
    let calls = Arc::new(AtomicUsize::new(0));
    let origin = {
        let calls = calls.clone();
        service_fn(move |_req: Request<Full<Bytes>>| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Infallible>(Response::new(Full::new(Bytes::from_static(b"{}"))))
            }
        })
    };
    let layer = IsrLayer::builder()
        .backend(MokaBackend::builder().max_entries(100).build())
        .config(IsrConfig::builder().routes(routes()).build())
        .build();
    let service = layer.layer(origin);

    for _ in 0..2 {
        let response = service
            .clone()
            .oneshot(request(Method::GET, "/api/users"))
            .await
            .unwrap();
        assert!(!response.headers().contains_key("x-isr-cache"));
        assert_eq!(body(response).await, "{}");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn request_body_is_forwarded_on_bypass() {
    let origin = service_fn(|req: Request<Full<Bytes>>| async move {
        let body = req.into_body().collect().await.unwrap().to_bytes();
        Ok::<_, Infallible>(Response::new(Full::new(body)))
    });
    let service = IsrLayer::builder()
        .backend(MokaBackend::builder().max_entries(10).build())
        .config(IsrConfig::builder().routes(routes()).build())
        .build()
        .layer(origin);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/blog/hello")
        .body(Full::new(Bytes::from_static(b"comment=hi")))
        .unwrap();
    let response = service.oneshot(req).await.unwrap();

    assert_eq!(body(response).await, "comment=hi");
}

#[tokio::test]
async fn error_renders_are_not_cached() {
    let origin = service_fn(|_req: Request<Full<Bytes>>| async {
        let mut response = Response::new(Full::new(Bytes::from_static(b"gone")));
        *response.status_mut() = StatusCode::NOT_FOUND;
        Ok::<_, Infallible>(response)
    });
    let backend = MokaBackend::builder().max_entries(10).build();
    let offload = OffloadManager::default();
    let service = IsrLayer::builder()
        .backend(backend.clone())
        .config(IsrConfig::builder().routes(routes()).build())
        .offload(offload.clone())
        .build()
        .layer(origin);

    let response = service
        .oneshot(request(Method::GET, "/blog/missing"))
        .await
        .unwrap();
    offload.wait_all().await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!response.headers().contains_key("x-isr-cache"));
    assert!(backend.read(&CacheKey::new("/blog/missing")).await.unwrap().is_none());
}

#[tokio::test]
async fn origin_errors_surface_on_miss() {
    let origin = service_fn(|_req: Request<Full<Bytes>>| async {
        Err::<Response<Full<Bytes>>, _>("origin down")
    });
    let service = IsrLayer::builder()
        .backend(MokaBackend::builder().max_entries(10).build())
        .config(IsrConfig::builder().routes(routes()).build())
        .build()
        .layer(origin);

    let error = service
        .oneshot(request(Method::GET, "/"))
        .await
        .unwrap_err();

    assert!(matches!(error, IsrServiceError::Upstream("origin down")));
}

#[tokio::test]
async fn default_layer_passes_everything_through() {
    let origin = service_fn(|_req: Request<Full<Bytes>>| async {
        Ok::<_, Infallible>(Response::new(Full::new(Bytes::from_static(b"ok"))))
    });
    let service = IsrLayer::new(MokaBackend::builder().max_entries(10).build()).layer(origin);

    let response = service.oneshot(request(Method::GET, "/")).await.unwrap();

    assert!(!response.headers().contains_key("x-isr-cache"));
    assert_eq!(body(response).await, "ok");
}
