use std::{
    fmt::Debug,
    sync::Arc,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Full};
use isr::{Backend, CacheFuture, IsrConfig, Offload, OffloadManager, PageRequest, PolicyResolver};
use tower::Service;
use tracing::debug;

use crate::error::{BoxError, IsrServiceError};
use crate::upstream::TowerUpstream;

/// Tower service that answers requests through the regeneration state machine.
///
/// Request bodies are buffered before the state machine runs, so a stale
/// page can be regenerated by replaying the request after the caller has
/// been answered.
pub struct IsrService<S, B: ?Sized, R, O = OffloadManager> {
    upstream: S,
    backend: Arc<B>,
    config: Arc<IsrConfig<R>>,
    offload: O,
}

impl<S, B: ?Sized, R, O> IsrService<S, B, R, O> {
    /// Creates the service around an upstream.
    pub fn new(upstream: S, backend: Arc<B>, config: Arc<IsrConfig<R>>, offload: O) -> Self {
        IsrService {
            upstream,
            backend,
            config,
            offload,
        }
    }

    /// Returns the offload runtime used for background work.
    pub fn offload(&self) -> &O {
        &self.offload
    }
}

impl<S, B, R, O> Clone for IsrService<S, B, R, O>
where
    S: Clone,
    B: ?Sized,
    O: Clone,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            backend: self.backend.clone(),
            config: self.config.clone(),
            offload: self.offload.clone(),
        }
    }
}

impl<S, B, R, O, ReqBody, ResBody> Service<Request<ReqBody>> for IsrService<S, B, R, O>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Debug + Send + 'static,
    B: Backend + ?Sized + 'static,
    R: PolicyResolver + 'static,
    O: Offload + 'static,
    ReqBody: HttpBody + Send + 'static,
    ReqBody::Data: Send,
    ReqBody::Error: Into<BoxError>,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Full<Bytes>>;
    type Error = IsrServiceError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.upstream
            .poll_ready(cx)
            .map_err(IsrServiceError::Upstream)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let upstream = TowerUpstream::new(self.upstream.clone());
        let backend = self.backend.clone();
        let config = self.config.clone();
        let offload = self.offload.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|error| IsrServiceError::Body(error.into()))?
                .to_bytes();
            let request = PageRequest::from_parts(parts, body);

            let (response, ctx) =
                CacheFuture::new(backend, config, upstream, offload, request).await;
            debug!(status = ctx.status.as_str(), key = ?ctx.key, "isr service answered");
            response.map(|response| response.map(Full::new))
        })
    }
}
