//! Upstream adapter for bridging Tower services to the state machine.
//!
//! [`TowerUpstream`] implements [`Upstream`] for a Tower service. It turns a
//! buffered [`PageRequest`] back into an `http::Request`, calls the service
//! and collects the response body into a [`RenderedPage`].
//!
//! Users typically don't interact with this module directly; it is used by
//! [`IsrService`](crate::service::IsrService).

use std::fmt::Debug;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Request, Response};
use http_body::Body as HttpBody;
use http_body_util::{BodyExt, Full};
use isr::{PageRequest, RenderedPage, Upstream};
use tower::{Service, ServiceExt};

use crate::error::{BoxError, IsrServiceError};

/// Adapter that implements [`Upstream`] for Tower services.
///
/// Every call clones the service and drives it with
/// [`oneshot`](tower::ServiceExt::oneshot), so the adapter can be moved into
/// a detached regeneration task and still respect readiness.
#[derive(Debug, Clone)]
pub struct TowerUpstream<S> {
    service: S,
}

impl<S> TowerUpstream<S> {
    /// Creates a new upstream adapter wrapping the given service.
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl<S, ResBody> Upstream for TowerUpstream<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Debug + Send,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Error = IsrServiceError<S::Error>;
    type Future = BoxFuture<'static, Result<RenderedPage, Self::Error>>;

    fn call(&mut self, req: PageRequest) -> Self::Future {
        let request = req.into_request().map(Full::new);
        let service = self.service.clone();
        Box::pin(async move {
            let response = service
                .oneshot(request)
                .await
                .map_err(IsrServiceError::Upstream)?;
            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|error| IsrServiceError::Body(error.into()))?
                .to_bytes();
            Ok(RenderedPage::from_response(Response::from_parts(parts, body)))
        })
    }
}
