use std::{
    fmt::Debug,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{self, Poll},
};

use bytes::Bytes;
use chrono::Utc;
use futures::ready;
use http::{Method, Response};
use isr_backend::Backend;
use isr_core::{
    CacheContext, CacheStatus, Cacheability, CachedPage, Freshness, Offload, PageMeta,
    PageRequest, PolicyResolver, Upstream, age_secs,
};
use pin_project::pin_project;
use tracing::{debug, warn};

use crate::{
    IsrConfig,
    fsm::{
        regenerate::{regenerate, write_page},
        states::{State, StateProj},
    },
    metrics, shaper,
};

const POLL_AFTER_READY_ERROR: &str = "CacheFuture can't be polled after finishing";

/// Handles one request through the regeneration state machine.
///
/// Resolves to the response for the caller together with the
/// [`CacheContext`] describing how it was produced. Origin errors on the
/// synchronous path (cold miss, bypass) are returned as `Err`; everything
/// that happens after the response is ready runs on the [`Offload`]
/// runtime and never reaches the caller.
#[pin_project(project = CacheFutureProj)]
pub struct CacheFuture<B, R, U, O>
where
    B: Backend + ?Sized,
    U: Upstream,
{
    backend: Arc<B>,
    config: Arc<IsrConfig<R>>,
    upstream: Option<U>,
    offload: O,
    request: Option<PageRequest>,
    ctx: CacheContext,
    #[pin]
    state: State<U>,
}

impl<B, R, U, O> CacheFuture<B, R, U, O>
where
    B: Backend + ?Sized,
    U: Upstream,
{
    /// Creates the state machine for one request.
    pub fn new(
        backend: Arc<B>,
        config: Arc<IsrConfig<R>>,
        upstream: U,
        offload: O,
        request: PageRequest,
    ) -> Self {
        CacheFuture {
            backend,
            config,
            upstream: Some(upstream),
            offload,
            request: Some(request),
            ctx: CacheContext::default(),
            state: State::Initial,
        }
    }
}

fn participates(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

impl<B, R, U, O> Future for CacheFuture<B, R, U, O>
where
    B: Backend + ?Sized + 'static,
    R: PolicyResolver,
    U: Upstream + Send + 'static,
    U::Error: Debug + Send + 'static,
    O: Offload,
{
    type Output = (Result<Response<Bytes>, U::Error>, CacheContext);

    fn poll(self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        loop {
            let state = match this.state.as_mut().project() {
                StateProj::Initial => {
                    let request = this.request.take().expect(POLL_AFTER_READY_ERROR);
                    let routes = this.config.routes();
                    let policy = routes.resolve(request.path());
                    *this.ctx = CacheContext::new(policy);

                    if !policy.is_enabled() || !participates(request.method()) {
                        debug!(path = request.path(), method = %request.method(), ?policy, "bypassing cache");
                        State::PollUpstream {
                            upstream_future: call(this.upstream, request),
                            store: false,
                        }
                    } else {
                        let query_sensitive = routes.query_sensitive(request.path());
                        let key = this.config.key().derive_for(&request, query_sensitive);
                        debug!(%key, ?policy, "looking up page");
                        this.ctx.key = Some(key.clone());
                        let backend = this.backend.clone();
                        let poll_cache = Box::pin(async move {
                            match backend.read(&key).await {
                                Ok(page) => page,
                                Err(error) => {
                                    warn!(%key, backend = backend.name(), %error, "store read failed, treating page as absent");
                                    metrics::record_read_error(backend.name());
                                    None
                                }
                            }
                        });
                        State::PollCache {
                            poll_cache,
                            request: Some(request),
                        }
                    }
                }
                StateProj::PollCache {
                    poll_cache,
                    request,
                } => {
                    let page = ready!(poll_cache.poll(cx));
                    let request = request.take().expect(POLL_AFTER_READY_ERROR);
                    let now = Utc::now();
                    let policy = this.ctx.policy;
                    match (Freshness::classify(policy, page.as_ref(), now), page) {
                        (Freshness::Fresh, Some(page)) => {
                            this.ctx.status = CacheStatus::Hit;
                            this.ctx.age = age_secs(page.created_at(), now);
                            State::Response {
                                response: Some(Ok(shaper::page_response(page))),
                            }
                        }
                        (Freshness::Stale, Some(page)) => {
                            this.ctx.status = CacheStatus::Revalidate;
                            this.ctx.age = age_secs(page.created_at(), now);
                            spawn_regeneration(
                                this.backend,
                                this.config,
                                this.upstream,
                                this.offload,
                                this.ctx,
                                request,
                                &page,
                            );
                            State::Response {
                                response: Some(Ok(shaper::page_response(page))),
                            }
                        }
                        _ => {
                            this.ctx.status = CacheStatus::Miss;
                            let store = request.method() == Method::GET;
                            State::PollUpstream {
                                upstream_future: call(this.upstream, request),
                                store,
                            }
                        }
                    }
                }
                StateProj::PollUpstream {
                    upstream_future,
                    store,
                } => {
                    let result = ready!(upstream_future.poll(cx));
                    let store = *store;
                    let response = match (this.ctx.status, result) {
                        (CacheStatus::Miss, Ok(rendered)) => match rendered.cacheability() {
                            Cacheability::Cacheable => {
                                let rendered = rendered.normalize();
                                if store && let Some(key) = this.ctx.key.clone() {
                                    let page = CachedPage::new(
                                        key.clone(),
                                        rendered.body_or_empty(),
                                        PageMeta::now(this.ctx.policy),
                                    )
                                    .with_ttl(Some(this.config.store_ttl()));
                                    let backend = this.backend.clone();
                                    this.offload.spawn_for("write", &key, async move {
                                        write_page(backend, page).await;
                                    });
                                }
                                Ok(rendered.into_response())
                            }
                            cacheability => {
                                debug!(
                                    status = %rendered.effective_status(),
                                    ?cacheability,
                                    "origin render not cacheable, passing through"
                                );
                                this.ctx.status = CacheStatus::Bypass;
                                Ok(rendered.into_response())
                            }
                        },
                        (CacheStatus::Miss, Err(error)) => {
                            warn!(key = ?this.ctx.key, ?error, "origin render failed on miss");
                            Err(error)
                        }
                        (_, result) => result.map(|rendered| rendered.into_response()),
                    };
                    State::Response {
                        response: Some(response),
                    }
                }
                StateProj::Response { response } => {
                    let mut response = response.take().expect(POLL_AFTER_READY_ERROR);
                    if let Ok(response) = response.as_mut() {
                        shaper::shape(response, this.ctx, this.config.status_header());
                    }
                    metrics::record_status(this.ctx.status);
                    debug!(status = this.ctx.status.as_str(), age = this.ctx.age, "request answered");
                    return Poll::Ready((response, this.ctx.clone()));
                }
            };
            debug!("{:?}", &state);
            this.state.set(state);
        }
    }
}

fn call<U: Upstream>(upstream: &mut Option<U>, request: PageRequest) -> U::Future {
    upstream.as_mut().expect(POLL_AFTER_READY_ERROR).call(request)
}

fn spawn_regeneration<B, R, U, O>(
    backend: &Arc<B>,
    config: &Arc<IsrConfig<R>>,
    upstream: &mut Option<U>,
    offload: &O,
    ctx: &CacheContext,
    request: PageRequest,
    page: &CachedPage,
) where
    B: Backend + ?Sized + 'static,
    U: Upstream + Send + 'static,
    U::Error: Debug + Send + 'static,
    O: Offload,
{
    let Some(upstream) = upstream.take() else {
        return;
    };
    let key = page.key().clone();
    // A HEAD render has no body worth storing.
    let request = if request.method() == Method::HEAD {
        request.with_method(Method::GET)
    } else {
        request
    };
    debug!(%key, age = ctx.age, "page stale, regenerating in background");
    offload.spawn_for(
        "revalidate",
        &key.clone(),
        regenerate(
            backend.clone(),
            upstream,
            request,
            key,
            ctx.policy,
            config.store_ttl(),
        ),
    );
}
