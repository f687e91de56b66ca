use std::sync::Arc;

use isr::{Backend, IsrConfig, NotSet, OffloadManager, RouteTable};
use tower::Layer;

use crate::service::IsrService;

/// Tower layer wrapping services with [`IsrService`].
///
/// Use [`IsrLayer::builder`] to configure it. All services produced by one
/// layer share its store, configuration and offload runtime.
pub struct IsrLayer<B: ?Sized, R = RouteTable, O = OffloadManager> {
    /// Page store.
    pub backend: Arc<B>,
    /// Key, TTL, header and route settings.
    pub config: Arc<IsrConfig<R>>,
    /// Runtime for detached writes and regenerations.
    pub offload: O,
}

impl<B: ?Sized, R, O: Clone> Clone for IsrLayer<B, R, O> {
    fn clone(&self) -> Self {
        IsrLayer {
            backend: self.backend.clone(),
            config: self.config.clone(),
            offload: self.offload.clone(),
        }
    }
}

impl<B> IsrLayer<B>
where
    B: Backend,
{
    /// Creates a layer with the default configuration.
    ///
    /// The default route table has no rules and a disabled default
    /// policy, so every request passes straight through until routes are
    /// configured.
    pub fn new(backend: B) -> Self {
        IsrLayer {
            backend: Arc::new(backend),
            config: Arc::new(IsrConfig::default()),
            offload: OffloadManager::default(),
        }
    }
}

impl IsrLayer<NotSet> {
    /// Creates a new [`IsrLayerBuilder`].
    pub fn builder() -> IsrLayerBuilder<NotSet> {
        IsrLayerBuilder::default()
    }
}

impl<S, B, R, O> Layer<S> for IsrLayer<B, R, O>
where
    B: ?Sized,
    O: Clone,
{
    type Service = IsrService<S, B, R, O>;

    fn layer(&self, upstream: S) -> Self::Service {
        IsrService::new(
            upstream,
            Arc::clone(&self.backend),
            Arc::clone(&self.config),
            self.offload.clone(),
        )
    }
}

/// Builder for [`IsrLayer`].
///
/// The backend must be set before [`build`](IsrLayerBuilder::build) is
/// available.
pub struct IsrLayerBuilder<B, R = RouteTable, O = OffloadManager> {
    backend: B,
    config: IsrConfig<R>,
    offload: O,
}

impl Default for IsrLayerBuilder<NotSet> {
    fn default() -> Self {
        IsrLayerBuilder {
            backend: NotSet,
            config: IsrConfig::default(),
            offload: OffloadManager::default(),
        }
    }
}

impl<B, R, O> IsrLayerBuilder<B, R, O> {
    /// Sets the page store.
    pub fn backend<NB: Backend>(self, backend: NB) -> IsrLayerBuilder<NB, R, O> {
        IsrLayerBuilder {
            backend,
            config: self.config,
            offload: self.offload,
        }
    }

    /// Sets the configuration.
    pub fn config<NR>(self, config: IsrConfig<NR>) -> IsrLayerBuilder<B, NR, O> {
        IsrLayerBuilder {
            backend: self.backend,
            config,
            offload: self.offload,
        }
    }

    /// Sets the runtime for detached writes and regenerations.
    pub fn offload<NO>(self, offload: NO) -> IsrLayerBuilder<B, R, NO> {
        IsrLayerBuilder {
            backend: self.backend,
            config: self.config,
            offload,
        }
    }
}

impl<B, R, O> IsrLayerBuilder<B, R, O>
where
    B: Backend,
{
    /// Builds the layer.
    pub fn build(self) -> IsrLayer<B, R, O> {
        IsrLayer {
            backend: Arc::new(self.backend),
            config: Arc::new(self.config),
            offload: self.offload,
        }
    }
}
