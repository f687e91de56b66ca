use std::future::Future;

use crate::{PageRequest, RenderedPage};

/// Trait for calling the origin renderer.
///
/// The origin may answer with any status. A render that fails outright
/// returns `Err`; the caller decides whether the error reaches a client
/// (cold miss) or is swallowed (background regeneration).
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use std::future::Ready;
/// use isr_core::{PageRequest, RenderedPage, Upstream};
///
/// struct StaticOrigin(&'static str);
///
/// impl Upstream for StaticOrigin {
///     type Error = Infallible;
///     type Future = Ready<Result<RenderedPage, Infallible>>;
///
///     fn call(&mut self, _req: PageRequest) -> Self::Future {
///         std::future::ready(Ok(RenderedPage::new().with_body(self.0)))
///     }
/// }
/// ```
pub trait Upstream {
    /// Error returned when a render fails outright.
    type Error;

    /// The future that resolves to the render
    type Future: Future<Output = Result<RenderedPage, Self::Error>> + Send;

    /// Render the page for the given request
    fn call(&mut self, req: PageRequest) -> Self::Future;
}
