//! Origin render results.
//!
//! - [`RenderedPage`] - What the origin renderer returned
//! - [`Cacheability`] - Whether a render may be written to the store
//!
//! ## Normalisation
//!
//! A render may leave its status or body unset. Before it is cached or
//! returned, [`RenderedPage::normalize`] fills them in:
//!
//! - a missing status becomes `206 Partial Content` when the render carries a
//!   `content-range` header, `200 OK` otherwise
//! - a missing body becomes an empty body

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode, header::CONTENT_RANGE};

/// Whether an origin render may be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cacheability {
    /// Successful render (2xx); store it.
    Cacheable,
    /// Redirect (3xx); pass it through, never store it.
    Redirect,
    /// Error render (1xx, 4xx, 5xx); pass it through, never store it.
    Uncacheable,
}

/// A page returned by the origin renderer.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RenderedPage {
    /// Creates an empty render with no status, headers or body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a render from a complete HTTP response.
    pub fn from_response(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        RenderedPage {
            status: Some(parts.status),
            headers: parts.headers,
            body: Some(body),
        }
    }

    /// Sets the status.
    pub fn with_status(self, status: StatusCode) -> Self {
        Self {
            status: Some(status),
            ..self
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the body.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            ..self
        }
    }

    /// Returns the explicit status, if one was set.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the body, if one was set.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Returns the status the response will carry once normalised.
    pub fn effective_status(&self) -> StatusCode {
        match self.status {
            Some(status) => status,
            None if self.headers.contains_key(CONTENT_RANGE) => StatusCode::PARTIAL_CONTENT,
            None => StatusCode::OK,
        }
    }

    /// Classifies the render by its effective status.
    pub fn cacheability(&self) -> Cacheability {
        let status = self.effective_status();
        if status.is_success() {
            Cacheability::Cacheable
        } else if status.is_redirection() {
            Cacheability::Redirect
        } else {
            Cacheability::Uncacheable
        }
    }

    /// Fills in a missing status and body.
    pub fn normalize(self) -> Self {
        let status = self.effective_status();
        RenderedPage {
            status: Some(status),
            headers: self.headers,
            body: Some(self.body.unwrap_or_default()),
        }
    }

    /// Returns the body, empty if none was set.
    pub fn body_or_empty(&self) -> Bytes {
        self.body.clone().unwrap_or_default()
    }

    /// Converts into an [`http::Response`], normalising on the way.
    pub fn into_response(self) -> Response<Bytes> {
        let status = self.effective_status();
        let mut response = Response::new(self.body.unwrap_or_default());
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_status_defaults_to_ok() {
        let page = RenderedPage::new().with_body("<p>hi</p>").normalize();
        assert_eq!(page.status(), Some(StatusCode::OK));
    }

    #[test]
    fn missing_status_with_range_is_partial() {
        let page = RenderedPage::new()
            .with_header(CONTENT_RANGE, HeaderValue::from_static("bytes 0-9/100"))
            .normalize();
        assert_eq!(page.status(), Some(StatusCode::PARTIAL_CONTENT));
    }

    #[test]
    fn explicit_status_wins_over_range() {
        let page = RenderedPage::new()
            .with_status(StatusCode::OK)
            .with_header(CONTENT_RANGE, HeaderValue::from_static("bytes 0-9/100"))
            .normalize();
        assert_eq!(page.status(), Some(StatusCode::OK));
    }

    #[test]
    fn missing_body_is_empty() {
        let page = RenderedPage::new().normalize();
        assert_eq!(page.body(), Some(&Bytes::new()));
    }

    #[test]
    fn classification_by_status_class() {
        let classify = |status| RenderedPage::new().with_status(status).cacheability();
        assert_eq!(classify(StatusCode::OK), Cacheability::Cacheable);
        assert_eq!(classify(StatusCode::PARTIAL_CONTENT), Cacheability::Cacheable);
        assert_eq!(classify(StatusCode::FOUND), Cacheability::Redirect);
        assert_eq!(classify(StatusCode::PERMANENT_REDIRECT), Cacheability::Redirect);
        assert_eq!(classify(StatusCode::NOT_FOUND), Cacheability::Uncacheable);
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR),
            Cacheability::Uncacheable
        );
        assert_eq!(RenderedPage::new().cacheability(), Cacheability::Cacheable);
    }
}
