//! Requests sent to the origin renderer.
//!
//! A [`PageRequest`] is a fully buffered HTTP request. Buffering lets the
//! same request be replayed against the origin from a detached regeneration
//! task after the original caller has already received its response.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri, Version, header::HOST};

/// A buffered request for a page.
#[derive(Debug, Clone)]
pub struct PageRequest {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl PageRequest {
    /// Creates a request without headers or body.
    pub fn new(method: Method, uri: Uri) -> Self {
        PageRequest {
            method,
            uri,
            version: Version::default(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Creates a request from HTTP parts and a collected body.
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        PageRequest {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body,
        }
    }

    /// Replaces the method.
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the body.
    pub fn with_body(self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            ..self
        }
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the buffered body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the URI path.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request host.
    ///
    /// Absolute URIs carry it in their authority; origin-form URIs fall
    /// back to the `Host` header.
    pub fn host(&self) -> Option<&str> {
        self.uri
            .host()
            .or_else(|| self.headers.get(HOST).and_then(|value| value.to_str().ok()))
    }

    /// Converts back into an [`http::Request`].
    pub fn into_request(self) -> Request<Bytes> {
        let mut request = Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers;
        request
    }
}
