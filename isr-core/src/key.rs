//! Cache key types and derivation.
//!
//! This module provides:
//!
//! - [`CacheKey`] - The stable identity of a cached page
//! - [`KeyStrategy`] - How a [`CacheKey`] is derived from an incoming request
//!
//! ## Format
//!
//! Keys are plain strings of the form:
//! `{deployment}|{host}{path}?{query}`
//!
//! - Deployment is omitted when not configured
//! - Host is omitted unless [`KeyStrategy::include_host`] is enabled
//! - Query is omitted for query-insensitive routes and for empty queries
//!
//! ```
//! use isr_core::KeyStrategy;
//!
//! let strategy = KeyStrategy::new();
//! assert_eq!(strategy.derive("/blog", None, None).as_str(), "/blog");
//!
//! let strategy = KeyStrategy::new().deployment("https://abc123.pages.dev");
//! assert_eq!(
//!     strategy.derive("/blog", Some("page=2"), None).as_str(),
//!     "https://abc123.pages.dev|/blog?page=2",
//! );
//! ```
//!
//! ## Performance
//!
//! [`CacheKey`] wraps a [`SmolStr`]: short keys (≤23 bytes) are stored inline,
//! longer ones are reference-counted, so cloning a key never copies it.

use std::fmt;
use std::mem::size_of;

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, SmolStrBuilder};

use crate::PageRequest;

/// Separator between the deployment identity and the rest of the key.
const DEPLOYMENT_SEPARATOR: char = '|';

/// A cache key identifying one cached page.
///
/// Two requests meant to share a rendered artifact map to equal keys;
/// requests for different artifacts never do.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(SmolStr);

impl CacheKey {
    /// Creates a key from its textual form.
    pub fn new(key: impl AsRef<str>) -> Self {
        CacheKey(SmolStr::new(key))
    }

    /// Returns the textual form of the key.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the estimated memory usage of this key in bytes.
    ///
    /// Inline keys only count the struct itself, heap keys add their length.
    pub fn memory_size(&self) -> usize {
        let heap = if self.0.is_heap_allocated() {
            self.0.len()
        } else {
            0
        };
        size_of::<Self>() + heap
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.as_str()).finish()
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        CacheKey::new(value)
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        CacheKey(SmolStr::from(value))
    }
}

/// Strategy for deriving a [`CacheKey`] from a request.
///
/// The default strategy keys on path (plus query for query-sensitive routes).
/// Adding a deployment identity keeps pages rendered by different deployments
/// apart when they share one store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStrategy {
    /// Deployment identity prefixed to every key.
    #[serde(default)]
    pub deployment: Option<String>,
    /// Whether the request host takes part in the key.
    #[serde(default)]
    pub include_host: bool,
}

impl KeyStrategy {
    /// Creates the default path-only strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deployment identity.
    pub fn deployment(self, deployment: impl Into<String>) -> Self {
        Self {
            deployment: Some(deployment.into()),
            ..self
        }
    }

    /// Enables or disables the host component.
    pub fn include_host(self, include_host: bool) -> Self {
        Self {
            include_host,
            ..self
        }
    }

    /// Derives a key from its raw components.
    ///
    /// `query` must only be passed for query-sensitive routes; `host` is
    /// ignored unless [`include_host`](Self::include_host) is enabled.
    pub fn derive(&self, path: &str, query: Option<&str>, host: Option<&str>) -> CacheKey {
        let mut key = SmolStrBuilder::new();
        if let Some(deployment) = self.deployment.as_deref() {
            key.push_str(deployment);
            key.push(DEPLOYMENT_SEPARATOR);
        }
        if self.include_host
            && let Some(host) = host
        {
            key.push_str(&host.to_ascii_lowercase());
        }
        key.push_str(path);
        if let Some(query) = query.filter(|query| !query.is_empty()) {
            key.push('?');
            key.push_str(query);
        }
        CacheKey(key.finish())
    }

    /// Derives the key for a request.
    pub fn derive_for(&self, request: &PageRequest, query_sensitive: bool) -> CacheKey {
        let query = if query_sensitive {
            request.query()
        } else {
            None
        };
        self.derive(request.path(), query, request.host())
    }
}
