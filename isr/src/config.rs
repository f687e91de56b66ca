//! ISR configuration.
//!
//! [`IsrConfig`] bundles everything the state machine needs besides its
//! collaborators: how keys are derived, how long the store keeps pages, the
//! name of the cache-state marker header and the route policy resolver.
//!
//! It can be built programmatically or loaded from YAML:
//!
//! ```yaml
//! key:
//!   deployment: 3f9c2e1
//! store_ttl: 30d
//! status_header: x-isr-cache
//! routes:
//!   bypass: ["/_build/"]
//!   rules:
//!     - path: /blog/{slug}
//!       policy: { Interval: 60 }
//! ```

use std::time::Duration;

use http::HeaderName;
use isr_core::{KeyStrategy, PolicyResolver};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, RouteTable};

/// Default store TTL: 30 days.
pub const DEFAULT_STORE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Shortest store TTL accepted; shorter values are raised to it.
pub const MIN_STORE_TTL: Duration = Duration::from_secs(60);

/// Default name of the cache-state marker header.
pub const DEFAULT_STATUS_HEADER: &str = "x-isr-cache";

/// Configuration of the regeneration state machine.
///
/// `R` is the route policy resolver; YAML configuration always uses a
/// [`RouteTable`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    default,
    bound(
        serialize = "R: Serialize",
        deserialize = "R: Deserialize<'de> + Default"
    )
)]
pub struct IsrConfig<R = RouteTable> {
    key: KeyStrategy,
    #[serde(with = "humantime_serde")]
    store_ttl: Duration,
    #[serde(with = "header_name")]
    status_header: HeaderName,
    routes: R,
}

impl<R: Default> Default for IsrConfig<R> {
    fn default() -> Self {
        IsrConfig {
            key: KeyStrategy::default(),
            store_ttl: DEFAULT_STORE_TTL,
            status_header: HeaderName::from_static(DEFAULT_STATUS_HEADER),
            routes: R::default(),
        }
    }
}

impl IsrConfig<NotSet> {
    /// Creates a new [`IsrConfigBuilder`].
    pub fn builder() -> IsrConfigBuilder<NotSet> {
        IsrConfigBuilder::new()
    }
}

impl IsrConfig<RouteTable> {
    /// Parses a configuration document from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_saphyr::from_str(yaml)?)
    }
}

impl<R> IsrConfig<R> {
    /// Returns the key derivation strategy.
    pub fn key(&self) -> &KeyStrategy {
        &self.key
    }

    /// Returns the TTL handed to the store with every write.
    ///
    /// Never shorter than [`MIN_STORE_TTL`].
    pub fn store_ttl(&self) -> Duration {
        self.store_ttl.max(MIN_STORE_TTL)
    }

    /// Returns the name of the cache-state marker header.
    pub fn status_header(&self) -> &HeaderName {
        &self.status_header
    }

    /// Returns the route policy resolver.
    pub fn routes(&self) -> &R {
        &self.routes
    }
}

/// Marker type for unset builder fields.
///
/// When you see `NotSet` in a compiler error, the route resolver has not
/// been configured yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotSet;

/// Builder for [`IsrConfig`].
///
/// Use [`IsrConfig::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct IsrConfigBuilder<R> {
    key: KeyStrategy,
    store_ttl: Duration,
    status_header: HeaderName,
    routes: R,
}

impl IsrConfigBuilder<NotSet> {
    /// Creates a new builder with defaults and no routes.
    pub fn new() -> Self {
        IsrConfigBuilder {
            key: KeyStrategy::default(),
            store_ttl: DEFAULT_STORE_TTL,
            status_header: HeaderName::from_static(DEFAULT_STATUS_HEADER),
            routes: NotSet,
        }
    }
}

impl Default for IsrConfigBuilder<NotSet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> IsrConfigBuilder<R> {
    /// Sets the route policy resolver.
    pub fn routes<NewR>(self, routes: NewR) -> IsrConfigBuilder<NewR> {
        IsrConfigBuilder {
            key: self.key,
            store_ttl: self.store_ttl,
            status_header: self.status_header,
            routes,
        }
    }

    /// Sets the key derivation strategy.
    pub fn key(self, key: KeyStrategy) -> Self {
        Self { key, ..self }
    }

    /// Sets the TTL handed to the store. Values under a minute are raised
    /// to [`MIN_STORE_TTL`].
    pub fn store_ttl(self, store_ttl: Duration) -> Self {
        Self {
            store_ttl: store_ttl.max(MIN_STORE_TTL),
            ..self
        }
    }

    /// Sets the name of the cache-state marker header.
    pub fn status_header(self, status_header: HeaderName) -> Self {
        Self {
            status_header,
            ..self
        }
    }
}

impl<R: PolicyResolver> IsrConfigBuilder<R> {
    /// Builds the [`IsrConfig`].
    pub fn build(self) -> IsrConfig<R> {
        IsrConfig {
            key: self.key,
            store_ttl: self.store_ttl,
            status_header: self.status_header,
            routes: self.routes,
        }
    }
}

mod header_name {
    use http::HeaderName;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &HeaderName, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_str())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HeaderName, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| D::Error::custom(crate::ConfigError::InvalidHeaderName(name)))
    }
}
