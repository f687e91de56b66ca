//! Cached page types.
//!
//! - [`CachedPage`] - A rendered body plus the metadata written next to it
//! - [`PageMeta`] - Just the metadata, without the body
//!
//! ## Creation time vs. store TTL
//!
//! A page carries two unrelated notions of time:
//!
//! - **`created_at`** drives application-level freshness: the route policy
//!   compares it with the current time to decide FRESH or STALE
//! - **`ttl`** is a hint for the store's own garbage collection; a store may
//!   drop the page once it elapses, after which the page is simply ABSENT
//!
//! A page is never mutated after it is written. Regeneration replaces it
//! wholesale with a new page under the same key.

use std::mem::size_of;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CacheKey, Raw, RoutePolicy};

/// Metadata stored alongside a page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// When the page was written, as seconds since the Unix epoch on the wire.
    #[serde(with = "epoch_seconds")]
    pub created_at: DateTime<Utc>,
    /// Route policy in force when the page was rendered.
    pub policy: RoutePolicy,
}

impl PageMeta {
    /// Creates metadata with an explicit creation time.
    pub fn new(created_at: DateTime<Utc>, policy: RoutePolicy) -> Self {
        PageMeta { created_at, policy }
    }

    /// Creates metadata stamped with the current time.
    pub fn now(policy: RoutePolicy) -> Self {
        Self::new(Utc::now(), policy)
    }
}

/// A rendered page as persisted in a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    key: CacheKey,
    body: Raw,
    meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ttl: Option<Duration>,
}

impl CachedPage {
    /// Creates a page without a store TTL.
    pub fn new(key: CacheKey, body: impl Into<Raw>, meta: PageMeta) -> Self {
        CachedPage {
            key,
            body: body.into(),
            meta,
            ttl: None,
        }
    }

    /// Sets the store-level expiration hint.
    pub fn with_ttl(self, ttl: Option<Duration>) -> Self {
        Self { ttl, ..self }
    }

    /// Returns the key the page is stored under.
    #[inline]
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Returns the rendered body.
    #[inline]
    pub fn body(&self) -> &Raw {
        &self.body
    }

    /// Returns the page metadata.
    #[inline]
    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Returns when the page was written.
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.meta.created_at
    }

    /// Returns the store-level expiration hint.
    #[inline]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Consumes the page and returns its body.
    pub fn into_body(self) -> Raw {
        self.body
    }

    /// Returns the estimated memory usage of this page in bytes.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.key.memory_size() + self.body.len()
    }
}

/// Serde adapter writing timestamps as fractional seconds since the epoch.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.timestamp_millis() as f64 / 1000.0)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        if !seconds.is_finite() {
            return Err(D::Error::custom("timestamp is not a finite number"));
        }
        DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
            .ok_or_else(|| D::Error::custom(format!("timestamp {seconds} is out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn metadata_uses_epoch_seconds() {
        let created_at = DateTime::from_timestamp_millis(1_700_000_000_500).unwrap();
        let meta = PageMeta::new(created_at, RoutePolicy::Interval(15));

        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "created_at": 1_700_000_000.5, "policy": { "Interval": 15 } })
        );
    }

    #[test]
    fn metadata_rejects_non_numeric_timestamps() {
        let result = serde_json::from_str::<PageMeta>(r#"{"created_at":"yesterday","policy":"Permanent"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn ttl_is_independent_from_policy() {
        let page = CachedPage::new(
            CacheKey::new("/"),
            "<html></html>",
            PageMeta::now(RoutePolicy::Permanent),
        )
        .with_ttl(Some(Duration::from_secs(60)));

        assert_eq!(page.ttl(), Some(Duration::from_secs(60)));
        assert_eq!(page.meta().policy, RoutePolicy::Permanent);
    }
}
