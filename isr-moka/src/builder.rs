//! Builder for configuring [`MokaBackend`].

use std::time::{Duration, Instant};

use isr_core::{CacheKey, CachedPage};
use moka::Expiry;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;
use smol_str::SmolStr;

use crate::backend::MokaBackend;

/// Expiration policy reading the TTL stored on each page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Expiration;

impl Expiry<CacheKey, CachedPage> for Expiration {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        page: &CachedPage,
        _created_at: Instant,
    ) -> Option<Duration> {
        page.ttl()
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        page: &CachedPage,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // Moka keeps the old deadline by default; a regenerated page
        // restarts the clock.
        page.ttl()
    }
}

/// Marker type: capacity has not been configured yet.
///
/// Call either [`max_entries()`](MokaBackendBuilder::max_entries) or
/// [`max_bytes()`](MokaBackendBuilder::max_bytes) before calling `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: page-count capacity has been configured.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: byte-based capacity has been configured.
///
/// The weight of a page is the size of its key plus its body and metadata.
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for creating and configuring a [`MokaBackend`].
///
/// # Examples
///
/// ```
/// use isr_moka::MokaBackend;
///
/// // 64 MB of rendered pages
/// let backend = MokaBackend::builder()
///     .name("pages")
///     .max_bytes(64 * 1024 * 1024)
///     .build();
/// ```
pub struct MokaBackendBuilder<Cap> {
    capacity: Cap,
    name: SmolStr,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaBackendBuilder<NoCapacity> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            name: SmolStr::new_static("moka"),
            eviction_policy: None,
        }
    }

    /// Sets the maximum number of pages the store can hold.
    pub fn max_entries(self, capacity: u64) -> MokaBackendBuilder<EntryCapacity> {
        MokaBackendBuilder {
            capacity: EntryCapacity(capacity),
            name: self.name,
            eviction_policy: self.eviction_policy,
        }
    }

    /// Sets the approximate memory budget in bytes.
    pub fn max_bytes(self, bytes: u64) -> MokaBackendBuilder<ByteCapacity> {
        MokaBackendBuilder {
            capacity: ByteCapacity(bytes),
            name: self.name,
            eviction_policy: self.eviction_policy,
        }
    }
}

impl Default for MokaBackendBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaBackendBuilder<Cap> {
    /// Sets the name reported in logs and metrics.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the eviction policy.
    ///
    /// # Default
    ///
    /// - [`max_entries`](MokaBackendBuilder::max_entries): [`EvictionPolicy::tiny_lfu()`]
    /// - [`max_bytes`](MokaBackendBuilder::max_bytes): [`EvictionPolicy::lru()`], since
    ///   TinyLFU admission can reject a large page even when eviction
    ///   would make room
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }
}

impl MokaBackendBuilder<EntryCapacity> {
    /// Builds the [`MokaBackend`] with page-count capacity.
    pub fn build(self) -> MokaBackend {
        let policy = self
            .eviction_policy
            .unwrap_or_else(EvictionPolicy::tiny_lfu);
        let cache: Cache<CacheKey, CachedPage> = CacheBuilder::new(self.capacity.0)
            .name(&self.name)
            .eviction_policy(policy)
            .expire_after(Expiration)
            .build();

        MokaBackend {
            cache,
            name: self.name,
        }
    }
}

impl MokaBackendBuilder<ByteCapacity> {
    /// Builds the [`MokaBackend`] with byte-based capacity.
    pub fn build(self) -> MokaBackend {
        let policy = self.eviction_policy.unwrap_or_else(EvictionPolicy::lru);
        let cache: Cache<CacheKey, CachedPage> = CacheBuilder::new(self.capacity.0)
            .name(&self.name)
            .weigher(byte_weigher)
            .eviction_policy(policy)
            .expire_after(Expiration)
            .build();

        MokaBackend {
            cache,
            name: self.name,
        }
    }
}

fn byte_weigher(key: &CacheKey, page: &CachedPage) -> u32 {
    (key.memory_size() + page.memory_size()).min(u32::MAX as usize) as u32
}
