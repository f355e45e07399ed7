//! Collaborator seams for the read-through layer.
//!
//! The layer consumes exactly two things: somewhere to keep values for a while
//! ([`CacheStore`]) and the real lookup it sits in front of ([`Fetcher`]).

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::FetchRequest;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Key/value store with per-entry expiration.
///
/// Implementations might use:
/// - In-process memory (the default)
/// - A networked cache shared between processes
///
/// The store owns entry lifetime. Callers only read and write; expired entries
/// must read as absent.
pub trait CacheStore<V>: Send + Sync {
    /// Returns an owned copy of the value under `key`, or `None` if absent or expired.
    fn read(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value` under `key`, replacing any previous entry, expiring after `ttl`.
    fn write(&self, key: &str, value: V, ttl: Duration) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// FETCHER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// The underlying lookup the cache sits in front of.
///
/// Receives the resource identity and the caller's arguments minus `reload`.
/// Timeouts and retries, if any, live here.
#[async_trait]
pub trait Fetcher<V>: Send + Sync {
    /// Performs the real lookup.
    async fn fetch(&self, resource: &str, request: &FetchRequest) -> Result<V>;
}

/// Adapts an async closure into a [`Fetcher`].
///
/// ```rust
/// use cachefront_core::{CacheFrontError, FetchRequest, FnFetcher};
///
/// let fetcher = FnFetcher::new(|resource: String, request: FetchRequest| async move {
///     Ok::<_, CacheFrontError>(format!("{}{}", resource, request))
/// });
/// # let _ = &fetcher;
/// ```
pub struct FnFetcher<F> {
    f: F,
}

impl<F> FnFetcher<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<V, F, Fut> Fetcher<V> for FnFetcher<F>
where
    V: Send + 'static,
    F: Fn(String, FetchRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
{
    async fn fetch(&self, resource: &str, request: &FetchRequest) -> Result<V> {
        (self.f)(resource.to_string(), request.clone()).await
    }
}
