//! Read-through orchestrator.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use cachefront_core::error::Result;
use cachefront_core::traits::Fetcher;
use cachefront_core::types::{CallArguments, FetchRequest};

use crate::config::{CacheConfig, ConfigSnapshot};
use crate::events::{EventKind, EventLogger, TracingEventLogger};
use crate::key::build_key;
use crate::resource::CachedResource;
use crate::single_flight::KeyLocks;

/// Read-through cache in front of a [`Fetcher`].
///
/// Each lookup:
/// 1. Splits the `reload` option off the caller's arguments
/// 2. Derives the cache key from the resource identity and what is left
/// 3. Bypasses the store when `reload` is set or caching is disabled,
///    otherwise answers from the store when it can
/// 4. On a bypass or miss, fetches, writes the result with the configured
///    TTL and returns it
///
/// Fetch errors come back unchanged and are never cached. Store failures are
/// logged and otherwise ignored: a failed read is a miss, a failed write still
/// returns the fetched value.
///
/// Without single-flight, concurrent misses on one key each fetch and the last
/// write wins.
pub struct ReadThrough<V> {
    fetcher: Arc<dyn Fetcher<V>>,
    config: Arc<CacheConfig<V>>,
    events: Arc<dyn EventLogger>,
    locks: KeyLocks,
}

impl<V> ReadThrough<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an orchestrator over `fetcher` using `config`.
    pub fn new(fetcher: Arc<dyn Fetcher<V>>, config: Arc<CacheConfig<V>>) -> Self {
        Self {
            fetcher,
            config,
            events: Arc::new(TracingEventLogger::new()),
            locks: KeyLocks::new(),
        }
    }

    /// Creates an orchestrator with the default configuration.
    pub fn with_defaults(fetcher: Arc<dyn Fetcher<V>>) -> Self {
        Self::new(fetcher, Arc::new(CacheConfig::default()))
    }

    /// Replaces the event logger.
    pub fn with_event_logger(mut self, events: Arc<dyn EventLogger>) -> Self {
        self.events = events;
        self
    }

    /// The shared configuration.
    pub fn config(&self) -> &Arc<CacheConfig<V>> {
        &self.config
    }

    /// Binds a resource identity, giving a handle with `find`.
    pub fn resource(self: &Arc<Self>, identity: impl Into<String>) -> CachedResource<V> {
        CachedResource::new(identity, Arc::clone(self))
    }

    /// Looks up `resource` with the caller's `arguments`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let widget = cache.fetch("Widget", CallArguments::new().arg(42)).await?;
    /// let fresh = cache.fetch("Widget", CallArguments::new().arg(42).reload(true)).await?;
    /// ```
    #[instrument(skip(self, arguments))]
    pub async fn fetch(&self, resource: &str, arguments: CallArguments) -> Result<V> {
        let (request, reload) = arguments.into_request();
        let config = self.config.snapshot();
        let bypass = reload || !config.cache_enabled;
        let key = build_key(resource, &request);

        if bypass {
            debug!(key = %key, reload, "Bypassing cache");
            return self.fetch_and_store(&config, &key, resource, &request).await;
        }

        if let Some(value) = self.read_cached(&config, &key, &request) {
            return Ok(value);
        }

        if config.single_flight {
            let _guard = self.locks.lock(&key).await;
            // Whoever held the lock before us may have filled the entry.
            if let Some(value) = self.read_cached(&config, &key, &request) {
                return Ok(value);
            }
            return self.fetch_and_store(&config, &key, resource, &request).await;
        }

        self.fetch_and_store(&config, &key, resource, &request).await
    }

    /// Reads `key`, treating a failed read as a miss.
    fn read_cached(
        &self,
        config: &ConfigSnapshot<V>,
        key: &str,
        request: &FetchRequest,
    ) -> Option<V> {
        match config.store.read(key) {
            Ok(Some(value)) => {
                debug!(key, "Cache hit");
                self.events
                    .log(EventKind::Read, &format!("{} for {}", key, request));
                Some(value)
            }
            Ok(None) => {
                debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, fetching instead");
                None
            }
        }
    }

    /// Fetches, then writes the value under `key`. A failed write is logged only.
    async fn fetch_and_store(
        &self,
        config: &ConfigSnapshot<V>,
        key: &str,
        resource: &str,
        request: &FetchRequest,
    ) -> Result<V> {
        let value = self.fetcher.fetch(resource, request).await?;

        match config.store.write(key, value.clone(), config.time_to_live) {
            Ok(()) => {
                self.events
                    .log(EventKind::Write, &format!("{} for {}", key, request));
            }
            Err(e) => {
                warn!(key, error = %e, "Cache write failed, returning fetched value");
            }
        }

        Ok(value)
    }
}
