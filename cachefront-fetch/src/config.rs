//! Cache configuration.
//!
//! [`CacheSettings`] is the plain, serializable part (flags and numbers).
//! [`CacheConfig`] adds the active store and is what the orchestrator reads.
//! Settings may be changed at any time; every lookup takes one snapshot when
//! it starts and uses it to the end.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use cachefront_cache::MemoryStore;
use cachefront_core::constants::{
    DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECONDS, ENV_CACHE_ENABLED, ENV_MAX_ENTRIES,
    ENV_SINGLE_FLIGHT, ENV_TTL_SECONDS,
};
use cachefront_core::error::{CacheFrontError, Result};
use cachefront_core::traits::CacheStore;

/// Serializable cache settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Whether lookups may be answered from the store
    pub cache_enabled: bool,
    /// Entry TTL in seconds
    pub cache_time_to_live_seconds: u64,
    /// Whether concurrent misses on one key share a single fetch
    pub single_flight: bool,
    /// Capacity of the default in-process store. Rejected as `0` when read from
    /// the environment; a deserialized `0` is treated as `1`.
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_time_to_live_seconds: DEFAULT_TTL_SECONDS,
            single_flight: false,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheSettings {
    /// Reads settings from the process environment, loading `.env` first.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(v) = lookup(ENV_CACHE_ENABLED) {
            settings.cache_enabled = parse_flag(&v);
        }
        if let Some(v) = lookup(ENV_SINGLE_FLIGHT) {
            settings.single_flight = parse_flag(&v);
        }
        if let Some(v) = lookup(ENV_TTL_SECONDS) {
            settings.cache_time_to_live_seconds = parse_number(ENV_TTL_SECONDS, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_ENTRIES) {
            settings.max_entries = parse_number(ENV_MAX_ENTRIES, &v)?;
            if settings.max_entries == 0 {
                return Err(CacheFrontError::ConfigError(format!(
                    "{} must be greater than zero",
                    ENV_MAX_ENTRIES
                )));
            }
        }

        Ok(settings)
    }

    /// Entry TTL as a duration.
    pub fn time_to_live(&self) -> Duration {
        Duration::from_secs(self.cache_time_to_live_seconds)
    }
}

fn parse_flag(raw: &str) -> bool {
    let v = raw.trim();
    !(v.eq_ignore_ascii_case("false") || v == "0")
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        CacheFrontError::ConfigError(format!("{} must be a non-negative integer, got '{}'", name, raw))
    })
}

/// Values a single lookup runs with.
#[derive(Clone)]
pub(crate) struct ConfigSnapshot<V> {
    pub(crate) cache_enabled: bool,
    pub(crate) time_to_live: Duration,
    pub(crate) single_flight: bool,
    pub(crate) store: Arc<dyn CacheStore<V>>,
}

/// Runtime cache configuration: settings plus the active store.
///
/// Share it behind an `Arc` between the orchestrator and setup code. The
/// default instance (cache on, one hour TTL, in-process [`MemoryStore`]) is the
/// process-wide default.
pub struct CacheConfig<V> {
    state: RwLock<ConfigSnapshot<V>>,
    max_entries: usize,
}

impl<V> CacheConfig<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a config with default settings over the given store.
    pub fn new(store: Arc<dyn CacheStore<V>>) -> Self {
        let defaults = CacheSettings::default();
        Self {
            state: RwLock::new(ConfigSnapshot {
                cache_enabled: defaults.cache_enabled,
                time_to_live: defaults.time_to_live(),
                single_flight: defaults.single_flight,
                store,
            }),
            max_entries: defaults.max_entries,
        }
    }

    /// Creates a config from settings, backed by a fresh in-process store.
    pub fn from_settings(settings: CacheSettings) -> Self {
        let max_entries = settings.max_entries.max(1);
        let store: Arc<dyn CacheStore<V>> = Arc::new(MemoryStore::with_capacity(max_entries));
        Self {
            state: RwLock::new(ConfigSnapshot {
                cache_enabled: settings.cache_enabled,
                time_to_live: settings.time_to_live(),
                single_flight: settings.single_flight,
                store,
            }),
            max_entries,
        }
    }

    /// Creates a config from the environment (see [`CacheSettings::from_env`]).
    pub fn from_env() -> Result<Self> {
        CacheSettings::from_env().map(Self::from_settings)
    }

    /// Sets whether caching is enabled.
    pub fn with_cache_enabled(self, enabled: bool) -> Self {
        self.set_cache_enabled(enabled);
        self
    }

    /// Sets the entry TTL.
    pub fn with_ttl(self, ttl: Duration) -> Self {
        self.set_cache_time_to_live(ttl);
        self
    }

    /// Enables or disables miss coalescing.
    pub fn with_single_flight(self, enabled: bool) -> Self {
        self.set_single_flight(enabled);
        self
    }

    /// Replaces the store.
    pub fn with_store(self, store: Arc<dyn CacheStore<V>>) -> Self {
        self.set_store(store);
        self
    }

    /// Whether lookups may be answered from the store.
    pub fn cache_enabled(&self) -> bool {
        self.state.read().cache_enabled
    }

    /// TTL applied to every write.
    pub fn cache_time_to_live(&self) -> Duration {
        self.state.read().time_to_live
    }

    /// Whether concurrent misses on one key share a single fetch.
    pub fn single_flight(&self) -> bool {
        self.state.read().single_flight
    }

    /// The active store.
    pub fn store(&self) -> Arc<dyn CacheStore<V>> {
        self.state.read().store.clone()
    }

    /// Current settings in serializable form.
    ///
    /// The TTL is rounded down to whole seconds.
    pub fn settings(&self) -> CacheSettings {
        let state = self.state.read();
        CacheSettings {
            cache_enabled: state.cache_enabled,
            cache_time_to_live_seconds: state.time_to_live.as_secs(),
            single_flight: state.single_flight,
            max_entries: self.max_entries,
        }
    }

    /// Turns caching on or off. Applies from the next lookup.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.state.write().cache_enabled = enabled;
    }

    /// Changes the TTL. Applies from the next lookup.
    pub fn set_cache_time_to_live(&self, ttl: Duration) {
        self.state.write().time_to_live = ttl;
    }

    /// Turns miss coalescing on or off. Applies from the next lookup.
    pub fn set_single_flight(&self, enabled: bool) {
        self.state.write().single_flight = enabled;
    }

    /// Swaps the store. Applies from the next lookup.
    pub fn set_store(&self, store: Arc<dyn CacheStore<V>>) {
        self.state.write().store = store;
    }

    pub(crate) fn snapshot(&self) -> ConfigSnapshot<V> {
        self.state.read().clone()
    }
}

impl<V> Default for CacheConfig<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::from_settings(CacheSettings::default())
    }
}
