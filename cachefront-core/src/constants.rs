//! Defaults and fixed strings for CacheFront.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default time-to-live for cache entries, in seconds (1 hour).
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Default capacity of the in-process store.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════════════
// KEY FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '/';

/// Option name that forces a fresh fetch. Never forwarded downstream.
pub const RELOAD_OPTION: &str = "reload";

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Env var toggling the cache (`false` or `0` disables).
pub const ENV_CACHE_ENABLED: &str = "CACHEFRONT_CACHE_ENABLED";

/// Env var holding the entry TTL in seconds.
pub const ENV_TTL_SECONDS: &str = "CACHEFRONT_TTL_SECONDS";

/// Env var enabling per-key miss coalescing.
pub const ENV_SINGLE_FLIGHT: &str = "CACHEFRONT_SINGLE_FLIGHT";

/// Env var bounding the in-process store.
pub const ENV_MAX_ENTRIES: &str = "CACHEFRONT_MAX_ENTRIES";
