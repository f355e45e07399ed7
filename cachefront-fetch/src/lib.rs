//! # CacheFront Fetch
//!
//! Read-through caching in front of a remote fetch.
//!
//! Callers pass the same arguments they would pass the uncached source. Per
//! call, [`ReadThrough`] decides whether the answer comes from the cache store
//! or from a fresh fetch that then populates the store.
//!
//! - [`key`]: deterministic cache keys from resource identity and arguments
//! - [`config`]: cache on/off, TTL, store selection, env loading
//! - [`events`]: read/write event logging
//! - [`ReadThrough`] and [`CachedResource`]: the entry points
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cachefront_fetch::{CacheConfig, CallArguments, ReadThrough};
//!
//! let cache = Arc::new(ReadThrough::new(fetcher, Arc::new(CacheConfig::default())));
//!
//! // Miss: fetches and stores under "widget/42"
//! let widget = cache.fetch("Widget", CallArguments::new().arg(42)).await?;
//!
//! // Hit: served from the store
//! let widget = cache.fetch("Widget", CallArguments::new().arg(42)).await?;
//!
//! // Forced refresh
//! let widget = cache.fetch("Widget", CallArguments::new().arg(42).reload(true)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod events;
pub mod key;
mod orchestrator;
mod resource;
mod single_flight;

pub use config::{CacheConfig, CacheSettings};
pub use events::{EventKind, EventLogger, NoopEventLogger, RecordingEventLogger, TracingEventLogger};
pub use key::build_key;
pub use orchestrator::ReadThrough;
pub use resource::CachedResource;
pub use single_flight::{KeyGuard, KeyLocks};

pub use cachefront_cache::MemoryStore;
pub use cachefront_core::{
    ArgValue, CacheFrontError, CacheStore, CallArguments, FetchRequest, Fetcher, FnFetcher,
    Options, Result,
};
