//! In-process TTL store for CacheFront.
//!
//! Generic in-memory cache with configurable capacity and expiration. This is
//! the store a default configuration uses.

mod cache;

pub use cache::{MemoryStore, StoreConfig, StoreStats};
