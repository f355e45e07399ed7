//! # CacheFront Core
//!
//! Core types, errors, and traits shared by every CacheFront crate.
//!
//! - **Types**: call arguments as callers supply them and the normalized
//!   request that reaches the underlying fetch
//! - **Errors**: the single error hierarchy used across the workspace
//! - **Constants**: defaults for TTL, capacity and key formatting
//! - **Traits**: the two collaborator seams, [`CacheStore`] and [`Fetcher`]
//!
//! ## Example
//!
//! ```rust
//! use cachefront_core::{ArgValue, CallArguments};
//!
//! let args = CallArguments::new().arg(42).reload(true);
//! let (request, reload) = args.into_request();
//! assert!(reload);
//! assert_eq!(request.positional, vec![ArgValue::Int(42)]);
//! assert!(request.options.is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CacheFrontError, Result};
pub use traits::*;
pub use types::*;
