//! Error types for CacheFront.
//!
//! One hierarchy built with `thiserror`. Fetch errors are the only ones a
//! caller of the read-through layer ever sees; store errors are absorbed by the
//! orchestrator and logged.

use thiserror::Error;

/// Result type alias using `CacheFrontError`.
pub type Result<T> = std::result::Result<T, CacheFrontError>;

/// Main error type for all CacheFront operations.
#[derive(Debug, Error)]
pub enum CacheFrontError {
    // ═══════════════════════════════════════════════════════════════════════════
    // FETCH ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Could not reach the remote source.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote source answered with a failure status.
    #[error("Remote server error ({status}): {message}")]
    RemoteServer { status: u16, message: String },

    /// The remote source has no such resource.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Connection or request timed out.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Cache store read failed.
    #[error("Cache store read failed for '{key}': {reason}")]
    StoreRead { key: String, reason: String },

    /// Cache store write failed.
    #[error("Cache store write failed for '{key}': {reason}")]
    StoreWrite { key: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Invalid cache settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CacheFrontError {
    /// Returns true if this error came from the underlying fetch.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            CacheFrontError::Transport(_)
                | CacheFrontError::RemoteServer { .. }
                | CacheFrontError::NotFound(_)
                | CacheFrontError::ConnectionTimeout(_)
        )
    }

    /// Returns true if this error came from the cache store.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            CacheFrontError::StoreRead { .. } | CacheFrontError::StoreWrite { .. }
        )
    }

    /// Returns true if this error is recoverable (a caller may retry).
    ///
    /// Retrying is the fetcher's business; this layer never retries.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CacheFrontError::Transport(_) | CacheFrontError::ConnectionTimeout(_) => true,
            CacheFrontError::RemoteServer { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheFrontError::RemoteServer {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("unavailable"));

        let err = CacheFrontError::StoreWrite {
            key: "widget/42".into(),
            reason: "full".into(),
        };
        assert!(err.to_string().contains("widget/42"));
    }

    #[test]
    fn test_error_classification() {
        assert!(CacheFrontError::Transport("refused".into()).is_fetch_error());
        assert!(CacheFrontError::NotFound("widget/1".into()).is_fetch_error());
        assert!(!CacheFrontError::ConfigError("x".into()).is_fetch_error());

        let read = CacheFrontError::StoreRead {
            key: "k".into(),
            reason: "down".into(),
        };
        assert!(read.is_store_error());
        assert!(!read.is_fetch_error());
    }

    #[test]
    fn test_recoverable() {
        assert!(CacheFrontError::Transport("reset".into()).is_recoverable());
        assert!(CacheFrontError::RemoteServer {
            status: 502,
            message: "bad gateway".into()
        }
        .is_recoverable());
        assert!(!CacheFrontError::RemoteServer {
            status: 422,
            message: "unprocessable".into()
        }
        .is_recoverable());
        assert!(!CacheFrontError::NotFound("x".into()).is_recoverable());
        assert!(!CacheFrontError::ConfigError("x".into()).is_recoverable());
    }
}
