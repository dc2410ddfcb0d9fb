//! Error types for the streaming proxy.

use thiserror::Error;

/// Errors that can occur while proxying a stream.
///
/// Upstream non-2xx statuses are NOT errors: they are forwarded verbatim
/// inside [`MediaStream`](crate::proxy::MediaStream). Only a fetch that
/// fails entirely surfaces here.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The fetch to the resolved URL failed before any response arrived
    /// (connect failure, TLS failure, timeout).
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// The body stream broke mid-transfer.
    #[error("Upstream stream interrupted: {0}")]
    StreamInterrupted(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Stable machine-readable tag for structured error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::UpstreamFetch(_) => "upstream_fetch",
            ProxyError::StreamInterrupted(_) => "stream_interrupted",
            ProxyError::Internal(_) => "internal",
        }
    }
}

/// Result type for proxy operations.
pub type Result<T> = std::result::Result<T, ProxyError>;
