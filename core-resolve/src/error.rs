//! Error types for stream resolution.

use thiserror::Error;

/// Errors that can occur while resolving a media identifier.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Every client profile was tried and none produced a usable direct URL.
    ///
    /// Per-profile failures are absorbed inside the strategy loop; this is
    /// the only resolution failure that crosses the component boundary.
    #[error("No usable stream for '{video_id}' after trying all client profiles")]
    Exhausted { video_id: String },

    /// A single extraction attempt failed (network, upstream rejection,
    /// unparseable response). Absorbed by the strategy loop, surfaced only
    /// through provider-level logs.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResolveError {
    /// Stable machine-readable tag for structured error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::Exhausted { .. } => "resolution_exhausted",
            ResolveError::Extraction(_) => "extraction_failed",
            ResolveError::Internal(_) => "internal",
        }
    }
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
