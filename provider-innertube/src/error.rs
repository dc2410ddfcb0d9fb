//! Error types for the Innertube provider

use thiserror::Error;

/// Innertube provider errors
#[derive(Error, Debug)]
pub enum InnertubeError {
    /// API request returned an error
    #[error("Innertube API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The player response declared the media unplayable
    #[error("Media not playable ({status}): {reason}")]
    Unplayable { status: String, reason: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Credential file could not be read
    #[error("Failed to load credentials: {0}")]
    CredentialError(String),
}

/// Result type for Innertube operations
pub type Result<T> = std::result::Result<T, InnertubeError>;

impl From<InnertubeError> for core_resolve::ResolveError {
    fn from(error: InnertubeError) -> Self {
        core_resolve::ResolveError::Extraction(error.to_string())
    }
}
