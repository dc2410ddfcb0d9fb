//! Upstream extractor abstraction.
//!
//! The extraction service is an external collaborator: given an identifier
//! and a client profile it returns a structured result that this crate
//! treats as opaque beyond the candidate direct URL.

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::ClientProfile;

/// Structured outcome of one upstream extraction attempt.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Candidate time-limited direct URL, if the upstream produced one.
    pub direct_url: Option<String>,
    /// MIME type of the selected stream, if reported.
    pub mime_type: Option<String>,
    /// Track title, if reported.
    pub title: Option<String>,
    /// Track length in seconds, if reported.
    pub duration_seconds: Option<u64>,
}

/// Async upstream extraction seam.
///
/// Implementations issue one metadata/extraction request under the given
/// profile's parameters, including conditional credential attachment.
///
/// # Errors
///
/// Any error from a single attempt is absorbed by the resolver's strategy
/// loop; implementations should not retry across profiles themselves.
#[async_trait]
pub trait StreamExtractor: Send + Sync {
    /// Attempt to resolve `video_id` under `profile`.
    async fn extract(&self, video_id: &str, profile: ClientProfile) -> Result<Extraction>;
}
