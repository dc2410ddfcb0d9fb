//! Innertube player API response types
//!
//! Data structures for deserializing `/youtubei/v1/player` responses. The
//! upstream payload is large; only the fields the extractor reads are
//! modeled, everything else is ignored.

use serde::Deserialize;

/// Top-level player response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    /// Playability verdict for the requested media
    pub playability_status: Option<PlayabilityStatus>,

    /// Stream variants, present only when playable
    pub streaming_data: Option<StreamingData>,

    /// Basic track metadata
    pub video_details: Option<VideoDetails>,
}

/// Playability verdict
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    /// Verdict string (`OK`, `LOGIN_REQUIRED`, `UNPLAYABLE`, ...)
    pub status: String,

    /// Human-readable reason when not `OK`
    pub reason: Option<String>,
}

/// Stream variant listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingData {
    /// Relative lifetime of the URLs, in seconds, as a decimal string
    pub expires_in_seconds: Option<String>,

    /// Audio-only and video-only variants
    #[serde(default)]
    pub adaptive_formats: Vec<StreamFormat>,

    /// Muxed (audio+video) variants, fallback only
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

/// One stream variant
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFormat {
    /// Format identifier
    pub itag: Option<i64>,

    /// Direct URL; absent when the variant is ciphered
    pub url: Option<String>,

    /// Full MIME type including codec parameters
    pub mime_type: Option<String>,

    /// Average bitrate in bits per second
    pub bitrate: Option<i64>,

    /// Audio quality label (`AUDIO_QUALITY_MEDIUM`, ...)
    pub audio_quality: Option<String>,
}

impl StreamFormat {
    /// Whether this variant is an audio-only stream with a usable URL.
    pub fn is_usable_audio(&self) -> bool {
        self.url.is_some()
            && self
                .mime_type
                .as_deref()
                .is_some_and(|m| m.starts_with("audio/"))
    }
}

/// Basic track metadata from the player response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    /// Track title
    pub title: Option<String>,

    /// Track length in seconds, as a decimal string
    pub length_seconds: Option<String>,
}

/// Response from a proof-of-origin token service
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoTokenResponse {
    /// The minted token
    pub po_token: Option<String>,
}
