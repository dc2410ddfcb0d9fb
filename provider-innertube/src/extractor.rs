//! Innertube player API extractor
//!
//! Implements the `StreamExtractor` trait against the Innertube
//! `/youtubei/v1/player` endpoint: one POST per attempt, shaped by the
//! requesting client profile, with conditional credential and
//! proof-of-origin token attachment.

use async_trait::async_trait;
use core_resolve::{ClientProfile, Extraction, StreamExtractor};
use reqwest::header::{COOKIE, USER_AGENT};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{InnertubeError, Result};
use crate::types::{PlayerResponse, PoTokenResponse, StreamFormat};

/// Default Innertube player endpoint
const PLAYER_ENDPOINT: &str = "https://music.youtube.com/youtubei/v1/player";

/// Innertube extractor configuration
#[derive(Debug, Clone)]
pub struct InnertubeConfig {
    /// Player endpoint URL
    pub player_endpoint: String,

    /// Netscape-format cookie file, attached only for credential-eligible
    /// profiles
    pub credentials_path: Option<PathBuf>,

    /// Proof-of-origin token service, queried only for profiles that
    /// request one
    pub po_token_endpoint: Option<String>,

    /// Maximum duration to establish a connection
    pub connect_timeout: Duration,

    /// Maximum duration for one extraction request
    pub request_timeout: Duration,
}

impl Default for InnertubeConfig {
    fn default() -> Self {
        Self {
            player_endpoint: PLAYER_ENDPOINT.to_string(),
            credentials_path: None,
            po_token_endpoint: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Innertube player API extractor
///
/// Stateless across calls apart from the shared HTTP client and the cookie
/// header loaded once at construction. Profile iteration is the resolver's
/// job; one call here is exactly one upstream attempt.
pub struct InnertubeExtractor {
    client: reqwest::Client,
    config: InnertubeConfig,
    cookie_header: Option<String>,
}

impl InnertubeExtractor {
    /// Create a new extractor, loading credentials from disk if configured.
    pub fn new(config: InnertubeConfig) -> Result<Self> {
        let cookie_header = match &config.credentials_path {
            Some(path) => Some(load_cookie_header(path)?),
            None => None,
        };

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                InnertubeError::NetworkError(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            cookie_header,
        })
    }

    /// Fetch a proof-of-origin token from the configured service.
    async fn fetch_po_token(&self, endpoint: &str, video_id: &str) -> Result<String> {
        let response = self
            .client
            .get(endpoint)
            .query(&[("video_id", video_id)])
            .send()
            .await
            .map_err(|e| InnertubeError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(InnertubeError::ApiError {
                status_code: status,
                message: "Token service request failed".to_string(),
            });
        }

        let token: PoTokenResponse = response
            .json()
            .await
            .map_err(|e| InnertubeError::ParseError(e.to_string()))?;

        token.po_token.ok_or_else(|| {
            InnertubeError::ParseError("Token service returned no token".to_string())
        })
    }

    /// Pick the best audio variant: highest-bitrate usable audio-only
    /// stream, falling back to the first muxed variant with a URL.
    fn select_audio_format(player: &PlayerResponse) -> Option<&StreamFormat> {
        let streaming = player.streaming_data.as_ref()?;

        streaming
            .adaptive_formats
            .iter()
            .filter(|f| f.is_usable_audio())
            .max_by_key(|f| f.bitrate.unwrap_or(0))
            .or_else(|| streaming.formats.iter().find(|f| f.url.is_some()))
    }

    async fn extract_inner(&self, video_id: &str, profile: ClientProfile) -> Result<Extraction> {
        let params = profile.params();

        let mut body = json!({
            "context": {
                "client": {
                    "clientName": params.client_name,
                    "clientVersion": params.client_version,
                    "hl": "en",
                }
            },
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true,
        });

        if params.request_po_token {
            if let Some(endpoint) = &self.config.po_token_endpoint {
                // A missing token degrades the attempt, it does not abort it.
                match self.fetch_po_token(endpoint, video_id).await {
                    Ok(token) => {
                        body["serviceIntegrityDimensions"] = json!({ "poToken": token });
                    }
                    Err(e) => warn!("Proof-of-origin token fetch failed: {}", e),
                }
            }
        }

        let mut request = self
            .client
            .post(&self.config.player_endpoint)
            .header(USER_AGENT, params.user_agent)
            .json(&body);

        if params.attach_credentials {
            if let Some(cookie) = &self.cookie_header {
                request = request.header(COOKIE, cookie);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| InnertubeError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(InnertubeError::ApiError {
                status_code: status,
                message,
            });
        }

        let player: PlayerResponse = response
            .json()
            .await
            .map_err(|e| InnertubeError::ParseError(e.to_string()))?;

        if let Some(playability) = &player.playability_status {
            if playability.status != "OK" {
                return Err(InnertubeError::Unplayable {
                    status: playability.status.clone(),
                    reason: playability
                        .reason
                        .clone()
                        .unwrap_or_else(|| "No reason given".to_string()),
                });
            }
        }

        let format = Self::select_audio_format(&player);
        debug!(
            found_url = format.map(|f| f.url.is_some()).unwrap_or(false),
            "Player response parsed"
        );

        Ok(Extraction {
            direct_url: format.and_then(|f| f.url.clone()),
            mime_type: format.and_then(|f| base_mime_type(f.mime_type.as_deref())),
            title: player.video_details.as_ref().and_then(|d| d.title.clone()),
            duration_seconds: player
                .video_details
                .as_ref()
                .and_then(|d| d.length_seconds.as_deref())
                .and_then(|s| s.parse().ok()),
        })
    }
}

#[async_trait]
impl StreamExtractor for InnertubeExtractor {
    #[instrument(skip(self), fields(video_id = %video_id, profile = %profile))]
    async fn extract(
        &self,
        video_id: &str,
        profile: ClientProfile,
    ) -> core_resolve::Result<Extraction> {
        Ok(self.extract_inner(video_id, profile).await?)
    }
}

/// Strip codec parameters from a full MIME type (`audio/webm; codecs=...`).
fn base_mime_type(mime: Option<&str>) -> Option<String> {
    mime.map(|m| m.split(';').next().unwrap_or(m).trim().to_string())
}

/// Load a Netscape-format cookie file into a single `Cookie` header value.
///
/// Lines starting with `#HttpOnly_` are real entries with a marker prefix;
/// all other `#` lines and blanks are comments.
fn load_cookie_header(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        InnertubeError::CredentialError(format!("{}: {e}", path.display()))
    })?;

    let mut pairs = Vec::new();
    for line in contents.lines() {
        let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() >= 7 {
            pairs.push(format!("{}={}", fields[5], fields[6]));
        }
    }

    if pairs.is_empty() {
        return Err(InnertubeError::CredentialError(format!(
            "{}: no cookies found",
            path.display()
        )));
    }

    Ok(pairs.join("; "))
}
