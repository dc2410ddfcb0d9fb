//! Streaming proxy implementation.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{ProxyError, Result};

/// Configuration for [`StreamProxy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Maximum duration to establish the upstream connection.
    ///
    /// Default: 5 seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Maximum idle gap between body bytes. Deliberately long: this is a
    /// continuous-transfer budget, not a request budget.
    ///
    /// Default: 60 seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout: Duration,

    /// Upper bound on forwarded chunk size. A throughput/latency knob,
    /// not a correctness parameter.
    ///
    /// Default: 64 KiB.
    #[serde(default = "default_chunk_bytes")]
    pub chunk_bytes: usize,

    /// Content type assumed when the origin does not report one.
    ///
    /// Default: `audio/webm`.
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            read_timeout: default_read_timeout(),
            chunk_bytes: default_chunk_bytes(),
            default_content_type: default_content_type(),
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_chunk_bytes() -> usize {
    64 * 1024
}

fn default_content_type() -> String {
    "audio/webm".to_string()
}

/// An in-flight proxied response.
///
/// Status and headers mirror the upstream; the body is a forward-only
/// stream of bounded chunks. Dropping the stream aborts the upstream
/// connection, which is how client disconnects are propagated.
pub struct MediaStream {
    /// Upstream status code, forwarded exactly (206 stays 206).
    pub status: u16,
    /// Upstream content type, or the configured default.
    pub content_type: String,
    /// Upstream `Content-Length`, when reported.
    pub content_length: Option<u64>,
    /// Upstream `Content-Range`, when reported (implies partial content).
    pub content_range: Option<String>,
    body: BoxStream<'static, Result<Bytes>>,
}

impl MediaStream {
    /// Whether the upstream answered with partial content.
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }

    /// Response headers for the client, upstream values plus the
    /// unconditional ones: resolved URLs are ephemeral, so downstream
    /// caching is always disabled.
    pub fn response_headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Accept-Ranges", "bytes".to_string()),
            ("Cache-Control", "no-store".to_string()),
            ("Content-Type", self.content_type.clone()),
        ];
        if let Some(len) = self.content_length {
            headers.push(("Content-Length", len.to_string()));
        }
        if let Some(range) = &self.content_range {
            headers.push(("Content-Range", range.clone()));
        }
        headers
    }

    /// Consume the stream, yielding body chunks.
    pub fn into_body(self) -> BoxStream<'static, Result<Bytes>> {
        self.body
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .finish_non_exhaustive()
    }
}

/// Relays byte ranges from a resolved origin URL.
pub struct StreamProxy {
    client: reqwest::Client,
    config: ProxyConfig,
}

impl StreamProxy {
    /// Build a proxy with the given transfer budget.
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to build proxy client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Open a proxied fetch of `url`, forwarding `range` verbatim.
    ///
    /// Non-2xx upstream statuses are forwarded, not interpreted; the
    /// client decides how to react to e.g. a 403.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UpstreamFetch`] only when the fetch fails
    /// entirely before a response arrived.
    #[instrument(skip(self, url), fields(range = range.unwrap_or("-")))]
    pub async fn open(&self, url: &str, range: Option<&str>) -> Result<MediaStream> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(RANGE, range);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::UpstreamFetch(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(&self.config.default_content_type)
            .to_string();
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let content_range = headers
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        debug!(status, %content_type, ?content_range, "Opened upstream stream");

        let chunk_bytes = self.config.chunk_bytes;
        let body = response
            .bytes_stream()
            .flat_map(move |item| {
                let parts: Vec<Result<Bytes>> = match item {
                    Ok(mut bytes) => {
                        let mut parts = Vec::with_capacity(bytes.len() / chunk_bytes + 1);
                        while bytes.len() > chunk_bytes {
                            parts.push(Ok(bytes.split_to(chunk_bytes)));
                        }
                        if !bytes.is_empty() {
                            parts.push(Ok(bytes));
                        }
                        parts
                    }
                    Err(e) => vec![Err(ProxyError::StreamInterrupted(e.to_string()))],
                };
                stream::iter(parts)
            })
            .boxed();

        Ok(MediaStream {
            status,
            content_type,
            content_length,
            content_range,
            body,
        })
    }
}
