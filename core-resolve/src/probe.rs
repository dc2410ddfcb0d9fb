//! Liveness probing of resolved URLs.
//!
//! A signed URL can be revoked by the origin before its token looks
//! expired. The prober issues a minimal partial request to detect this
//! silent expiry; any failure maps to `false`, never an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{ResolveError, Result};

/// Byte window requested by the probe.
const PROBE_RANGE: &str = "bytes=0-1";

/// Timeouts for the probe request. Deliberately short; a probe that is
/// slow to answer is treated the same as a dead URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum duration to establish the connection.
    ///
    /// Default: 3 seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Maximum duration for the whole probe request.
    ///
    /// Default: 5 seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Liveness probe seam.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Returns `true` only when the origin still serves the URL.
    /// Must never error to the caller.
    async fn probe(&self, url: &str) -> bool;
}

/// HTTP implementation of [`LivenessProbe`].
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    /// Build a prober with the given timeout budget. Redirects are followed.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ResolveError::Internal(format!("Failed to build probe client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LivenessProbe for HttpProber {
    #[instrument(skip(self, url))]
    async fn probe(&self, url: &str) -> bool {
        let result = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, PROBE_RANGE)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                let live = status.is_success() || status == reqwest::StatusCode::PARTIAL_CONTENT;
                if !live {
                    debug!(status = status.as_u16(), "Probe rejected by origin");
                }
                live
            }
            Err(e) => {
                debug!("Probe failed: {e}");
                false
            }
        }
    }
}
