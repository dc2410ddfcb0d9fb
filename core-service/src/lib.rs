//! Service façade for the resolution and streaming stack.
//!
//! Wires the resolver (cache + client strategy + prober) and the streaming
//! proxy into the two operations a routing layer exposes: `play` and
//! `prefetch`. The façade is transport-agnostic; HTTP concerns beyond the
//! forwarded `Range` header live with the caller.

pub mod error;

pub use error::{ErrorBody, Result, ServiceError};

use std::sync::Arc;

use core_proxy::{MediaStream, ProxyConfig, StreamProxy};
use core_resolve::{
    Clock, LivenessProbe, ProbeConfig, ResolverConfig, StreamExtractor, StreamResolver,
    WarmSummary,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Combined configuration for the service and its components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Resolver settings (cache capacity, warm cap, revalidation)
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Proxy settings (timeouts, chunk bound, default content type)
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Liveness probe settings
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// One playback request.
#[derive(Debug, Clone)]
pub struct PlayRequest {
    /// Opaque media identifier
    pub video_id: String,
    /// When set, return the resolved URL for a client-side redirect
    /// instead of proxying the bytes
    pub redirect: bool,
    /// Client `Range` header, forwarded verbatim when proxying
    pub range: Option<String>,
}

impl PlayRequest {
    /// Proxied playback of `video_id` with no range.
    pub fn stream(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            redirect: false,
            range: None,
        }
    }

    /// Set the forwarded `Range` header.
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    /// Ask for a redirect outcome instead of proxied bytes.
    pub fn with_redirect(mut self) -> Self {
        self.redirect = true;
        self
    }
}

/// Outcome of a playback request.
pub enum PlayOutcome {
    /// Send the client to the resolved URL (e.g. as a 307).
    Redirect { url: String },
    /// Relay the resolved stream through the proxy.
    Stream(MediaStream),
}

impl std::fmt::Debug for PlayOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayOutcome::Redirect { url } => f.debug_struct("Redirect").field("url", url).finish(),
            PlayOutcome::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
        }
    }
}

/// Primary façade exposed to the routing layer.
pub struct StreamService {
    resolver: Arc<StreamResolver>,
    proxy: StreamProxy,
}

impl StreamService {
    /// Create a service from explicit components.
    pub fn new(resolver: Arc<StreamResolver>, proxy: StreamProxy) -> Self {
        Self { resolver, proxy }
    }

    /// Create a service from configuration plus injected strategy seams.
    pub fn with_components(
        config: ServiceConfig,
        extractor: Arc<dyn StreamExtractor>,
        prober: Arc<dyn LivenessProbe>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let resolver = Arc::new(StreamResolver::new(
            config.resolver,
            extractor,
            prober,
            clock,
        )?);
        let proxy = StreamProxy::new(config.proxy)?;
        Ok(Self::new(resolver, proxy))
    }

    /// The resolver backing this service.
    pub fn resolver(&self) -> &StreamResolver {
        &self.resolver
    }

    /// Resolve `request.video_id` and either hand back the direct URL or
    /// open a proxied stream.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::MalformedRequest`] when the identifier is blank.
    /// - [`ServiceError::Resolve`] when every resolution avenue failed.
    /// - [`ServiceError::Proxy`] when the upstream fetch failed entirely.
    #[instrument(skip(self, request), fields(video_id = %request.video_id, redirect = request.redirect))]
    pub async fn play(&self, request: PlayRequest) -> Result<PlayOutcome> {
        let video_id = request.video_id.trim();
        if video_id.is_empty() {
            return Err(ServiceError::MalformedRequest(
                "Missing media identifier".to_string(),
            ));
        }

        let entry = self.resolver.resolve(video_id).await?;

        if request.redirect {
            info!(video_id, "Handing back resolved URL for redirect");
            return Ok(PlayOutcome::Redirect {
                url: entry.direct_url,
            });
        }

        let stream = self
            .proxy
            .open(&entry.direct_url, request.range.as_deref())
            .await?;
        Ok(PlayOutcome::Stream(stream))
    }

    /// Pre-resolve a batch of identifiers so later `play` calls hit cache.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MalformedRequest`] when the batch is empty
    /// after trimming blanks; nothing upstream is touched in that case.
    /// Individual resolution failures are absorbed into the summary.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn prefetch(&self, ids: &[String]) -> Result<WarmSummary> {
        if ids.iter().all(|id| id.trim().is_empty()) {
            return Err(ServiceError::MalformedRequest(
                "No media identifiers given".to_string(),
            ));
        }

        Ok(self.resolver.warm(ids).await)
    }
}

/// Build a fully wired service against the Innertube upstream.
///
/// Uses the real HTTP prober and the system clock; the usual entry point
/// for a server binary.
#[cfg(feature = "innertube")]
pub fn build_innertube_service(
    config: ServiceConfig,
    innertube: provider_innertube::InnertubeConfig,
) -> Result<StreamService> {
    use core_resolve::{HttpProber, SystemClock};

    let extractor = Arc::new(
        provider_innertube::InnertubeExtractor::new(innertube)
            .map_err(core_resolve::ResolveError::from)?,
    );
    let prober = Arc::new(HttpProber::new(config.probe.clone())?);

    StreamService::with_components(config, extractor, prober, Arc::new(SystemClock))
}
