//! Resolution orchestration.
//!
//! Ties the cache, the client-profile strategy, the TTL estimator, and the
//! liveness prober together. Read path: cache lookup, resolve-if-stale,
//! best-effort revalidation. On a probe failure the resolver forces exactly
//! one fresh resolution before giving up; there is no unbounded retry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::cache::{ResolutionCache, StreamEntry};
use crate::clock::Clock;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::extract::StreamExtractor;
use crate::probe::LivenessProbe;
use crate::profile::ClientProfile;
use crate::ttl;

/// Resolves media identifiers to cached, time-limited direct URLs.
pub struct StreamResolver {
    cache: ResolutionCache,
    extractor: Arc<dyn StreamExtractor>,
    prober: Arc<dyn LivenessProbe>,
    clock: Arc<dyn Clock>,
    config: ResolverConfig,
    // Single-flight: concurrent callers for the same identifier await the
    // in-progress resolution instead of issuing redundant upstream calls.
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl StreamResolver {
    /// Create a resolver with injected strategy dependencies.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(
        config: ResolverConfig,
        extractor: Arc<dyn StreamExtractor>,
        prober: Arc<dyn LivenessProbe>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ResolveError::Internal(format!("Invalid resolver config: {e}")))?;

        Ok(Self {
            cache: ResolutionCache::new(config.cache_capacity, clock.clone()),
            extractor,
            prober,
            clock,
            config,
            inflight: Mutex::new(HashMap::new()),
        })
    }

    /// The resolution cache owned by this resolver.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// The active configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `video_id` to a fresh stream entry.
    ///
    /// A fresh cache hit is served without invoking the client strategy;
    /// when revalidation is enabled it is first confirmed live. A missing,
    /// stale, or probe-rejected entry triggers one resolution sequence
    /// (profiles tried in fixed priority order).
    #[instrument(skip(self))]
    pub async fn resolve(&self, video_id: &str) -> Result<StreamEntry> {
        if let Some(hit) = self.cache.lookup(video_id) {
            if hit.fresh {
                if !self.config.revalidate || self.prober.probe(&hit.entry.direct_url).await {
                    debug!(video_id, "Serving fresh cached resolution");
                    return Ok(hit.entry);
                }
                // TTL estimate was optimistic; the origin already revoked
                // the URL. Force exactly one re-resolution.
                warn!(video_id, "Cached URL failed liveness probe, re-resolving");
            }
        }

        self.refresh(video_id).await
    }

    /// Resolve bypassing any cached entry, under the per-key single-flight
    /// lock. Callers that waited while another refresh completed get the
    /// refreshed entry without a second upstream call.
    async fn refresh(&self, video_id: &str) -> Result<StreamEntry> {
        let prior_resolved_at = self.cache.lookup(video_id).map(|hit| hit.entry.resolved_at);

        let key_lock = {
            let mut inflight = self.inflight.lock();
            inflight.entry(video_id.to_string()).or_default().clone()
        };

        let result = {
            let _guard = key_lock.lock().await;

            match self.cache.lookup(video_id) {
                // Another caller refreshed the entry while we waited.
                Some(hit)
                    if hit.fresh && Some(hit.entry.resolved_at) != prior_resolved_at =>
                {
                    debug!(video_id, "Resolution refreshed by concurrent caller");
                    Ok(hit.entry)
                }
                _ => self.resolve_and_store(video_id).await,
            }
        };

        // Opportunistic cleanup once no other caller holds the key lock.
        {
            let mut inflight = self.inflight.lock();
            if let Some(existing) = inflight.get(video_id) {
                if Arc::strong_count(existing) <= 2 {
                    inflight.remove(video_id);
                }
            }
        }

        result
    }

    async fn resolve_and_store(&self, video_id: &str) -> Result<StreamEntry> {
        let entry = self.resolve_upstream(video_id).await?;

        // Best-effort revalidation of the fresh resolution. A URL that is
        // dead the moment it was issued is treated as exhaustion; storing
        // it would mean serving an entry known to be stale.
        if self.config.revalidate && !self.prober.probe(&entry.direct_url).await {
            warn!(video_id, "Freshly resolved URL failed liveness probe");
            return Err(ResolveError::Exhausted {
                video_id: video_id.to_string(),
            });
        }

        self.cache.store(entry.clone());
        Ok(entry)
    }

    /// Try every client profile in fixed priority order and return the
    /// first usable direct URL. Per-profile failures are absorbed; only
    /// total exhaustion is an error.
    #[instrument(skip(self))]
    async fn resolve_upstream(&self, video_id: &str) -> Result<StreamEntry> {
        for &profile in ClientProfile::in_priority_order() {
            match self.extractor.extract(video_id, profile).await {
                Ok(extraction) => {
                    let Some(url) = extraction.direct_url else {
                        debug!(%profile, "Extractor produced no direct URL");
                        continue;
                    };
                    if !has_recognized_scheme(&url) {
                        warn!(%profile, "Extractor URL has no recognized scheme, skipping");
                        continue;
                    }

                    let now = self.clock.now();
                    let ttl = ttl::estimate(&url, now);
                    info!(
                        video_id,
                        %profile,
                        ttl_secs = ttl.as_secs(),
                        "Resolved direct stream URL"
                    );
                    return Ok(StreamEntry {
                        video_id: video_id.to_string(),
                        direct_url: url,
                        mime_type: extraction.mime_type,
                        resolved_at: now,
                        ttl,
                        profile,
                    });
                }
                Err(e) => {
                    warn!(%profile, "Extraction attempt failed: {e}");
                }
            }
        }

        Err(ResolveError::Exhausted {
            video_id: video_id.to_string(),
        })
    }
}

fn has_recognized_scheme(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::extract::Extraction;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        Extractor {}

        #[async_trait]
        impl StreamExtractor for Extractor {
            async fn extract(&self, video_id: &str, profile: ClientProfile) -> Result<Extraction>;
        }
    }

    /// Probe stub that replays a fixed outcome sequence, then stays live.
    struct ScriptedProbe {
        outcomes: Mutex<Vec<bool>>,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(outcomes: Vec<bool>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicUsize::new(0),
            }
        }

        fn live() -> Self {
            Self::new(Vec::new())
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LivenessProbe for ScriptedProbe {
        async fn probe(&self, _url: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock();
            if outcomes.is_empty() {
                true
            } else {
                outcomes.remove(0)
            }
        }
    }

    fn extraction(url: &str) -> Extraction {
        Extraction {
            direct_url: Some(url.to_string()),
            mime_type: Some("audio/webm".to_string()),
            ..Default::default()
        }
    }

    fn resolver(
        extractor: MockExtractor,
        prober: ScriptedProbe,
        clock: Arc<ManualClock>,
    ) -> (StreamResolver, Arc<ScriptedProbe>) {
        let prober = Arc::new(prober);
        let resolver = StreamResolver::new(
            ResolverConfig::default(),
            Arc::new(extractor),
            prober.clone(),
            clock,
        )
        .unwrap();
        (resolver, prober)
    }

    #[tokio::test]
    async fn test_first_profile_success_short_circuits() {
        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract()
            .times(1)
            .returning(|_, profile| {
                assert_eq!(profile, ClientProfile::Android);
                Ok(extraction("https://origin.example/a"))
            });

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (resolver, _) = resolver(extractor, ScriptedProbe::live(), clock);

        let entry = resolver.resolve("vid1").await.unwrap();
        assert_eq!(entry.direct_url, "https://origin.example/a");
        assert_eq!(entry.profile, ClientProfile::Android);
    }

    #[tokio::test]
    async fn test_profile_fallback_absorbs_errors() {
        let mut extractor = MockExtractor::new();
        extractor.expect_extract().times(2).returning(|_, profile| {
            match profile {
                ClientProfile::Android => {
                    Err(ResolveError::Extraction("upstream said no".to_string()))
                }
                other => {
                    assert_eq!(other, ClientProfile::Ios);
                    Ok(extraction("https://origin.example/b"))
                }
            }
        });

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (resolver, _) = resolver(extractor, ScriptedProbe::live(), clock);

        let entry = resolver.resolve("vid1").await.unwrap();
        assert_eq!(entry.profile, ClientProfile::Ios);
    }

    #[tokio::test]
    async fn test_unrecognized_scheme_is_not_usable() {
        let mut extractor = MockExtractor::new();
        extractor.expect_extract().times(4).returning(|_, _| {
            Ok(extraction("rtmp://origin.example/legacy"))
        });

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (resolver, _) = resolver(extractor, ScriptedProbe::live(), clock);

        let err = resolver.resolve("vid1").await.unwrap_err();
        assert!(matches!(err, ResolveError::Exhausted { .. }));
    }

    #[tokio::test]
    async fn test_exhaustion_when_every_profile_fails() {
        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract()
            .times(4)
            .returning(|_, _| Err(ResolveError::Extraction("boom".to_string())));

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (resolver, prober) = resolver(extractor, ScriptedProbe::live(), clock);

        let err = resolver.resolve("vid1").await.unwrap_err();
        assert!(matches!(err, ResolveError::Exhausted { ref video_id } if video_id == "vid1"));
        // Nothing to probe, nothing cached.
        assert_eq!(prober.calls(), 0);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_strategy() {
        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract()
            .times(1)
            .returning(|_, _| Ok(extraction("https://origin.example/a")));

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (resolver, _) = resolver(extractor, ScriptedProbe::live(), clock);

        let first = resolver.resolve("vid1").await.unwrap();
        let second = resolver.resolve("vid1").await.unwrap();
        // Second call is a pure cache hit: same URL, one extraction total.
        assert_eq!(first.direct_url, second.direct_url);
        assert_eq!(first.resolved_at, second.resolved_at);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_one_resolution() {
        let mut extractor = MockExtractor::new();
        let urls = Mutex::new(vec![
            "https://origin.example/v1?expires=600",
            "https://origin.example/v2?expires=600",
        ]);
        extractor.expect_extract().times(2).returning(move |_, _| {
            Ok(extraction(urls.lock().remove(0)))
        });

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (resolver, _) = resolver(extractor, ScriptedProbe::live(), clock.clone());

        let first = resolver.resolve("vid1").await.unwrap();
        assert_eq!(first.ttl.as_secs(), 480);

        clock.advance(chrono::Duration::seconds(481));
        let second = resolver.resolve("vid1").await.unwrap();
        assert_eq!(second.direct_url, "https://origin.example/v2?expires=600");
    }

    #[tokio::test]
    async fn test_probe_failure_forces_single_reresolution() {
        let mut extractor = MockExtractor::new();
        let urls = Mutex::new(vec![
            "https://origin.example/v1",
            "https://origin.example/v2",
        ]);
        extractor.expect_extract().times(2).returning(move |_, _| {
            Ok(extraction(urls.lock().remove(0)))
        });

        let clock = Arc::new(ManualClock::new(Utc::now()));
        // First resolution probes live; the fresh cache hit then fails its
        // probe; the forced re-resolution probes live again.
        let (resolver, prober) = resolver(
            extractor,
            ScriptedProbe::new(vec![true, false, true]),
            clock,
        );

        let first = resolver.resolve("vid1").await.unwrap();
        assert_eq!(first.direct_url, "https://origin.example/v1");

        let second = resolver.resolve("vid1").await.unwrap();
        assert_eq!(second.direct_url, "https://origin.example/v2");
        assert_eq!(prober.calls(), 3);

        // The refreshed entry replaced the dead one in the cache.
        let hit = resolver.cache().lookup("vid1").unwrap();
        assert_eq!(hit.entry.direct_url, "https://origin.example/v2");
    }

    #[tokio::test]
    async fn test_probe_failure_then_dead_reresolution_exhausts() {
        let mut extractor = MockExtractor::new();
        // Initial resolve plus exactly one forced re-resolution; the
        // strategy short-circuits on the first profile both times.
        extractor
            .expect_extract()
            .times(2)
            .returning(|_, _| Ok(extraction("https://origin.example/dead")));

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (resolver, prober) = resolver(
            extractor,
            // Initial resolution live, then everything dead.
            ScriptedProbe::new(vec![true, false, false]),
            clock,
        );

        resolver.resolve("vid1").await.unwrap();

        // Fresh hit probes dead, the re-resolved URL probes dead too:
        // no further retry, exhaustion surfaces.
        let err = resolver.resolve("vid1").await.unwrap_err();
        assert!(matches!(err, ResolveError::Exhausted { .. }));
        assert_eq!(prober.calls(), 3);
    }

    #[tokio::test]
    async fn test_revalidation_can_be_disabled() {
        let mut extractor = MockExtractor::new();
        extractor
            .expect_extract()
            .times(1)
            .returning(|_, _| Ok(extraction("https://origin.example/a")));

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let prober = Arc::new(ScriptedProbe::new(vec![false, false]));
        let resolver = StreamResolver::new(
            ResolverConfig {
                revalidate: false,
                ..Default::default()
            },
            Arc::new(extractor),
            prober.clone(),
            clock,
        )
        .unwrap();

        resolver.resolve("vid1").await.unwrap();
        resolver.resolve("vid1").await.unwrap();
        assert_eq!(prober.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_is_single_flight() {
        let mut extractor = MockExtractor::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_mock = calls.clone();
        extractor.expect_extract().returning(move |_, _| {
            calls_in_mock.fetch_add(1, Ordering::SeqCst);
            Ok(extraction("https://origin.example/a"))
        });

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let prober = Arc::new(ScriptedProbe::live());
        let resolver = Arc::new(
            StreamResolver::new(
                ResolverConfig::default(),
                Arc::new(extractor),
                prober,
                clock,
            )
            .unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                resolver.resolve("vid1").await.unwrap().direct_url
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), "https://origin.example/a");
        }

        // Late arrivals share the in-flight result; racers that had already
        // missed the cache may still resolve, but never 8 times.
        assert!(calls.load(Ordering::SeqCst) < 8);
    }
}
