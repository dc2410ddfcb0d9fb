//! Batch cache warming.
//!
//! Pre-resolves a set of identifiers through the standard resolve path so
//! playback requests that follow are cache hits. Individual failures are
//! absorbed; the aggregate counts are the only observable outcome.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

use crate::resolver::StreamResolver;

/// Aggregate outcome of one warm-up batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmSummary {
    /// Identifiers actually attempted (after dedup and cap).
    pub total: usize,
    /// Attempts that ended with a populated direct URL.
    pub succeeded: usize,
    /// Everything else.
    pub failed: usize,
}

impl StreamResolver {
    /// Resolve and cache every identifier in `ids`.
    ///
    /// Blank entries are dropped, duplicates are removed preserving
    /// first-occurrence order, and the batch is truncated to the
    /// configured cap before any upstream work happens.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn warm(&self, ids: &[String]) -> WarmSummary {
        let cap = self.config().warm_cap;
        let mut seen = HashSet::new();
        let mut queue = Vec::new();
        for raw in ids {
            let id = raw.trim();
            if id.is_empty() || !seen.insert(id.to_string()) {
                continue;
            }
            queue.push(id.to_string());
            if queue.len() == cap {
                break;
            }
        }

        let mut summary = WarmSummary {
            total: queue.len(),
            ..Default::default()
        };

        for id in &queue {
            match self.resolve(id).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    warn!(video_id = %id, "Warm-up resolution failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Warm-up batch finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ResolverConfig;
    use crate::error::{ResolveError, Result};
    use crate::extract::{Extraction, StreamExtractor};
    use crate::probe::LivenessProbe;
    use crate::profile::ClientProfile;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct AlwaysLive;

    #[async_trait]
    impl LivenessProbe for AlwaysLive {
        async fn probe(&self, _url: &str) -> bool {
            true
        }
    }

    /// Extractor stub that records the ids it was asked for and fails the
    /// ones in its deny list.
    struct RecordingExtractor {
        asked: Mutex<Vec<String>>,
        failing: Vec<String>,
    }

    impl RecordingExtractor {
        fn new(failing: &[&str]) -> Self {
            Self {
                asked: Mutex::new(Vec::new()),
                failing: failing.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl StreamExtractor for RecordingExtractor {
        async fn extract(&self, video_id: &str, _profile: ClientProfile) -> Result<Extraction> {
            self.asked.lock().push(video_id.to_string());
            if self.failing.iter().any(|f| f == video_id) {
                return Err(ResolveError::Extraction("denied".to_string()));
            }
            Ok(Extraction {
                direct_url: Some(format!("https://origin.example/{video_id}")),
                ..Default::default()
            })
        }
    }

    fn resolver_with(extractor: RecordingExtractor, warm_cap: usize) -> StreamResolver {
        StreamResolver::new(
            ResolverConfig {
                warm_cap,
                ..Default::default()
            },
            Arc::new(extractor),
            Arc::new(AlwaysLive),
            Arc::new(ManualClock::new(Utc::now())),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_dedup_preserves_first_occurrence_order() {
        let extractor = RecordingExtractor::new(&[]);
        let resolver = resolver_with(extractor, 50);

        let ids: Vec<String> = ["b", "a", "b", " c ", "a", ""]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let summary = resolver.warm(&ids).await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 0);
        assert!(resolver.cache().lookup("c").is_some(), "ids are trimmed");
    }

    #[tokio::test]
    async fn test_cap_limits_fan_out() {
        let extractor = RecordingExtractor::new(&[]);
        let resolver = resolver_with(extractor, 50);

        // 60 raw entries, with duplicates sprinkled in.
        let mut ids = Vec::new();
        for i in 0..55 {
            ids.push(format!("vid{i}"));
            if i % 10 == 0 {
                ids.push(format!("vid{i}"));
            }
        }
        assert!(ids.len() >= 60);

        let summary = resolver.warm(&ids).await;
        assert_eq!(summary.total, 50);
        assert_eq!(summary.succeeded, 50);
        // First-occurrence order: vid0 made the cut, vid54 did not.
        assert!(resolver.cache().lookup("vid0").is_some());
        assert!(resolver.cache().lookup("vid54").is_none());
    }

    #[tokio::test]
    async fn test_individual_failures_are_absorbed() {
        let extractor = RecordingExtractor::new(&["bad1", "bad2"]);
        let resolver = resolver_with(extractor, 50);

        let ids: Vec<String> = ["ok1", "bad1", "ok2", "bad2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let summary = resolver.warm(&ids).await;

        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 2);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let extractor = RecordingExtractor::new(&[]);
        let resolver = resolver_with(extractor, 50);

        let summary = resolver.warm(&[]).await;
        assert_eq!(summary, WarmSummary::default());
        assert!(resolver.cache().is_empty());
    }
}
