//! In-memory resolution cache.
//!
//! Maps a media identifier to its last successful resolution. Entries are
//! only ever stored whole (a failed resolution never populates the cache),
//! replaced atomically on re-resolution, and checked for staleness lazily
//! at read time against the injected clock. There is no expiry sweep.

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::clock::Clock;
use crate::profile::ClientProfile;

/// One cached resolution outcome.
///
/// `resolved_at + ttl` is the entry's expiry horizon.
#[derive(Debug, Clone)]
pub struct StreamEntry {
    /// The identifier this entry was resolved for.
    pub video_id: String,
    /// The resolved, time-limited fetch URL. Always present by construction.
    pub direct_url: String,
    /// MIME type of the selected stream, if the upstream reported one.
    pub mime_type: Option<String>,
    /// When the resolution completed.
    pub resolved_at: DateTime<Utc>,
    /// Derived or default expiry budget.
    pub ttl: Duration,
    /// Which client profile produced the URL.
    pub profile: ClientProfile,
}

impl StreamEntry {
    /// Whether the entry is still within its expiry budget at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(self.resolved_at).to_std() {
            Ok(age) => age < self.ttl,
            // `now` before `resolved_at` can only happen with a clock that
            // moved backwards; treat as fresh.
            Err(_) => true,
        }
    }
}

/// A lookup result: the entry plus its freshness relative to the cache clock.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub entry: StreamEntry,
    pub fresh: bool,
}

/// Bounded, process-wide mapping from identifier to resolution outcome.
///
/// Reads and writes are serialized per operation; a write replaces the
/// previous entry atomically, so readers never observe a half-written
/// entry. Capacity eviction is LRU.
pub struct ResolutionCache {
    entries: Mutex<LruCache<String, StreamEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResolutionCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).expect("cache capacity must be non-zero");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            clock,
        }
    }

    /// Look up the entry for `video_id`, reporting whether it is fresh.
    ///
    /// Freshness is informational; acting on it is the caller's job.
    pub fn lookup(&self, video_id: &str) -> Option<CacheHit> {
        let mut entries = self.entries.lock();
        let entry = entries.get(video_id)?.clone();
        let fresh = entry.is_fresh(self.clock.now());
        Some(CacheHit { entry, fresh })
    }

    /// Store `entry` under its identifier, replacing any previous entry.
    pub fn store(&self, entry: StreamEntry) {
        debug!(
            video_id = %entry.video_id,
            profile = %entry.profile,
            ttl_secs = entry.ttl.as_secs(),
            "Caching resolved stream"
        );
        self.entries.lock().put(entry.video_id.clone(), entry);
    }

    /// Drop the entry for `video_id`, if any.
    pub fn remove(&self, video_id: &str) {
        self.entries.lock().pop(video_id);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The clock this cache judges freshness against.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
