//! TTL estimation from signed-URL query parameters.
//!
//! Resolved URLs carry their own expiry in one of two known encodings:
//! an absolute epoch-seconds `expire` field or a relative seconds `expires`
//! field. A fixed safety margin is subtracted so a cached entry is treated
//! as stale strictly before the origin actually revokes the URL. Anything
//! unparseable falls back to a conservative default rather than failing
//! the caller.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Subtracted from the upstream expiry so we go stale before the origin does.
pub const SAFETY_MARGIN: Duration = Duration::from_secs(120);

/// Lower clamp for derived TTLs.
pub const MIN_TTL: Duration = Duration::from_secs(60);

/// Upper clamp for derived TTLs.
pub const MAX_TTL: Duration = Duration::from_secs(5400);

/// Used when neither expiry encoding is present or parseable.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Derive a safe expiry budget for a resolved URL.
pub fn estimate(direct_url: &str, now: DateTime<Utc>) -> Duration {
    match try_estimate(direct_url, now) {
        Some(ttl) => ttl,
        None => {
            debug!("No recognizable expiry field in resolved URL, using default TTL");
            DEFAULT_TTL
        }
    }
}

fn try_estimate(direct_url: &str, now: DateTime<Utc>) -> Option<Duration> {
    let url = Url::parse(direct_url).ok()?;

    let mut absolute: Option<i64> = None;
    let mut relative: Option<i64> = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "expire" => absolute = value.parse().ok(),
            "expires" => relative = value.parse().ok(),
            _ => {}
        }
    }

    // Absolute epoch wins when both encodings are present.
    let remaining = match (absolute, relative) {
        (Some(epoch), _) => epoch - now.timestamp(),
        (None, Some(seconds)) => seconds,
        (None, None) => return None,
    };

    Some(clamp(remaining - SAFETY_MARGIN.as_secs() as i64))
}

fn clamp(seconds: i64) -> Duration {
    let min = MIN_TTL.as_secs() as i64;
    let max = MAX_TTL.as_secs() as i64;
    Duration::from_secs(seconds.clamp(min, max) as u64)
}
