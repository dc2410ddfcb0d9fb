//! # Stream Resolution Module
//!
//! Turns an opaque media identifier into a time-limited direct media URL and
//! keeps the result cached until it is about to expire.
//!
//! ## Overview
//!
//! This crate contains:
//! - A process-wide resolution cache with lazy, read-time staleness checks
//! - The client-profile strategy that asks the upstream extractor under
//!   several client identities and takes the first usable direct URL
//! - TTL estimation from signed-URL query parameters
//! - A liveness prober that catches URLs the origin revoked early
//! - A batch warmer that pre-populates the cache ahead of playback
//!
//! The upstream extractor itself is injected behind the [`StreamExtractor`]
//! trait; see `provider-innertube` for the concrete implementation.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod extract;
pub mod probe;
pub mod profile;
pub mod resolver;
pub mod ttl;
pub mod warm;

pub use cache::{CacheHit, ResolutionCache, StreamEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use extract::{Extraction, StreamExtractor};
pub use probe::{HttpProber, LivenessProbe, ProbeConfig};
pub use profile::{ClientProfile, ProfileParams};
pub use resolver::StreamResolver;
pub use warm::WarmSummary;
