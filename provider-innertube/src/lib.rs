//! # Innertube Provider
//!
//! Implements the `StreamExtractor` trait against the Innertube player API.
//!
//! ## Overview
//!
//! This module provides:
//! - One player request per attempt, shaped by the requesting client profile
//! - Conditional credential attachment from a Netscape-format cookie file
//! - Optional proof-of-origin token fetch for profiles that request one
//! - Audio variant selection by bitrate with a muxed-format fallback

pub mod error;
pub mod extractor;
pub mod types;

pub use error::{InnertubeError, Result};
pub use extractor::{InnertubeConfig, InnertubeExtractor};
