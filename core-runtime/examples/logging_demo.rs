//! Logging system demonstration
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run --example logging_demo
//!
//! # JSON format
//! cargo run --example logging_demo -- json
//!
//! # With custom filter
//! cargo run --example logging_demo -- pretty "core_runtime=trace"
//! ```

use core_runtime::logging::{
    init_logging, strip_url_query, LogFormat, LogLevel, LoggingConfig,
};
use std::env;
use tracing::{debug, info, warn};

fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some(_) | None => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace);

    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    init_logging(config).expect("Failed to initialize logging");

    info!("Service started");
    debug!(video_id = "dQw4w9WgXcQ", profile = "android", "Resolving");

    let url = "https://cdn.example/videoplayback?expire=1700000000&sig=abcdef";
    info!(url = %strip_url_query(url), ttl_secs = 1800, "Resolved");

    warn!(video_id = "gated123", "Probe failed, forcing re-resolution");
}
