//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the resolution service:
//! - Logging and tracing bootstrap
//! - Process-level configuration loading
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other modules depend on.
//! It establishes the logging conventions and configuration loading used
//! throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{RuntimeConfig, RuntimeMode};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
