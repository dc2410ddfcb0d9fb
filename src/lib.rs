//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-service`, `core-resolve`, `core-proxy`).
//! Host applications can depend on `msc-workspace` and enable the documented
//! features without needing to wire each crate individually.

#[cfg(feature = "innertube")]
pub use core_service;
