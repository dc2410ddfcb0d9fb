//! # Range-Aware Streaming Proxy
//!
//! Relays bytes from a resolved origin URL to the client with byte-range
//! fidelity: the client's `Range` header is forwarded verbatim, the
//! upstream status code is mirrored exactly (a 206 stays a 206), and the
//! body flows through in bounded chunks without ever being buffered whole.
//!
//! Resolved URLs are ephemeral, so every response carries a non-caching
//! directive regardless of what the origin said.

pub mod error;
pub mod proxy;

pub use error::{ProxyError, Result};
pub use proxy::{MediaStream, ProxyConfig, StreamProxy};
