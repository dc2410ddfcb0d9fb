//! Resolver configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`StreamResolver`](crate::resolver::StreamResolver).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum number of cached resolutions before LRU eviction.
    ///
    /// Default: 4096.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Upper bound on identifiers accepted per warm-up batch. Prevents
    /// unbounded upstream fan-out from a single request.
    ///
    /// Default: 50.
    #[serde(default = "default_warm_cap")]
    pub warm_cap: usize,

    /// Whether fresh cache hits are revalidated with a liveness probe
    /// before being served.
    ///
    /// Default: true.
    #[serde(default = "default_revalidate")]
    pub revalidate: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            warm_cap: default_warm_cap(),
            revalidate: default_revalidate(),
        }
    }
}

impl ResolverConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_capacity == 0 {
            return Err("cache_capacity must be greater than zero".to_string());
        }
        if self.warm_cap == 0 {
            return Err("warm_cap must be greater than zero".to_string());
        }
        Ok(())
    }
}

fn default_cache_capacity() -> usize {
    4096
}

fn default_warm_cap() -> usize {
    50
}

fn default_revalidate() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ResolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = ResolverConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ResolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cache_capacity, 4096);
        assert_eq!(config.warm_cap, 50);
        assert!(config.revalidate);
    }
}
