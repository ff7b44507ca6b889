//! Configuration for the caching layer
//!
//! Supports TOML configuration files with serde defaults, so a deployment
//! can turn either cache tier off or exempt specific data sources without
//! touching query code.
//!
//! ```toml
//! segment_cache_enabled = true
//! result_cache_enabled = false
//! uncacheable_sources = ["audit_log"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_true() -> bool {
    true
}

/// Caching-layer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable segment-level caching
    #[serde(default = "default_true")]
    pub segment_cache_enabled: bool,

    /// Enable result-level caching
    #[serde(default = "default_true")]
    pub result_cache_enabled: bool,

    /// Data sources that must never be cached
    #[serde(default)]
    pub uncacheable_sources: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            segment_cache_enabled: true,
            result_cache_enabled: true,
            uncacheable_sources: Vec::new(),
        }
    }
}

impl CacheConfig {
    /// Toggle segment-level caching
    pub fn with_segment_cache(mut self, enabled: bool) -> Self {
        self.segment_cache_enabled = enabled;
        self
    }

    /// Toggle result-level caching
    pub fn with_result_cache(mut self, enabled: bool) -> Self {
        self.result_cache_enabled = enabled;
        self
    }

    /// Mark a data source as uncacheable
    pub fn with_uncacheable_source(mut self, source: &str) -> Self {
        self.uncacheable_sources.push(source.to_string());
        self
    }

    /// Whether a data source is exempt from caching
    pub fn is_source_uncacheable(&self, source: &str) -> bool {
        self.uncacheable_sources.iter().any(|s| s == source)
    }

    /// Parse a TOML configuration string
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| Error::Configuration(format!("invalid config: {e}")))
    }

    /// Load a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_both_tiers() {
        let config = CacheConfig::default();
        assert!(config.segment_cache_enabled);
        assert!(config.result_cache_enabled);
        assert!(config.uncacheable_sources.is_empty());
    }

    #[test]
    fn test_from_toml_str() {
        let config = CacheConfig::from_toml_str(
            r#"
            result_cache_enabled = false
            uncacheable_sources = ["audit_log"]
            "#,
        )
        .unwrap();

        assert!(config.segment_cache_enabled);
        assert!(!config.result_cache_enabled);
        assert!(config.is_source_uncacheable("audit_log"));
        assert!(!config.is_source_uncacheable("wikipedia"));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = CacheConfig::from_toml_str("").unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_a_configuration_error() {
        let err = CacheConfig::from_toml_str("segment_cache_enabled = 12").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_builder_modifiers() {
        let config = CacheConfig::default()
            .with_segment_cache(false)
            .with_uncacheable_source("audit_log");
        assert!(!config.segment_cache_enabled);
        assert!(config.result_cache_enabled);
        assert!(config.is_source_uncacheable("audit_log"));
    }
}
