//! Engine configuration
//!
//! Loaded from TOML. Every section and field has a default, so an empty
//! file (or no file) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{ExError, ExErrorKind, ExResult};
use crate::lifecycle::RestoreMode;
use crate::logging_facility::Profile;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyConfig {
    pub cache: CacheConfig,
    pub lifecycle: LifecycleConfig,
    pub logging: LoggingConfig,
}

/// Resolution cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
    /// Maximum number of cached slot resolutions
    pub max_capacity: u64,
    /// Width of the `as_of` bucket that shares one cache entry
    pub as_of_bucket_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            max_capacity: 10_000,
            as_of_bucket_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub restore_mode: RestoreMode,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub profile: Profile,
}

impl CanopyConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// `Config` if the document is malformed or a value is out of range.
    pub fn from_toml_str(contents: &str) -> ExResult<Self> {
        let config: CanopyConfig = toml::from_str(contents).map_err(|e| {
            config_error("from_toml_str", format!("failed to parse config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, `Config` if it is invalid.
    pub fn load(path: &Path) -> ExResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_message(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load a TOML file if it exists, otherwise use defaults
    ///
    /// # Errors
    /// Same as [`CanopyConfig::load`] when the file exists.
    pub fn load_or_default(path: &Path) -> ExResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `Config` for a zero bucket width, capacity or TTL while caching is on.
    pub fn validate(&self) -> ExResult<()> {
        if !self.cache.enabled {
            return Ok(());
        }
        if self.cache.as_of_bucket_secs == 0 {
            return Err(config_error("validate", "cache.as_of_bucket_secs must be > 0"));
        }
        if self.cache.max_capacity == 0 {
            return Err(config_error("validate", "cache.max_capacity must be > 0"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(config_error("validate", "cache.ttl_secs must be > 0"));
        }
        Ok(())
    }

    /// Serialize back to TOML
    ///
    /// # Errors
    /// `Serialization` if encoding fails.
    pub fn to_toml_string(&self) -> ExResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("to_toml_string")
                .with_message(e.to_string())
        })
    }
}

fn config_error(op: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op(op)
        .with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = CanopyConfig::from_toml_str("").unwrap();
        assert_eq!(config, CanopyConfig::default());
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.as_of_bucket_secs, 60);
        assert_eq!(config.lifecycle.restore_mode, RestoreMode::Draft);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = CanopyConfig::from_toml_str(
            r#"
            [cache]
            ttl_secs = 30

            [lifecycle]
            restore_mode = "publish"

            [logging]
            profile = "production"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.cache.max_capacity, 10_000);
        assert_eq!(config.lifecycle.restore_mode, RestoreMode::Publish);
        assert_eq!(config.logging.profile, Profile::Production);
    }

    #[test]
    fn test_zero_bucket_is_config_error() {
        let err = CanopyConfig::from_toml_str("[cache]\nas_of_bucket_secs = 0\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_zero_values_allowed_when_cache_disabled() {
        let config =
            CanopyConfig::from_toml_str("[cache]\nenabled = false\nmax_capacity = 0\n").unwrap();
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_unknown_restore_mode_rejected() {
        let err = CanopyConfig::from_toml_str("[lifecycle]\nrestore_mode = \"later\"\n")
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CanopyConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(CanopyConfig::from_toml_str(&text).unwrap(), config);
    }
}
