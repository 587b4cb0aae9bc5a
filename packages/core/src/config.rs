//! Widget configuration
//!
//! Loaded from TOML, then optionally overridden from the environment:
//!
//! - `LOOKALIKE_TOP_K`: a positive integer or `all`
//! - `LOOKALIKE_MAX_UPLOAD_BYTES`
//! - `LOOKALIKE_INFERENCE_TIMEOUT_MS`: `0` disables the timeout

use crate::error::ConfigError;
use crate::ranker::RankLimit;
use crate::upload::UploadPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_TOP_K: &str = "LOOKALIKE_TOP_K";
pub const ENV_MAX_UPLOAD_BYTES: &str = "LOOKALIKE_MAX_UPLOAD_BYTES";
pub const ENV_INFERENCE_TIMEOUT_MS: &str = "LOOKALIKE_INFERENCE_TIMEOUT_MS";

/// Default inference timeout: 30 seconds
pub const DEFAULT_INFERENCE_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Upper bound on a single model call; `None` waits indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_timeout_ms: Option<u64>,
    pub limit: RankLimit,
    pub upload: UploadPolicy,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            inference_timeout_ms: Some(DEFAULT_INFERENCE_TIMEOUT_MS),
            limit: RankLimit::default(),
            upload: UploadPolicy::default(),
        }
    }
}

impl WidgetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top three results as cards with medals, JPEG/PNG only
    pub fn podium() -> Self {
        Self::default()
    }

    /// Every class as a bar, any image type
    pub fn full_breakdown() -> Self {
        Self {
            limit: RankLimit::AllClasses,
            upload: UploadPolicy::any_image(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: RankLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_inference_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inference_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn inference_timeout(&self) -> Option<Duration> {
        self.inference_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every submission fail after the model call
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == RankLimit::Top(0) {
            return Err(ConfigError::invalid_value("limit", self.limit.to_string()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Apply `LOOKALIKE_*` environment overrides
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_TOP_K) {
            self.limit = value
                .parse()
                .map_err(|_| ConfigError::invalid_value(ENV_TOP_K, &value))?;
        }

        if let Some(value) = lookup(ENV_MAX_UPLOAD_BYTES) {
            self.upload.max_bytes = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value(ENV_MAX_UPLOAD_BYTES, &value))?;
        }

        if let Some(value) = lookup(ENV_INFERENCE_TIMEOUT_MS) {
            let ms: u64 = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value(ENV_INFERENCE_TIMEOUT_MS, &value))?;
            self.inference_timeout_ms = (ms > 0).then_some(ms);
        }

        Ok(self)
    }
}
