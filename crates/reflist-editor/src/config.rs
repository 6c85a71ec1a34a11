//! Editor configuration
//!
//! Arrives from the host as the extension's instance parameters (JSON).

use reflist_metadata::{MetadataCache, MetadataFetcher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// What happens to a list that fails validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Write it anyway and flag the record invalid
    #[default]
    PersistAndFlag,
    /// Flag the record invalid and keep the last written value
    RefuseInvalid,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Service URL is not an http(s) URL
    #[error("service url must start with http:// or https://, got '{0}'")]
    InvalidServiceUrl(String),

    /// Notification channel needs room for at least one value
    #[error("canonical buffer must be at least 1")]
    ZeroBuffer,

    /// Instance parameters are not valid JSON for this shape
    #[error("invalid parameters: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL of referenced item pages; the id is appended
    #[serde(alias = "service")]
    pub service_url: String,
    /// Policy for invalid lists
    pub validation_policy: ValidationPolicy,
    /// Upper bound on one metadata lookup, in milliseconds
    pub fetch_timeout_ms: Option<u64>,
    /// Capacity of the canonical-change channel
    pub canonical_buffer: usize,
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and check instance parameters
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed JSON or out-of-range values
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.check()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError`] for an unusable service URL or buffer size
    pub fn check(&self) -> Result<(), ConfigError> {
        if !self.service_url.is_empty()
            && !(self.service_url.starts_with("http://") || self.service_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidServiceUrl(self.service_url.clone()));
        }
        if self.canonical_buffer == 0 {
            return Err(ConfigError::ZeroBuffer);
        }
        Ok(())
    }

    /// With service URL
    #[inline]
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    /// With validation policy
    #[inline]
    #[must_use]
    pub fn with_validation_policy(mut self, policy: ValidationPolicy) -> Self {
        self.validation_policy = policy;
        self
    }

    /// With metadata lookup timeout
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// With canonical-change channel capacity
    #[inline]
    #[must_use]
    pub fn with_canonical_buffer(mut self, buffer: usize) -> Self {
        self.canonical_buffer = buffer;
        self
    }

    /// Metadata lookup timeout, if any
    #[inline]
    #[must_use]
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Build a metadata cache honouring this configuration
    #[must_use]
    pub fn metadata_cache(&self, fetcher: Arc<dyn MetadataFetcher>) -> MetadataCache {
        let cache = MetadataCache::new(fetcher).with_service_url(&self.service_url);
        match self.fetch_timeout() {
            Some(timeout) => cache.with_timeout(timeout),
            None => cache,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            validation_policy: ValidationPolicy::PersistAndFlag,
            fetch_timeout_ms: None,
            canonical_buffer: 16,
        }
    }
}
