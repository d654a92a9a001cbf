//! Client configuration.
//!
//! Configuration is stored in TOML and loaded from the platform config
//! directory, falling back to built-in defaults when no file exists.
//! Environment variables override a few settings:
//!
//! - `QURAN_API_URL`: primary content API base URL
//! - `QURAN_DATA_DIR`: directory for the local persisted state file
//!
//! ## Example configuration file
//!
//! ```toml
//! [api]
//! base_url = "https://api.alquran.cloud/v1"
//! fallback_urls = ["https://mirror.example.org/v1"]
//! timeout_ms = 15000
//! max_retries = 3
//! retry_delay_ms = 1000
//! failover_after = 1
//! primary_edition = "quran-uthmani"
//!
//! [cache]
//! enabled = true
//! expiry_hours = 24
//!
//! [audio]
//! cdn = "https://cdn.islamic.network/quran/audio"
//! chapter_cdn = "https://cdn.islamic.network/quran/audio-surah"
//! ```
//!
//! ```rust
//! use quran_core::ClientConfig;
//!
//! let config: ClientConfig = toml::from_str("[api]\nmax_retries = 5\n")?;
//! assert_eq!(config.api.max_retries, 5);
//! assert_eq!(config.api.timeout_ms, 15_000);
//! # Ok::<(), toml::de::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding [`ApiConfig::base_url`].
pub const API_URL_ENV: &str = "QURAN_API_URL";

/// Environment variable overriding the local state directory.
pub const DATA_DIR_ENV: &str = "QURAN_DATA_DIR";

/// Top-level configuration for a [`crate::QuranClient`] session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Upstream content API settings.
    pub api: ApiConfig,
    /// Response cache settings.
    pub cache: CacheConfig,
    /// Audio CDN settings.
    pub audio: AudioConfig,
}

/// Upstream content API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Primary base URL, tried first.
    pub base_url: String,

    /// Ordered fallback base URLs used after the façade rotates endpoints.
    pub fallback_urls: Vec<String>,

    /// Per-attempt deadline in milliseconds.
    pub timeout_ms: u64,

    /// Extra attempts after the first one for transient failures.
    pub max_retries: u32,

    /// Base retry delay in milliseconds, multiplied by the attempt number.
    pub retry_delay_ms: u64,

    /// Failed requests in a row before the client moves to the next endpoint.
    pub failover_after: u32,

    /// Edition whose text becomes [`crate::Verse::text`].
    pub primary_edition: String,
}

impl ApiConfig {
    /// Per-attempt deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base retry delay.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Primary URL followed by the fallbacks, without duplicates.
    #[must_use]
    pub fn endpoints(&self) -> Vec<String> {
        let mut endpoints = vec![self.base_url.trim_end_matches('/').to_string()];
        for url in &self.fallback_urls {
            let url = url.trim_end_matches('/').to_string();
            if !endpoints.contains(&url) {
                endpoints.push(url);
            }
        }
        endpoints
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.alquran.cloud/v1".to_string(),
            fallback_urls: Vec::new(),
            timeout_ms: 15_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
            failover_after: 1,
            primary_edition: "quran-uthmani".to_string(),
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false, nothing is cached.
    pub enabled: bool,
    /// Entry lifetime in hours.
    pub expiry_hours: u32,
}

impl CacheConfig {
    /// Entry lifetime.
    #[must_use]
    pub fn expiry(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.expiry_hours))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expiry_hours: 24,
        }
    }
}

/// Audio CDN settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Base URL for per-verse recitations.
    pub cdn: String,
    /// Base URL for whole-chapter recitations.
    pub chapter_cdn: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            cdn: "https://cdn.islamic.network/quran/audio".to_string(),
            chapter_cdn: "https://cdn.islamic.network/quran/audio-surah".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the default location, or defaults if absent.
    ///
    /// Environment overrides are applied after the file is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, or the
    /// file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Load configuration from an explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to an explicit file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, serialization
    /// fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Apply `QURAN_API_URL` when set and non-empty.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                tracing::debug!("{API_URL_ENV} overrides base url: {trimmed}");
                self.api.base_url = trimmed.to_string();
            }
        }
        self
    }

    /// Reject settings the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty base URL or primary edition, an
    /// endpoint that is not an absolute http(s) URL, or a zero timeout or
    /// failover threshold.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config("api.base_url must not be empty".into()));
        }
        for endpoint in self.api.endpoints() {
            check_endpoint(&endpoint)?;
        }
        if self.api.timeout_ms == 0 {
            return Err(Error::Config("api.timeout_ms must be positive".into()));
        }
        if self.api.failover_after == 0 {
            return Err(Error::Config("api.failover_after must be positive".into()));
        }
        if self.api.primary_edition.trim().is_empty() {
            return Err(Error::Config("api.primary_edition must not be empty".into()));
        }
        Ok(())
    }

    /// Path of the configuration file on this platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "quran", "quran-core")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Directory holding the local persisted state.
    ///
    /// Honors `QURAN_DATA_DIR`, then the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined.
    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }
        directories::ProjectDirs::from("org", "quran", "quran-core")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::Config("Failed to determine data directory".into()))
    }
}

/// Every endpoint must accept appended path segments.
fn check_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::Config(format!("invalid API endpoint {endpoint:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "API endpoint {endpoint:?} must be an http(s) URL"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "https://api.alquran.cloud/v1");
        assert_eq!(config.api.timeout(), Duration::from_millis(15_000));
        assert_eq!(config.api.max_retries, 3);
        assert_eq!(config.api.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.cache.expiry(), chrono::Duration::hours(24));
        assert!(config.cache.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            fallback_urls = ["https://mirror.example.org/v1/"]

            [cache]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_ms, 15_000);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.expiry_hours, 24);
        assert_eq!(
            config.api.endpoints(),
            vec![
                "https://api.alquran.cloud/v1".to_string(),
                "https://mirror.example.org/v1".to_string(),
            ]
        );
    }

    #[test]
    fn test_endpoints_deduplicate_primary() {
        let mut api = ApiConfig::default();
        api.fallback_urls = vec![api.base_url.clone(), "https://b.example".into()];
        assert_eq!(api.endpoints().len(), 2);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.api.max_retries = 1;
        config.api.fallback_urls = vec!["https://mirror.example.org/v1".into()];
        config.save_to(&path).unwrap();

        let loaded = ClientConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();

        assert!(matches!(ClientConfig::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_endpoints_are_rejected() {
        let mut config = ClientConfig::default();
        config.api.fallback_urls = vec!["mirror.example/v1".into()];
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.api.fallback_urls = vec!["mailto:mirror@example.org".into()];
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.api.fallback_urls = vec!["http://localhost:8080/v1/".into()];
        assert!(config.validate().is_ok());

        config.api.base_url = "api.alquran.cloud/v1".into();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\ntimeout_ms = 0\n").unwrap();

        assert!(matches!(ClientConfig::load_from(&path), Err(Error::Config(_))));
    }
}
