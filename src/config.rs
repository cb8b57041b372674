//! Configuration for the jive front-end.
//!
//! Loaded from TOML. Every section is `#[serde(default)]`, so a partial
//! file (or no file at all) yields a runnable configuration.

use std::path::PathBuf;
use std::time::Duration;

use jive_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JiveConfig {
    /// Supported languages, most preferred first. Empty means all supported.
    pub languages: Vec<String>,
    /// Branding shown on pages and in the JSON envelope.
    pub brand: BrandConfig,
    /// HTTP listener.
    pub server: ServerConfig,
    /// Result cache TTLs and namespace.
    pub cache: CacheConfig,
    /// Deadline and organic vertical settings.
    pub search: SearchSettings,
    /// Image vertical and reverse image proxy.
    pub images: ImagesConfig,
    /// Suggestion learner.
    pub suggest: SuggestConfig,
    /// Third-party instant-answer providers.
    pub providers: ProvidersConfig,
}

/// Brand strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    pub name: String,
    pub tagline: String,
    pub logo: String,
    pub small_logo: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "Jive Search".into(),
            tagline: "A search engine that doesn't track you.".into(),
            logo: String::new(),
            small_logo: String::new(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind. `0` picks an ephemeral port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Global TTL for instant answers, in seconds.
    pub instant_secs: u64,
    /// Global TTL for organic and image pages, in seconds.
    pub search_secs: u64,
    /// Namespace prepended to every key.
    pub prefix: String,
    /// Maximum number of live entries.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            instant_secs: 1,
            search_secs: 1,
            prefix: "jive".into(),
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn instant_ttl(&self) -> Duration {
        Duration::from_secs(self.instant_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }
}

/// Request deadline and organic vertical settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Per-request budget in milliseconds.
    pub deadline_ms: u64,
    /// HTTP timeout for organic and image backends, in seconds.
    pub organic_timeout_secs: u64,
    /// Custom organic User-Agent. `None` rotates built-in browser strings.
    pub user_agent: Option<String>,
    /// Images scoring above this are dropped when safe search is on.
    pub nsfw_threshold: f64,
    /// Results per page when `n` is absent or invalid.
    pub default_number: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            deadline_ms: 3000,
            organic_timeout_secs: 2,
            user_agent: None,
            nsfw_threshold: 0.8,
            default_number: 25,
        }
    }
}

impl SearchSettings {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

/// Image vertical settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Elasticsearch base URL. `None` disables the image vertical.
    pub elasticsearch_url: Option<String>,
    pub index: String,
    /// Reverse image proxy base URL. `None` disables thumbnail inlining.
    pub proxy_host: Option<String>,
    pub hmac_secret: String,
    pub fetch_timeout_ms: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            elasticsearch_url: None,
            index: "images".into(),
            proxy_host: None,
            hmac_secret: String::new(),
            fetch_timeout_ms: 1000,
        }
    }
}

/// Suggestion learner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Deny-list file, one term per line, `#` comments. Uses the embedded
    /// list when unset.
    pub naughty_path: Option<PathBuf>,
    /// Distinct queries the in-memory store keeps before it evicts the
    /// least searched one.
    pub max_entries: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            naughty_path: None,
            max_entries: 100_000,
        }
    }
}

/// Credentials and endpoints of instant-answer providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openweathermap: OpenWeatherMapConfig,
    pub iex: IexConfig,
    pub isgd: IsgdConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherMapConfig {
    /// API key. The weather answerer is disabled when empty.
    pub key: String,
    pub base_url: String,
}

impl Default for OpenWeatherMapConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: "https://api.openweathermap.org".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IexConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for IexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.iextrading.com/1.0".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IsgdConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for IsgdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://is.gd".into(),
        }
    }
}

impl JiveConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| JiveError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| JiveError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/jive/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("jive").join("config.toml")
        } else if let Some(config) = dirs::config_dir() {
            config.join("jive").join("config.toml")
        } else {
            PathBuf::from("/tmp/jive-config/config.toml")
        }
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - the request deadline and both cache TTLs are non-zero
    /// - backend HTTP timeouts are strictly shorter than the deadline
    /// - `nsfw_threshold` lies in `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.search.deadline_ms == 0 {
            return Err(JiveError::Config("search.deadline_ms must be greater than 0".into()));
        }
        if self.cache.instant_secs == 0 || self.cache.search_secs == 0 {
            return Err(JiveError::Config("cache TTLs must be greater than 0".into()));
        }
        if self.search.organic_timeout_secs.saturating_mul(1000) >= self.search.deadline_ms {
            return Err(JiveError::Config(
                "search.organic_timeout_secs must be shorter than search.deadline_ms".into(),
            ));
        }
        if self.images.fetch_timeout_ms >= self.search.deadline_ms {
            return Err(JiveError::Config(
                "images.fetch_timeout_ms must be shorter than search.deadline_ms".into(),
            ));
        }
        if self.suggest.max_entries == 0 {
            return Err(JiveError::Config("suggest.max_entries must be greater than 0".into()));
        }
        if self.search.default_number == 0 || self.search.default_number > 100 {
            return Err(JiveError::Config(
                "search.default_number must be between 1 and 100".into(),
            ));
        }
        self.search_config().validate()?;
        Ok(())
    }

    /// Settings for the organic and image verticals.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            timeout_seconds: self.search.organic_timeout_secs,
            user_agent: self.search.user_agent.clone(),
            nsfw_threshold: self.search.nsfw_threshold,
            image_fetch_timeout_ms: self.images.fetch_timeout_ms,
            proxy_host: self.images.proxy_host.clone(),
            hmac_secret: self.images.hmac_secret.clone(),
        }
    }
}
