//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls backend timeouts, the organic User-Agent,
//! the NSFW cut-off and the reverse image proxy used for thumbnails.

use crate::error::SearchError;

/// Configuration for the organic and image verticals.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Per-request HTTP timeout for organic and image backends, in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Images scoring above this are dropped when safe search is on.
    pub nsfw_threshold: f64,
    /// Timeout for fetching one thumbnail through the image proxy.
    pub image_fetch_timeout_ms: u64,
    /// Base URL of the reverse image proxy, e.g. `https://jive.example`.
    /// `None` disables thumbnail inlining.
    pub proxy_host: Option<String>,
    /// Secret used to sign proxy URLs.
    pub hmac_secret: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 3,
            user_agent: None,
            nsfw_threshold: 0.8,
            image_fetch_timeout_ms: 1000,
            proxy_host: None,
            hmac_secret: String::new(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `image_fetch_timeout_ms` must be greater than 0
    /// - `nsfw_threshold` must lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.image_fetch_timeout_ms == 0 {
            return Err(SearchError::Config(
                "image_fetch_timeout_ms must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.nsfw_threshold) {
            return Err(SearchError::Config(
                "nsfw_threshold must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.timeout_seconds, 3);
        assert!((config.nsfw_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.image_fetch_timeout_ms, 1000);
        assert!(config.user_agent.is_none());
        assert!(config.proxy_host.is_none());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn zero_image_timeout_rejected() {
        let config = SearchConfig {
            image_fetch_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn threshold_out_of_range_rejected() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let config = SearchConfig {
                nsfw_threshold: bad,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn threshold_bounds_accepted() {
        for ok in [0.0, 1.0] {
            let config = SearchConfig {
                nsfw_threshold: ok,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }
}
