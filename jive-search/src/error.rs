//! Error types for the jive-search crate.
//!
//! All errors carry stable string messages. Queries never appear in
//! error messages; callers log them at trace level when needed.

/// Errors produced by the search verticals and the result cache.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A backend did not answer within its timeout.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// An HTTP request to a backend failed or returned non-2xx.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A backend response (or a cached blob) could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Set-if-absent lost the race: the key already holds a live value.
    #[error("unable to set key: {0}")]
    CannotSetKey(String),
}

impl SearchError {
    /// Map a reqwest failure onto [`SearchError::Timeout`] or [`SearchError::Http`].
    pub fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for jive-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
