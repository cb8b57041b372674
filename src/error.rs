//! Error types for the jive front-end.

use jive_search::SearchError;

/// Top-level error type for query handling.
#[derive(Debug, thiserror::Error)]
pub enum JiveError {
    /// The query did not satisfy an answerer's constraints.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A third-party API failed, timed out, or is not configured.
    #[error("external service unavailable: {0}")]
    ExternalUnavailable(String),

    /// The result cache could not be read or written.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    /// The per-request budget elapsed.
    #[error("deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// The suggestion learner refused to store a query.
    #[error("naughty word in query")]
    NaughtyWord,

    /// Malformed route input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Programming error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the search verticals or the cache.
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl JiveError {
    /// Stable kind name used in logs and JSON error fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid-input",
            Self::ExternalUnavailable(_) => "external-unavailable",
            Self::CacheUnavailable(_) => "cache-unavailable",
            Self::DeadlineExceeded(_) => "deadline-exceeded",
            Self::NaughtyWord => "naughty-word",
            Self::BadRequest(_) => "bad-request",
            Self::Internal(_) | Self::Io(_) => "internal",
            Self::Config(_) => "config",
            Self::Search(SearchError::CannotSetKey(_)) => "cannot-set-key",
            Self::Search(SearchError::Timeout(_)) => "deadline-exceeded",
            Self::Search(SearchError::Config(_)) => "config",
            Self::Search(_) => "external-unavailable",
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, JiveError>;
