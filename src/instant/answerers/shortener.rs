use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, not_configured, prefix_or_suffix, Answerer, MatchResult};
use crate::query::QueryContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrl {
    pub original: String,
    pub short: String,
    pub provider: String,
}

#[async_trait]
pub trait Shortener: Send + Sync {
    async fn shorten(&self, url: &url::Url) -> Result<ShortUrl>;
}

/// `shorten https://example.com/a/long/path`.
pub struct UrlShortener {
    patterns: Vec<Regex>,
    shortener: Option<Arc<dyn Shortener>>,
}

impl UrlShortener {
    pub fn new(shortener: Option<Arc<dyn Shortener>>) -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&[
                "url shortener",
                "url shorten",
                "url short",
                "shorten url",
                "short url",
                "shortener",
                "shorten",
            ]))?,
            shortener,
        })
    }
}

/// Parse `remainder` as an absolute URL, assuming https when no scheme is given.
fn target(remainder: &str) -> Option<url::Url> {
    if remainder.is_empty() || remainder.contains(char::is_whitespace) {
        return None;
    }
    let candidate = if remainder.contains("://") {
        remainder.to_owned()
    } else {
        format!("https://{remainder}")
    };
    let url = url::Url::parse(&candidate).ok()?;
    url.host_str().filter(|h| h.contains('.'))?;
    Some(url)
}

#[async_trait]
impl Answerer for UrlShortener {
    fn kind(&self) -> AnswerKind {
        AnswerKind::UrlShortener
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let url = target(&m.remainder)
            .ok_or_else(|| JiveError::InvalidInput(format!("not a url: {}", m.remainder)))?;
        let shortener = self
            .shortener
            .as_ref()
            .ok_or_else(|| not_configured("url shortener"))?;
        Ok(Solution::Shortened(shortener.shorten(&url).await?))
    }
}
