use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, not_configured, prefix_or_suffix, Answerer, MatchResult};
use crate::query::QueryContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrar {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisRecord {
    pub domain: String,
    pub status: Vec<String>,
    pub registrar: Registrar,
    pub nameservers: Vec<String>,
    pub available: bool,
}

#[async_trait]
pub trait WhoisFetcher: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord>;
}

/// `whois example.com`.
pub struct Whois {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn WhoisFetcher>>,
}

impl Whois {
    pub fn new(fetcher: Option<Arc<dyn WhoisFetcher>>) -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&["whois"]))?,
            fetcher,
        })
    }
}

/// The host part of `remainder`, which may be a full URL.
fn domain(remainder: &str) -> Option<String> {
    let candidate = if remainder.contains("://") {
        url::Url::parse(remainder).ok()?.host_str()?.to_owned()
    } else {
        remainder.split('/').next()?.to_owned()
    };
    let candidate = candidate.trim_start_matches("www.");
    (candidate.contains('.') && !candidate.contains(char::is_whitespace))
        .then(|| candidate.to_owned())
}

#[async_trait]
impl Answerer for Whois {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Whois
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let domain = domain(&m.remainder)
            .ok_or_else(|| JiveError::InvalidInput(format!("not a domain: {}", m.remainder)))?;
        let fetcher = self.fetcher.as_ref().ok_or_else(|| not_configured("whois"))?;
        Ok(Solution::Whois(fetcher.lookup(&domain).await?))
    }
}
