use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, not_configured, prefix_or_suffix, Answerer, MatchResult};
use crate::query::QueryContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breach {
    pub name: String,
    pub domain: String,
    pub date: Option<NaiveDate>,
    pub count: u64,
    pub description: String,
    /// Kinds of data exposed, e.g. "Passwords".
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachReport {
    pub account: String,
    /// Newest first.
    pub breaches: Vec<Breach>,
    pub provider: String,
}

#[async_trait]
pub trait BreachFetcher: Send + Sync {
    async fn fetch(&self, account: &str) -> Result<BreachReport>;
}

/// `have i been pwned someone@example.com`.
pub struct BreachCheck {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn BreachFetcher>>,
}

impl BreachCheck {
    pub fn new(fetcher: Option<Arc<dyn BreachFetcher>>) -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&["have i been pwned", "breach", "pwned"]))?,
            fetcher,
        })
    }
}

#[async_trait]
impl Answerer for BreachCheck {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Breach
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let account = m.remainder.as_str();
        if account.is_empty() || account.contains(char::is_whitespace) {
            return Err(JiveError::InvalidInput("breach lookups take one account".into()));
        }
        let fetcher = self.fetcher.as_ref().ok_or_else(|| not_configured("breach"))?;
        let mut report = fetcher.fetch(account).await?;
        report.breaches.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(Solution::Breach(report))
    }
}
