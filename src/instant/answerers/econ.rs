//! GDP and population series for a country.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, not_configured, Answerer, MatchResult};
use crate::instant::countries;
use crate::query::QueryContext;

/// Years of history requested.
pub const YEARS: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Gdp,
    Population,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconPoint {
    /// Calendar year.
    pub date: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconSeries {
    pub country: String,
    /// Ascending by year.
    pub history: Vec<EconPoint>,
    pub provider: String,
}

#[async_trait]
pub trait EconFetcher: Send + Sync {
    /// Yearly values for `alpha2` in `from..=to`.
    async fn series(&self, indicator: Indicator, alpha2: &str, from: i32, to: i32)
        -> Result<EconSeries>;
}

/// `gdp of japan`, `population germany`.
pub struct Econ {
    indicator: Indicator,
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn EconFetcher>>,
}

impl Econ {
    pub fn gdp(fetcher: Option<Arc<dyn EconFetcher>>) -> Result<Self> {
        Self::new(Indicator::Gdp, &["gross domestic product", "gdp"], fetcher)
    }

    pub fn population(fetcher: Option<Arc<dyn EconFetcher>>) -> Result<Self> {
        Self::new(Indicator::Population, &["population"], fetcher)
    }

    fn new(
        indicator: Indicator,
        words: &[&str],
        fetcher: Option<Arc<dyn EconFetcher>>,
    ) -> Result<Self> {
        let w = alternation(words);
        Ok(Self {
            indicator,
            patterns: compile(&[
                format!(r"^(?P<country>.*) (?P<trigger>{w})$"),
                format!(r"^(?P<country>.*) (?P<trigger>{w}) of$"),
                format!(r"^(?P<trigger>{w}) of (?P<country>.*)$"),
                format!(r"^(?P<trigger>{w}) (?P<country>.*)$"),
            ])?,
            fetcher,
        })
    }
}

#[async_trait]
impl Answerer for Econ {
    fn kind(&self) -> AnswerKind {
        match self.indicator {
            Indicator::Gdp => AnswerKind::Gdp,
            Indicator::Population => AnswerKind::Population,
        }
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let country = m
            .field("country")
            .and_then(countries::resolve)
            .ok_or_else(|| JiveError::InvalidInput("unknown country".into()))?;
        let fetcher = self.fetcher.as_ref().ok_or_else(|| not_configured("economic data"))?;

        let to = Utc::now().year();
        let mut series = fetcher
            .series(self.indicator, country.alpha2, to - YEARS, to)
            .await?;
        series.history.sort_by_key(|p| p.date);
        Ok(Solution::Econ(series))
    }
}
