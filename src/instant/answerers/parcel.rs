//! Package tracking for FedEx, UPS and USPS. Each carrier recognizes its
//! own tracking-number shapes anywhere in the query.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{compile, not_configured, Answerer, MatchResult};
use crate::query::QueryContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub date_time: DateTime<Utc>,
    pub location: Location,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expected {
    pub delivery: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    pub tracking_number: String,
    /// Newest first.
    pub updates: Vec<Update>,
    pub expected: Expected,
    pub url: String,
}

#[async_trait]
pub trait ParcelFetcher: Send + Sync {
    async fn fetch(&self, tracking_number: &str) -> Result<Parcel>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Fedex,
    Ups,
    Usps,
}

impl Carrier {
    fn kind(self) -> AnswerKind {
        match self {
            Self::Fedex => AnswerKind::Fedex,
            Self::Ups => AnswerKind::Ups,
            Self::Usps => AnswerKind::Usps,
        }
    }

    fn patterns(self) -> &'static [&'static str] {
        match self {
            Self::Fedex => &[r"\b(?P<trigger>[0-9]{10}|[0-9]{12}|[0-9]{15}|[0-9]{20})\b"],
            Self::Ups => &[
                r"\b(?P<trigger>1z ?[0-9a-z]{3} ?[0-9a-z]{3} ?[0-9a-z]{2} ?[0-9a-z]{4} ?[0-9a-z]{3} ?[0-9a-z]|t\d{3} ?\d{4} ?\d{3}|\d{22})\b",
            ],
            Self::Usps => &[
                r"\b(?P<trigger>\d{30}|91\d+|\d{20})\b",
                r"\b(?P<trigger>e\D\d{9}\D{2}|9\d{15,21})\b",
                r"\b(?P<trigger>[a-z]{2}[0-9]+us)\b",
            ],
        }
    }
}

pub struct ParcelTracker {
    carrier: Carrier,
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn ParcelFetcher>>,
}

impl ParcelTracker {
    pub fn new(carrier: Carrier, fetcher: Option<Arc<dyn ParcelFetcher>>) -> Result<Self> {
        Ok(Self {
            carrier,
            patterns: compile(carrier.patterns())?,
            fetcher,
        })
    }
}

#[async_trait]
impl Answerer for ParcelTracker {
    fn kind(&self) -> AnswerKind {
        self.carrier.kind()
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| not_configured(self.carrier.kind().as_str()))?;
        let number: String = m
            .trigger
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        let mut parcel = fetcher.fetch(&number).await?;
        parcel.updates.sort_by(|a, b| b.date_time.cmp(&a.date_time));
        Ok(Solution::Parcel(parcel))
    }
}
