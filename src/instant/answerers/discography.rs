use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, not_configured, prefix_or_suffix, Answerer, MatchResult};
use crate::query::QueryContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverArt {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub published: Option<NaiveDate>,
    pub image: CoverArt,
}

#[async_trait]
pub trait DiscographyFetcher: Send + Sync {
    async fn albums(&self, artist: &str) -> Result<Vec<Album>>;
}

/// `bob marley discography`, `albums radiohead`.
pub struct Discography {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn DiscographyFetcher>>,
}

impl Discography {
    pub fn new(fetcher: Option<Arc<dyn DiscographyFetcher>>) -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&["discography", "albums"]))?,
            fetcher,
        })
    }
}

#[async_trait]
impl Answerer for Discography {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Discography
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| not_configured("discography"))?;
        let mut albums = fetcher.albums(&m.remainder).await?;
        if albums.is_empty() {
            return Err(JiveError::InvalidInput(format!("no albums for {}", m.remainder)));
        }
        // undated releases sort first
        albums.sort_by_key(|a| a.published);
        Ok(Solution::Discography(albums))
    }
}
