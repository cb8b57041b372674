//! Encyclopedia lookups. Registered last: the final pattern matches any
//! query, and the trigger word picks the sub-type.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, not_configured, Answerer, MatchResult};
use crate::query::QueryContext;

/// A measured value such as a height or a mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub part: String,
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WiktionaryEntry {
    pub word: String,
    pub definitions: Vec<Definition>,
}

/// One article with the structured claims we know how to show.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WikiArticle {
    pub title: String,
    pub text: String,
    pub language: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub height: Vec<Quantity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weight: Vec<Quantity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiktionary: Option<WiktionaryEntry>,
}

/// Birth and death dates. Age answers carry both, the others one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death: Option<NaiveDate>,
}

#[async_trait]
pub trait WikiFetcher: Send + Sync {
    /// The article best matching `query` in `language`.
    async fn fetch(&self, query: &str, language: &str) -> Result<WikiArticle>;
}

pub struct Wikipedia {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn WikiFetcher>>,
}

impl Wikipedia {
    pub fn new(fetcher: Option<Arc<dyn WikiFetcher>>) -> Result<Self> {
        let t = alternation(&[
            "how old is",
            "age",
            "birthday",
            "born",
            "death",
            "died",
            "how tall is",
            "how tall was",
            "height",
            "mass",
            "weight",
            "weigh",
            "quotes",
            "quote",
            "definition",
            "define",
        ]);
        Ok(Self {
            patterns: compile(&[
                format!(r"^(?P<trigger>{t}) (?P<remainder>.*)$"),
                format!(r"^(?P<remainder>.*) (?P<trigger>{t})$"),
                r"^(?P<remainder>.*)$".to_owned(),
            ])?,
            fetcher,
        })
    }
}

fn missing(what: &str) -> JiveError {
    JiveError::InvalidInput(format!("article has no {what}"))
}

#[async_trait]
impl Answerer for Wikipedia {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Wikipedia
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    fn kind_of(&self, m: &MatchResult) -> AnswerKind {
        match m.trigger.as_str() {
            "age" | "how old is" => AnswerKind::WikidataAge,
            "birthday" | "born" => AnswerKind::WikidataBirthday,
            "death" | "died" => AnswerKind::WikidataDeath,
            "how tall is" | "how tall was" | "height" => AnswerKind::WikidataHeight,
            "mass" | "weigh" | "weight" => AnswerKind::WikidataWeight,
            "quote" | "quotes" => AnswerKind::Wikiquote,
            "define" | "definition" => AnswerKind::Wiktionary,
            _ => AnswerKind::Wikipedia,
        }
    }

    async fn solve(&self, m: &MatchResult, ctx: &QueryContext) -> Result<Solution> {
        if m.remainder.is_empty() {
            return Err(JiveError::InvalidInput("empty article query".into()));
        }
        let fetcher = self.fetcher.as_ref().ok_or_else(|| not_configured("wikipedia"))?;
        let article = fetcher.fetch(&m.remainder, &ctx.language).await?;

        let solution = match self.kind_of(m) {
            AnswerKind::WikidataAge => {
                let birthday = Some(article.birthday.ok_or_else(|| missing("birthday"))?);
                Solution::Life(LifeDates {
                    birthday,
                    death: article.death,
                })
            }
            AnswerKind::WikidataBirthday => Solution::Life(LifeDates {
                birthday: Some(article.birthday.ok_or_else(|| missing("birthday"))?),
                death: None,
            }),
            AnswerKind::WikidataDeath => Solution::Life(LifeDates {
                birthday: None,
                death: Some(article.death.ok_or_else(|| missing("death"))?),
            }),
            AnswerKind::WikidataHeight if article.height.is_empty() => return Err(missing("height")),
            AnswerKind::WikidataHeight => Solution::Measurements(article.height),
            AnswerKind::WikidataWeight if article.weight.is_empty() => return Err(missing("weight")),
            AnswerKind::WikidataWeight => Solution::Measurements(article.weight),
            AnswerKind::Wikiquote if article.quotes.is_empty() => return Err(missing("quotes")),
            AnswerKind::Wikiquote => Solution::Quotes(article.quotes),
            AnswerKind::Wiktionary => {
                Solution::Wiktionary(article.wiktionary.ok_or_else(|| missing("definition"))?)
            }
            _ if article.text.is_empty() => return Err(missing("summary")),
            _ => Solution::Wikipedia(article),
        };
        Ok(solution)
    }
}
