use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, not_configured, Answerer, MatchResult};
use crate::query::QueryContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exchange {
    #[serde(rename = "NASDAQ")]
    Nasdaq,
    #[serde(rename = "NYSE")]
    Nyse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Last {
    pub price: f64,
    pub time: DateTime<Utc>,
    pub change: f64,
    pub change_percent: f64,
}

/// One end-of-day bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eod {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub name: String,
    pub exchange: Exchange,
    pub last: Last,
    /// Ascending by date.
    pub history: Vec<Eod>,
    pub provider: String,
}

#[async_trait]
pub trait StockFetcher: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<Quote>;
}

/// `aapl quote`, `stock $brk.b`.
pub struct StockQuote {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn StockFetcher>>,
}

impl StockQuote {
    pub fn new(fetcher: Option<Arc<dyn StockFetcher>>) -> Result<Self> {
        let t = format!("(?:{})s?", alternation(&["stock quote", "quote", "stock"]));
        let ticker = r"\$?[a-z]{1,5}(?:\.[a-z])?";
        Ok(Self {
            patterns: compile(&[
                format!(r"^(?P<trigger>{t})\s?(?P<remainder>{ticker})$"),
                format!(r"^(?P<remainder>{ticker})\s(?P<trigger>{t})$"),
            ])?,
            fetcher,
        })
    }
}

#[async_trait]
impl Answerer for StockQuote {
    fn kind(&self) -> AnswerKind {
        AnswerKind::StockQuote
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let fetcher = self.fetcher.as_ref().ok_or_else(|| not_configured("stock quote"))?;
        let ticker = m.remainder.trim_start_matches('$').to_uppercase();
        let mut quote = fetcher.fetch(&ticker).await?;
        quote.history.sort_by_key(|e| e.date);
        Ok(Solution::Stock(quote))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        tickers: Mutex<Vec<String>>,
    }

    fn bar(day: u32) -> Eod {
        Eod {
            date: NaiveDate::from_ymd_opt(2013, 3, day).unwrap(),
            open: 1.0,
            close: 1.0,
            high: 1.0,
            low: 1.0,
            volume: 1,
        }
    }

    #[async_trait]
    impl StockFetcher for Recorder {
        async fn fetch(&self, ticker: &str) -> Result<Quote> {
            self.tickers.lock().unwrap().push(ticker.to_owned());
            Ok(Quote {
                ticker: ticker.to_owned(),
                name: "Apple Inc.".into(),
                exchange: Exchange::Nasdaq,
                last: Last {
                    price: 171.42,
                    time: Utc.timestamp_millis_opt(1_522_785_600_000).unwrap(),
                    change: 6.48,
                    change_percent: 0.03929,
                },
                history: vec![bar(27), bar(26)],
                provider: "IEX".into(),
            })
        }
    }

    #[tokio::test]
    async fn ticker_is_cleaned_and_history_sorted() {
        let rec = Arc::new(Recorder::default());
        let s = StockQuote::new(Some(rec.clone())).unwrap();
        for q in ["aapl quote", "stock $aapl", "quotes aapl", "$aapl stock quote"] {
            let m = s.matches(q).unwrap_or_else(|| panic!("{q} should match"));
            let Solution::Stock(quote) = s.solve(&m, &QueryContext::new(q)).await.unwrap() else {
                panic!("expected a quote");
            };
            assert_eq!(quote.history[0].date, NaiveDate::from_ymd_opt(2013, 3, 26).unwrap());
        }
        assert!(rec.tickers.lock().unwrap().iter().all(|t| t == "AAPL"));
    }

    #[test]
    fn class_shares_and_misses() {
        let s = StockQuote::new(None).unwrap();
        assert_eq!(s.matches("brk.b stock").unwrap().remainder, "brk.b");
        assert!(s.matches("toolong quote").is_none());
        assert!(s.matches("aapl").is_none());
    }

    #[test]
    fn exchange_wire_names() {
        assert_eq!(serde_json::to_string(&Exchange::Nasdaq).unwrap(), "\"NASDAQ\"");
        assert_eq!(serde_json::to_string(&Exchange::Nyse).unwrap(), "\"NYSE\"");
    }
}
