//! Forex and crypto conversion. Both rate tables are fetched concurrently
//! and merged by currency code.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{compile, not_configured, Answerer, MatchResult};
use crate::query::QueryContext;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub short: String,
    pub long: String,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short)
    }
}

pub const FOREX: &[(&str, &str)] = &[
    ("AUD", "Australian Dollar"),
    ("BGN", "Bulgarian Lev"),
    ("BRL", "Brazilian Real"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CNY", "Chinese Yuan"),
    ("CZK", "Czech Republic Koruna"),
    ("DKK", "Danish Krone"),
    ("EUR", "Euro"),
    ("GBP", "British Pound Sterling"),
    ("HKD", "Hong Kong Dollar"),
    ("HRK", "Croatian Kuna"),
    ("HUF", "Hungarian Forint"),
    ("IDR", "Indonesian Rupiah"),
    ("ILS", "Israeli New Sheqel"),
    ("INR", "Indian Rupee"),
    ("ISK", "Iceland Krona"),
    ("JPY", "Japanese Yen"),
    ("KRW", "South Korean Won"),
    ("LTL", "Lithuanian Litas"),
    ("MXN", "Mexican Peso"),
    ("MYR", "Malaysian Ringgit"),
    ("NOK", "Norwegian Krone"),
    ("NZD", "New Zealand Dollar"),
    ("PHP", "Philippine Peso"),
    ("PLN", "Polish Zloty"),
    ("RON", "Romanian Leu"),
    ("RUB", "Russian Ruble"),
    ("SEK", "Swedish Krona"),
    ("SGD", "Singapore Dollar"),
    ("THB", "Thai Baht"),
    ("TRY", "Turkish Lira"),
    ("USD", "US Dollar"),
    ("ZAR", "South African Rand"),
];

pub const CRYPTO: &[(&str, &str)] = &[
    ("BTC", "Bitcoin"),
    ("DOGE", "Dogecoin"),
    ("ETH", "Ethereum"),
    ("LTC", "Litecoin"),
    ("XMR", "Monero"),
    ("XRP", "Ripple"),
];

impl Currency {
    /// Look up a supported currency by its code, ignoring case.
    pub fn parse(code: &str) -> Option<Self> {
        FOREX
            .iter()
            .chain(CRYPTO)
            .find(|(short, _)| short.eq_ignore_ascii_case(code.trim()))
            .map(|&(short, long)| Self {
                short: short.to_owned(),
                long: long.to_owned(),
            })
    }

    pub fn usd() -> Self {
        Self {
            short: "USD".into(),
            long: "US Dollar".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub date_time: DateTime<Utc>,
    pub rate: f64,
}

/// One provider's rates against USD, keyed by currency code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub provider: String,
    pub history: BTreeMap<String, Vec<Rate>>,
}

#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self) -> Result<RateTable>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyQuote {
    pub notional: f64,
    pub from: Currency,
    pub to: Currency,
    pub base: Currency,
    /// Each series ascending by date.
    pub history: BTreeMap<String, Vec<Rate>>,
    pub forex_provider: String,
    pub crypto_provider: String,
}

/// `convert 100 jpy to gbp`, `125 btc`, `eur to usd`.
pub struct CurrencyAnswerer {
    patterns: Vec<Regex>,
    forex: Option<Arc<dyn RateFetcher>>,
    crypto: Option<Arc<dyn RateFetcher>>,
}

impl CurrencyAnswerer {
    pub fn new(
        forex: Option<Arc<dyn RateFetcher>>,
        crypto: Option<Arc<dyn RateFetcher>>,
    ) -> Result<Self> {
        let shapes = [
            r"(?P<notional>\d+) (?P<from>.*) to (?P<to>.*)",
            r"(?P<notional>\d+) (?P<from>.*) (?P<to>.*)",
            r"(?P<notional>\d+) (?P<from>.*)",
            r"(?P<from>.*) to (?P<to>.*)",
            r"(?P<from>.*) (?P<to>.*)",
            r"(?P<from>.*)",
        ];
        let patterns: Vec<String> = shapes
            .iter()
            .map(|s| format!("^(?P<trigger>convert) {s}$"))
            .chain(shapes.iter().map(|s| format!("^{s}$")))
            .collect();
        Ok(Self {
            patterns: compile(&patterns)?,
            forex,
            crypto,
        })
    }

    /// The currencies and amount named by the match. `to` falls back to
    /// USD except after PHP, which is more often the language.
    fn pair(m: &MatchResult) -> Result<(f64, Currency, Currency)> {
        let notional = match m.field("notional") {
            Some(n) => n
                .parse::<f64>()
                .map_err(|e| JiveError::InvalidInput(format!("notional: {e}")))?,
            None => 1.0,
        };
        let from = m
            .field("from")
            .and_then(Currency::parse)
            .ok_or_else(|| JiveError::InvalidInput("invalid currency".into()))?;
        let to = match m.field("to").and_then(Currency::parse) {
            Some(to) => to,
            None if from.short == "PHP" => {
                return Err(JiveError::InvalidInput("invalid currency".into()));
            }
            None => Currency::usd(),
        };
        Ok((notional, from, to))
    }
}

#[async_trait]
impl Answerer for CurrencyAnswerer {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Currency
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let (notional, from, to) = Self::pair(m)?;
        let (Some(forex), Some(crypto)) = (&self.forex, &self.crypto) else {
            return Err(not_configured("currency"));
        };

        let (forex, crypto) = tokio::try_join!(forex.fetch(), crypto.fetch())?;
        let mut history = forex.history;
        history.extend(crypto.history);
        for series in history.values_mut() {
            series.sort_by_key(|r| r.date_time);
        }

        Ok(Solution::Currency(CurrencyQuote {
            notional,
            from,
            to,
            base: Currency::usd(),
            history,
            forex_provider: forex.provider,
            crypto_provider: crypto.provider,
        }))
    }
}
