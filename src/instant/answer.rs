//! The dispatcher's output: a tagged, typed instant answer.
//!
//! On the wire an answer is `{type, triggered, solution, cache}`. The
//! shape of `solution` is fixed per `type`; [`decode_solution`] is the one
//! place that maps a tag to its shape, so encoding and decoding agree.
//! Tags outside the catalog decode to [`Solution::Opaque`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::answerers::{
    Album, BreachReport, CountryCodeAnswer, CurrencyQuote, Delegation, Digest, EconSeries,
    LifeDates, MapAnswer, Parcel, Primes, Quantity, Quote, ShortUrl, StackOverflowAnswer,
    Weather, WhoisRecord, WikiArticle, WiktionaryEntry,
};

/// TTL hint for answers whose data moves quickly.
pub const VOLATILE_TTL: Duration = Duration::from_secs(60);

/// Closed set of answer tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerKind {
    Birthstone,
    Breach,
    Calculator,
    Camelcase,
    Characters,
    CoinToss,
    Congress,
    CountryCode,
    Currency,
    DigitalStorage,
    Discography,
    Fedex,
    Frequency,
    Gdp,
    Hash,
    Length,
    LocalWeather,
    Maps,
    Minify,
    MortgageCalculator,
    Population,
    Potus,
    Power,
    Prime,
    Random,
    Reverse,
    Speed,
    Stackoverflow,
    Stats,
    StockQuote,
    Temperature,
    Ups,
    UrlDecode,
    UrlEncode,
    UrlShortener,
    UserAgent,
    Usps,
    Weather,
    Whois,
    Wikipedia,
    WikidataAge,
    WikidataBirthday,
    WikidataDeath,
    WikidataHeight,
    WikidataWeight,
    Wikiquote,
    Wiktionary,
}

impl AnswerKind {
    pub const ALL: &'static [AnswerKind] = &[
        Self::Birthstone,
        Self::Breach,
        Self::Calculator,
        Self::Camelcase,
        Self::Characters,
        Self::CoinToss,
        Self::Congress,
        Self::CountryCode,
        Self::Currency,
        Self::DigitalStorage,
        Self::Discography,
        Self::Fedex,
        Self::Frequency,
        Self::Gdp,
        Self::Hash,
        Self::Length,
        Self::LocalWeather,
        Self::Maps,
        Self::Minify,
        Self::MortgageCalculator,
        Self::Population,
        Self::Potus,
        Self::Power,
        Self::Prime,
        Self::Random,
        Self::Reverse,
        Self::Speed,
        Self::Stackoverflow,
        Self::Stats,
        Self::StockQuote,
        Self::Temperature,
        Self::Ups,
        Self::UrlDecode,
        Self::UrlEncode,
        Self::UrlShortener,
        Self::UserAgent,
        Self::Usps,
        Self::Weather,
        Self::Whois,
        Self::Wikipedia,
        Self::WikidataAge,
        Self::WikidataBirthday,
        Self::WikidataDeath,
        Self::WikidataHeight,
        Self::WikidataWeight,
        Self::Wikiquote,
        Self::Wiktionary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Birthstone => "birthstone",
            Self::Breach => "breach",
            Self::Calculator => "calculator",
            Self::Camelcase => "camelcase",
            Self::Characters => "characters",
            Self::CoinToss => "coin-toss",
            Self::Congress => "congress",
            Self::CountryCode => "country-code",
            Self::Currency => "currency",
            Self::DigitalStorage => "digital-storage",
            Self::Discography => "discography",
            Self::Fedex => "fedex",
            Self::Frequency => "frequency",
            Self::Gdp => "gdp",
            Self::Hash => "hash",
            Self::Length => "length",
            Self::LocalWeather => "local-weather",
            Self::Maps => "maps",
            Self::Minify => "minify",
            Self::MortgageCalculator => "mortgage-calculator",
            Self::Population => "population",
            Self::Potus => "potus",
            Self::Power => "power",
            Self::Prime => "prime",
            Self::Random => "random",
            Self::Reverse => "reverse",
            Self::Speed => "speed",
            Self::Stackoverflow => "stackoverflow",
            Self::Stats => "stats",
            Self::StockQuote => "stock-quote",
            Self::Temperature => "temperature",
            Self::Ups => "ups",
            Self::UrlDecode => "url-decode",
            Self::UrlEncode => "url-encode",
            Self::UrlShortener => "url-shortener",
            Self::UserAgent => "user-agent",
            Self::Usps => "usps",
            Self::Weather => "weather",
            Self::Whois => "whois",
            Self::Wikipedia => "wikipedia",
            Self::WikidataAge => "wikidata-age",
            Self::WikidataBirthday => "wikidata-birthday",
            Self::WikidataDeath => "wikidata-death",
            Self::WikidataHeight => "wikidata-height",
            Self::WikidataWeight => "wikidata-weight",
            Self::Wikiquote => "wikiquote",
            Self::Wiktionary => "wiktionary",
        }
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown answer type {s:?}"))
    }
}

/// Whether a solved answer may be cached, and for how long at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub cache: bool,
    /// Upper bound on the TTL, tighter than the global instant TTL.
    pub ttl_hint: Option<Duration>,
}

impl CachePolicy {
    pub const NEVER: Self = Self {
        cache: false,
        ttl_hint: None,
    };

    /// The per-kind cache matrix.
    pub fn for_kind(kind: AnswerKind) -> Self {
        use AnswerKind as K;
        match kind {
            K::CoinToss | K::LocalWeather | K::Random | K::UserAgent | K::Maps => Self::NEVER,
            K::Currency | K::StockQuote | K::Fedex | K::Ups | K::Usps => Self {
                cache: true,
                ttl_hint: Some(VOLATILE_TTL),
            },
            _ => Self {
                cache: true,
                ttl_hint: None,
            },
        }
    }

    /// `min(ttl_hint, global)` when cacheable.
    pub fn effective_ttl(&self, global: Duration) -> Option<Duration> {
        self.cache
            .then(|| self.ttl_hint.map_or(global, |hint| hint.min(global)))
    }
}

/// The typed payload of an answer. The variant is determined by the tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Solution {
    Text(String),
    Number(f64),
    Primes(Primes),
    Hash(Digest),
    CountryCode(CountryCodeAnswer),
    Breach(BreachReport),
    Congress(Delegation),
    Currency(CurrencyQuote),
    Discography(Vec<Album>),
    Econ(EconSeries),
    Map(MapAnswer),
    Parcel(Parcel),
    StackOverflow(StackOverflowAnswer),
    Stock(Quote),
    Shortened(ShortUrl),
    Weather(Weather),
    Whois(WhoisRecord),
    Wikipedia(WikiArticle),
    Life(LifeDates),
    Measurements(Vec<Quantity>),
    Quotes(Vec<String>),
    Wiktionary(WiktionaryEntry),
    /// A solution whose tag this build does not know.
    Opaque { kind: String, text: String },
}

impl Solution {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// One-line rendering for plain pages.
    pub fn headline(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Primes(p) => p
                .primes
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Hash(d) => d.digest.clone(),
            Self::CountryCode(c) => format!("{} ({})", c.solution, c.country),
            Self::Breach(b) => format!("{}: {} breaches", b.account, b.breaches.len()),
            Self::Congress(d) => d
                .members
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Currency(c) => format!("{} {} to {}", c.notional, c.from, c.to),
            Self::Discography(albums) => albums
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Self::Econ(e) => e
                .history
                .last()
                .map(|p| format!("{}: {}", p.date, p.value))
                .unwrap_or_default(),
            Self::Map(m) => format!("{:.4}, {:.4}", m.latitude, m.longitude),
            Self::Parcel(p) => p
                .updates
                .first()
                .map(|u| format!("{}: {}", p.tracking_number, u.status))
                .unwrap_or_else(|| p.tracking_number.clone()),
            Self::StackOverflow(a) => a.question.clone(),
            Self::Stock(q) => format!("{} {:.2}", q.ticker, q.last.price),
            Self::Shortened(s) => s.short.clone(),
            Self::Weather(w) => format!("{} {}°", w.city, w.current.temperature),
            Self::Whois(w) => w.domain.clone(),
            Self::Wikipedia(a) => a.title.clone(),
            Self::Life(l) => l
                .birthday
                .map(|d| d.to_string())
                .unwrap_or_default(),
            Self::Measurements(q) => q
                .iter()
                .map(|m| format!("{} {}", m.amount, m.unit))
                .collect::<Vec<_>>()
                .join(", "),
            Self::Quotes(q) => q.first().cloned().unwrap_or_default(),
            Self::Wiktionary(w) => w
                .definitions
                .first()
                .map(|d| d.meaning.clone())
                .unwrap_or_default(),
            Self::Opaque { text, .. } => text.clone(),
        }
    }
}

/// Recover the typed solution for `kind` from its JSON form.
///
/// # Errors
///
/// Returns the decode error when `value` does not have the shape
/// registered for `kind`.
pub fn decode_solution(kind: AnswerKind, value: Value) -> Result<Solution, serde_json::Error> {
    use AnswerKind as K;
    let solution = match kind {
        K::Birthstone
        | K::Camelcase
        | K::Characters
        | K::CoinToss
        | K::DigitalStorage
        | K::Frequency
        | K::Length
        | K::Minify
        | K::MortgageCalculator
        | K::Potus
        | K::Power
        | K::Random
        | K::Reverse
        | K::Speed
        | K::Stats
        | K::Temperature
        | K::UrlDecode
        | K::UrlEncode
        | K::UserAgent => Solution::Text(serde_json::from_value(value)?),
        K::Calculator => match value {
            Value::Number(_) => Solution::Number(serde_json::from_value(value)?),
            other => Solution::Text(serde_json::from_value(other)?),
        },
        K::Prime => Solution::Primes(serde_json::from_value(value)?),
        K::Hash => Solution::Hash(serde_json::from_value(value)?),
        K::CountryCode => Solution::CountryCode(serde_json::from_value(value)?),
        K::Breach => Solution::Breach(serde_json::from_value(value)?),
        K::Congress => Solution::Congress(serde_json::from_value(value)?),
        K::Currency => Solution::Currency(serde_json::from_value(value)?),
        K::Discography => Solution::Discography(serde_json::from_value(value)?),
        K::Gdp | K::Population => Solution::Econ(serde_json::from_value(value)?),
        K::Maps => Solution::Map(serde_json::from_value(value)?),
        K::Fedex | K::Ups | K::Usps => Solution::Parcel(serde_json::from_value(value)?),
        K::Stackoverflow => Solution::StackOverflow(serde_json::from_value(value)?),
        K::StockQuote => Solution::Stock(serde_json::from_value(value)?),
        K::UrlShortener => Solution::Shortened(serde_json::from_value(value)?),
        K::Weather | K::LocalWeather => Solution::Weather(serde_json::from_value(value)?),
        K::Whois => Solution::Whois(serde_json::from_value(value)?),
        K::Wikipedia => Solution::Wikipedia(serde_json::from_value(value)?),
        K::WikidataAge | K::WikidataBirthday | K::WikidataDeath => {
            Solution::Life(serde_json::from_value(value)?)
        }
        K::WikidataHeight | K::WikidataWeight => {
            Solution::Measurements(serde_json::from_value(value)?)
        }
        K::Wikiquote => Solution::Quotes(serde_json::from_value(value)?),
        K::Wiktionary => Solution::Wiktionary(serde_json::from_value(value)?),
    };
    Ok(solution)
}

/// The dispatcher's result for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAnswer", into = "RawAnswer")]
pub struct Answer {
    /// `None` when nothing triggered or the tag is unknown to this build.
    pub kind: Option<AnswerKind>,
    pub triggered: bool,
    pub solution: Solution,
    pub cache: bool,
    /// Error kind recorded by the producer, if any.
    pub error: Option<String>,
}

impl Answer {
    /// The empty, untriggered answer.
    pub fn none() -> Self {
        Self {
            kind: None,
            triggered: false,
            solution: Solution::empty(),
            cache: false,
            error: None,
        }
    }

    /// Untriggered, with the error kind of the last answerer that declined.
    pub fn declined(error: Option<&str>) -> Self {
        Self {
            error: error.map(str::to_owned),
            ..Self::none()
        }
    }

    pub fn solved(kind: AnswerKind, solution: Solution, cache: bool) -> Self {
        Self {
            kind: Some(kind),
            triggered: true,
            solution,
            cache,
            error: None,
        }
    }

    /// The `type` tag as it appears on the wire.
    pub fn type_tag(&self) -> &str {
        match (&self.kind, &self.solution) {
            (Some(kind), _) => kind.as_str(),
            (None, Solution::Opaque { kind, .. }) => kind,
            (None, _) => "",
        }
    }

    /// The TTL to store this answer with, or `None` if it must not be stored.
    pub fn cache_ttl(&self, global: Duration) -> Option<Duration> {
        if !self.triggered || !self.cache {
            return None;
        }
        let kind = self.kind?;
        CachePolicy::for_kind(kind).effective_ttl(global)
    }
}

impl Default for Answer {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAnswer {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    kind: String,
    #[serde(default)]
    triggered: bool,
    #[serde(default)]
    solution: Value,
    #[serde(default)]
    cache: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<RawAnswer> for Answer {
    type Error = serde_json::Error;

    fn try_from(raw: RawAnswer) -> Result<Self, Self::Error> {
        let (kind, solution) = if raw.kind.is_empty() {
            let text = match raw.solution {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (None, Solution::Text(text))
        } else {
            match raw.kind.parse::<AnswerKind>() {
                Ok(kind) => (Some(kind), decode_solution(kind, raw.solution)?),
                Err(_) => {
                    let text = match raw.solution {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (
                        None,
                        Solution::Opaque {
                            kind: raw.kind,
                            text,
                        },
                    )
                }
            }
        };

        Ok(Self {
            kind,
            triggered: raw.triggered,
            solution,
            cache: raw.cache,
            error: raw.error,
        })
    }
}

impl From<Answer> for RawAnswer {
    fn from(answer: Answer) -> Self {
        let kind = answer.type_tag().to_owned();
        let solution = match answer.solution {
            Solution::Opaque { text, .. } => Value::String(text),
            other => serde_json::to_value(other).unwrap_or(Value::Null),
        };
        Self {
            kind,
            triggered: answer.triggered,
            solution,
            cache: answer.cache,
            error: answer.error,
        }
    }
}
