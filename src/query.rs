//! Per-request query context and the query normalizer.

use std::net::IpAddr;
use std::time::Duration;

use jive_search::Filter;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::language::{self, LanguageMatcher};

/// Hard cap on results per page.
pub const MAX_NUMBER: usize = 100;

/// Highest page number a request may ask for. Larger values are clamped.
pub const MAX_PAGE: usize = u32::MAX as usize;

/// Lower-case, collapse whitespace runs to one space, then strip trailing
/// `?` and whitespace.
///
/// ```
/// assert_eq!(jive::query::normalize("  What IS   Rust?? "), "what is rust");
/// ```
pub fn normalize(raw: &str) -> String {
    let collapsed = raw
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed
        .trim_end_matches(|c: char| c == '?' || c.is_whitespace())
        .to_owned()
}

/// Which vertical the request asks for (`t` parameter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Web,
    Images,
    Maps,
}

impl Tab {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "images" => Self::Images,
            "maps" => Self::Maps,
            _ => Self::Web,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Images => "images",
            Self::Maps => "maps",
        }
    }
}

/// Response encoding (`o` parameter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Output {
    #[default]
    Html,
    Json,
}

/// Raw `/` query-string parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub l: Option<String>,
    pub r: Option<String>,
    pub p: Option<String>,
    pub n: Option<String>,
    pub t: Option<String>,
    pub safe: Option<String>,
    pub f: Option<String>,
    pub b: Option<String>,
    pub o: Option<String>,
}

/// Request facts that do not come from the query string.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub accept_language: Option<String>,
    pub user_agent: String,
    pub client_ip: Option<IpAddr>,
}

/// Everything producers need to know about one request. Immutable once
/// built.
#[derive(Debug, Clone, Serialize)]
pub struct QueryContext {
    #[serde(rename = "q")]
    pub raw: String,
    #[serde(skip)]
    pub normalized: String,
    #[serde(skip)]
    pub preferred_languages: Vec<String>,
    /// Resolved language tag.
    #[serde(rename = "l")]
    pub language: String,
    #[serde(rename = "r")]
    pub region: String,
    #[serde(skip)]
    pub user_agent: String,
    #[serde(rename = "t")]
    pub tab: Tab,
    #[serde(rename = "p")]
    pub page: usize,
    #[serde(rename = "n")]
    pub number: usize,
    pub safe: bool,
    #[serde(rename = "f")]
    pub filter: Filter,
    #[serde(skip)]
    pub output: Output,
    /// Triggers of the bangs offered on the start page (`b` parameter).
    #[serde(skip)]
    pub default_bangs: Vec<String>,
    #[serde(skip)]
    pub client_ip: Option<IpAddr>,
    #[serde(skip)]
    pub deadline: Instant,
}

impl QueryContext {
    /// A context with defaults for everything but the query. The deadline is
    /// three seconds from now.
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_owned(),
            normalized: normalize(raw),
            preferred_languages: vec!["en".into()],
            language: "en".into(),
            region: "US".into(),
            user_agent: String::new(),
            tab: Tab::Web,
            page: 1,
            number: 25,
            safe: true,
            filter: Filter::Moderate,
            output: Output::Html,
            default_bangs: Vec::new(),
            client_ip: None,
            deadline: Instant::now() + Duration::from_secs(3),
        }
    }

    /// Build the context for a `/` request.
    pub fn from_params(
        params: &SearchParams,
        meta: RequestMeta,
        matcher: &LanguageMatcher,
        default_number: usize,
        budget: Duration,
    ) -> Self {
        let raw = params.q.clone().unwrap_or_default().trim().to_owned();

        let mut preferred: Vec<String> = params
            .l
            .iter()
            .map(|l| l.trim().to_owned())
            .filter(|l| !l.is_empty())
            .collect();
        if let Some(header) = &meta.accept_language {
            preferred.extend(language::parse_accept_language(header));
        }

        let language = matcher.best_match(&preferred);
        let region = resolve_region(params.r.as_deref(), &preferred, &language);

        Self {
            normalized: normalize(&raw),
            raw,
            preferred_languages: preferred,
            language,
            region,
            user_agent: meta.user_agent,
            tab: params.t.as_deref().map(Tab::parse).unwrap_or_default(),
            page: parse_page(params.p.as_deref()),
            number: parse_number(params.n.as_deref(), default_number),
            safe: parse_safe(params.safe.as_deref()),
            filter: params.f.as_deref().map(Filter::parse).unwrap_or_default(),
            output: match params.o.as_deref() {
                Some("json") => Output::Json,
                _ => Output::Html,
            },
            default_bangs: params
                .b
                .as_deref()
                .map(parse_bang_list)
                .unwrap_or_default(),
            client_ip: meta.client_ip,
            deadline: Instant::now() + budget,
        }
    }
}

fn resolve_region(explicit: Option<&str>, preferred: &[String], language: &str) -> String {
    let explicit = explicit
        .map(str::trim)
        .filter(|r| r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()));
    if let Some(r) = explicit {
        return r.to_ascii_uppercase();
    }

    preferred
        .iter()
        .filter(|tag| {
            tag.split(['-', '_'])
                .next()
                .is_some_and(|b| b.eq_ignore_ascii_case(language))
        })
        .find_map(|tag| language::region_subtag(tag))
        .unwrap_or_else(|| language::likely_region(language).to_owned())
}

fn parse_page(value: Option<&str>) -> usize {
    value
        .and_then(|p| p.trim().parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .map_or(1, |p| p.min(MAX_PAGE))
}

fn parse_number(value: Option<&str>, default_number: usize) -> usize {
    value
        .and_then(|n| n.trim().parse::<usize>().ok())
        .filter(|n| (1..=MAX_NUMBER).contains(n))
        .unwrap_or(default_number)
}

fn parse_safe(value: Option<&str>) -> bool {
    !matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("f" | "false" | "off" | "0")
    )
}

fn parse_bang_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|b| b.trim().trim_start_matches('!').to_lowercase())
        .filter(|b| !b.is_empty())
        .collect()
}
