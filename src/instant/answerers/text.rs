//! Answers computed from the query text alone.

use async_trait::async_trait;
use regex::Regex;

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{
    alternation, compile, prefix_or_suffix, strip_quotes, Answerer, MatchResult, SelfTest,
};
use crate::query::QueryContext;

/// `camelcase metallica rocks` gives `MetallicaRocks`.
pub struct CamelCase {
    patterns: Vec<Regex>,
}

impl CamelCase {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&["camelcase", "camel case"]))?,
        })
    }
}

/// Upper-case every letter that follows a separator. Letters, digits and
/// `_` are not separators, so `o'doyle` becomes `O'Doyle`.
fn title(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut after_separator = true;
    for c in word.chars() {
        if after_separator {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        after_separator = !(c.is_alphanumeric() || c == '_');
    }
    out
}

#[async_trait]
impl Answerer for CamelCase {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Camelcase
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        Ok(Solution::Text(
            m.remainder.split_whitespace().map(title).collect(),
        ))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new("camelcase metallica rocks", Solution::text("MetallicaRocks")),
            SelfTest::new(
                "aliCE in chAins Is better camel case",
                Solution::text("AliceInChainsIsBetter"),
            ),
            SelfTest::new("camel case O'doyle ruLES", Solution::text("O'DoyleRules")),
        ]
    }
}

const CHARACTER_TRIGGERS: &[&str] = &[
    "number of characters in",
    "number of characters",
    "number of chars in",
    "number of chars",
    "char count of",
    "char count",
    "chars count of",
    "chars count",
    "character count of",
    "character count",
    "characters count of",
    "characters count",
    "length in chars",
    "length in characters",
];

/// Character count, outer quotes excluded.
pub struct Characters {
    patterns: Vec<Regex>,
}

impl Characters {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(CHARACTER_TRIGGERS))?,
        })
    }
}

#[async_trait]
impl Answerer for Characters {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Characters
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        Ok(Solution::Text(
            strip_quotes(&m.remainder).chars().count().to_string(),
        ))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new(r#"number of chars in "Jimi Hendrix""#, Solution::text("12")),
            SelfTest::new("number of chars   in Pink   Floyd", Solution::text("10")),
            SelfTest::new("Bob Dylan   number of characters in", Solution::text("9")),
            SelfTest::new("char count Led Zeppelin", Solution::text("12")),
            SelfTest::new("char count of ' 87 '", Solution::text("4")),
            SelfTest::new("1234567 character count", Solution::text("7")),
            SelfTest::new("characters count 50 cent", Solution::text("7")),
            SelfTest::new("length in characters mountain", Solution::text("8")),
        ]
    }
}

/// `frequency of a in abracadabra` gives `5`.
pub struct Frequency {
    patterns: Vec<Regex>,
    needle_in: Regex,
}

impl Frequency {
    pub fn new() -> Result<Self> {
        let mut compiled = compile(&[
            r"^(?P<trigger>frequency of) (?P<remainder>.*)$",
            r"^(?P<needle>.*?) in (?P<haystack>.+)$",
        ])?;
        let needle_in = compiled.remove(1);
        Ok(Self {
            patterns: compiled,
            needle_in,
        })
    }
}

#[async_trait]
impl Answerer for Frequency {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Frequency
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let caps = self
            .needle_in
            .captures(&m.remainder)
            .ok_or_else(|| JiveError::InvalidInput("expected `<x> in <y>`".into()))?;
        let needle = caps.name("needle").map_or("", |c| c.as_str());
        let haystack = caps.name("haystack").map_or("", |c| c.as_str());
        if needle.is_empty() || haystack.is_empty() {
            return Err(JiveError::InvalidInput("expected `<x> in <y>`".into()));
        }
        Ok(Solution::Text(haystack.matches(needle).count().to_string()))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new("frequency of a in abracadabra", Solution::text("5")),
            SelfTest::new("frequency of o in cooler", Solution::text("2")),
            SelfTest::new("frequency of s in jimi hendrix", Solution::text("0")),
            SelfTest::new("frequency of e in fred astaire", Solution::text("2")),
        ]
    }
}

/// Reverse by characters, outer quotes excluded.
pub struct Reverse {
    patterns: Vec<Regex>,
}

impl Reverse {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix("reverse")?,
        })
    }
}

#[async_trait]
impl Answerer for Reverse {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Reverse
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        Ok(Solution::Text(strip_quotes(&m.remainder).chars().rev().collect()))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new(
                "reverse ahh lights....ahh see 'em",
                Solution::text("me' ees hha....sthgil hha"),
            ),
            SelfTest::new("reverse 私日本語は話せません", Solution::text("んせませ話は語本日私")),
            SelfTest::new(r#"reverse "ahh yeah""#, Solution::text("haey hha")),
        ]
    }
}

const ENCODE_TRIGGERS: &[&str] = &[
    "urlencode", "encodeurl", "url encode", "encode url", "urlescape", "escapeurl", "url escape",
    "escape url", "uriencode", "encodeuri", "uri encode", "encode uri", "uriescape", "escapeuri",
    "uri escape", "escape uri",
];

const DECODE_TRIGGERS: &[&str] = &[
    "urldecode", "decodeurl", "url decode", "decode url", "urlunescape", "urlunescaper",
    "unescapeurl", "url unescape", "url unescaper", "unescape url", "uridecode", "decodeuri",
    "uri decode", "decode uri", "uriunescape", "uriunescaper", "unescapeuri", "uri unescape",
    "uri unescaper", "unescape uri",
];

/// Query-string escaping, spaces as `+`.
pub struct UrlEncode {
    patterns: Vec<Regex>,
}

impl UrlEncode {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(ENCODE_TRIGGERS))?,
        })
    }
}

#[async_trait]
impl Answerer for UrlEncode {
    fn kind(&self) -> AnswerKind {
        AnswerKind::UrlEncode
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        Ok(Solution::Text(
            url::form_urlencoded::byte_serialize(m.remainder.as_bytes()).collect(),
        ))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new(
                "urlencode http://www.example.com?q=this|that",
                Solution::text("http%3A%2F%2Fwww.example.com%3Fq%3Dthis%7Cthat"),
            ),
            SelfTest::new("encode url a b&c", Solution::text("a+b%26c")),
        ]
    }
}

/// Inverse of [`UrlEncode`].
pub struct UrlDecode {
    patterns: Vec<Regex>,
}

impl UrlDecode {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(DECODE_TRIGGERS))?,
        })
    }
}

#[async_trait]
impl Answerer for UrlDecode {
    fn kind(&self) -> AnswerKind {
        AnswerKind::UrlDecode
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let plus_as_space = m.remainder.replace('+', " ");
        urlencoding::decode(&plus_as_space)
            .map(|s| Solution::Text(s.into_owned()))
            .map_err(|_| JiveError::InvalidInput("escape does not decode to UTF-8".into()))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![SelfTest::new(
            "urldecode http%3A%2F%2Fwww.example.com%3Fq%3Dthis%7Cthat",
            Solution::text("http://www.example.com?q=this|that"),
        )]
    }
}

const USER_AGENT_TRIGGERS: &[&str] = &[
    "user agent",
    "useragent",
    "my user agent",
    "my useragent",
    "what's my user agent",
    "what's my useragent",
    "what is my user agent",
    "what is my useragent",
];

/// Echo the caller's `User-Agent`. Never cached.
pub struct UserAgent {
    patterns: Vec<Regex>,
}

impl UserAgent {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: compile(&[format!(
                "^(?P<trigger>{})$",
                alternation(USER_AGENT_TRIGGERS)
            )])?,
        })
    }
}

#[async_trait]
impl Answerer for UserAgent {
    fn kind(&self) -> AnswerKind {
        AnswerKind::UserAgent
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, _m: &MatchResult, ctx: &QueryContext) -> Result<Solution> {
        if ctx.user_agent.is_empty() {
            return Err(JiveError::InvalidInput("no user agent sent".into()));
        }
        Ok(Solution::text(ctx.user_agent.clone()))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        let firefox = "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";
        ["user agent", "useragent?", "my user agent", "what's my user agent?", "what is my useragent?"]
            .into_iter()
            .map(|q| SelfTest {
                query: q.to_owned(),
                user_agent: Some(firefox.to_owned()),
                expected: vec![Solution::text(firefox)],
            })
            .collect()
    }
}
