//! The uniform answerer contract and trigger-pattern helpers.

use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;

use super::answer::{AnswerKind, CachePolicy, Solution};
use crate::error::{JiveError, Result};
use crate::query::QueryContext;

/// What a trigger pattern captured from the normalized query. Built once
/// per match and handed to `solve` by reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Index of the pattern that matched.
    pub pattern: usize,
    /// The `trigger` capture, trimmed. Empty when the pattern has none.
    pub trigger: String,
    /// The `remainder` capture, trimmed.
    pub remainder: String,
    /// Every other named capture, trimmed.
    pub fields: HashMap<String, String>,
}

impl MatchResult {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// A query and the solutions the dispatcher may return for it. More than
/// one expected solution covers answerers that pick at random.
#[derive(Debug, Clone)]
pub struct SelfTest {
    pub query: String,
    pub user_agent: Option<String>,
    pub expected: Vec<Solution>,
}

impl SelfTest {
    pub fn new(query: &str, expected: Solution) -> Self {
        Self {
            query: query.to_owned(),
            user_agent: None,
            expected: vec![expected],
        }
    }

    pub fn any_of(query: &str, expected: Vec<Solution>) -> Self {
        Self {
            query: query.to_owned(),
            user_agent: None,
            expected,
        }
    }
}

/// One entry in the instant-answer registry.
#[async_trait]
pub trait Answerer: Send + Sync {
    /// The tag this answerer registers under.
    fn kind(&self) -> AnswerKind;

    /// Anchored patterns, tried in order.
    fn triggers(&self) -> &[Regex];

    /// First matching pattern wins; captures are trimmed.
    fn matches(&self, normalized: &str) -> Option<MatchResult> {
        self.triggers().iter().enumerate().find_map(|(i, re)| {
            let caps = re.captures(normalized)?;
            let mut m = MatchResult {
                pattern: i,
                ..MatchResult::default()
            };
            for name in re.capture_names().flatten() {
                let Some(value) = caps.name(name) else {
                    continue;
                };
                let value = value.as_str().trim().to_owned();
                match name {
                    "trigger" => m.trigger = value,
                    "remainder" => m.remainder = value,
                    _ => {
                        m.fields.insert(name.to_owned(), value);
                    }
                }
            }
            Some(m)
        })
    }

    /// The tag of the answer produced for `m`. Answerers with sub-types
    /// override this.
    fn kind_of(&self, _m: &MatchResult) -> AnswerKind {
        self.kind()
    }

    /// Compute the solution.
    ///
    /// # Errors
    ///
    /// [`JiveError::InvalidInput`] when the capture does not fit, or
    /// [`JiveError::ExternalUnavailable`] when a backend fails.
    async fn solve(&self, m: &MatchResult, ctx: &QueryContext) -> Result<Solution>;

    fn cache_policy(&self, kind: AnswerKind) -> CachePolicy {
        CachePolicy::for_kind(kind)
    }

    /// Queries with their expected solutions. Empty for answerers that
    /// need a backend.
    fn self_tests(&self) -> Vec<SelfTest> {
        Vec::new()
    }
}

/// Join literal triggers into an escaped alternation.
pub(crate) fn alternation(triggers: &[&str]) -> String {
    triggers
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

/// Compile patterns, reporting the first bad one.
pub(crate) fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p.as_ref())
                .map_err(|e| JiveError::Internal(format!("trigger pattern {:?}: {e}", p.as_ref())))
        })
        .collect()
}

/// `^(trigger) (remainder)$` and `^(remainder) (trigger)$`.
pub(crate) fn prefix_or_suffix(triggers: &str) -> Result<Vec<Regex>> {
    compile(&[
        format!(r"^(?P<trigger>{triggers}) (?P<remainder>.*)$"),
        format!(r"^(?P<remainder>.*) (?P<trigger>{triggers})$"),
    ])
}

/// The trigger alone, then as a prefix, then as a suffix.
pub(crate) fn bare_prefix_or_suffix(triggers: &str) -> Result<Vec<Regex>> {
    compile(&[
        format!(r"^(?P<trigger>{triggers})$"),
        format!(r"^(?P<trigger>{triggers}) (?P<remainder>.*)$"),
        format!(r"^(?P<remainder>.*) (?P<trigger>{triggers})$"),
    ])
}

/// Strip one matching pair of `"` or `'` from both ends.
pub(crate) fn strip_quotes(s: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| s.strip_prefix(quote)?.strip_suffix(quote))
        .unwrap_or(s)
}

/// Error for answerers whose backend is not configured.
pub(crate) fn not_configured(what: &str) -> JiveError {
    JiveError::ExternalUnavailable(format!("no {what} backend configured"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        patterns: Vec<Regex>,
    }

    #[async_trait]
    impl Answerer for Echo {
        fn kind(&self) -> AnswerKind {
            AnswerKind::Reverse
        }

        fn triggers(&self) -> &[Regex] {
            &self.patterns
        }

        async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
            Ok(Solution::text(m.remainder.clone()))
        }
    }

    fn echo() -> Echo {
        let mut patterns = prefix_or_suffix(&alternation(&["reverse", "backwards"])).unwrap();
        patterns.extend(compile(&[r"^(?P<word>\w+) (?P<trigger>flip)$"]).unwrap());
        Echo { patterns }
    }

    #[test]
    fn first_pattern_wins_and_captures_are_trimmed() {
        let m = echo().matches("reverse  hello ").unwrap();
        assert_eq!(m.pattern, 0);
        assert_eq!(m.trigger, "reverse");
        assert_eq!(m.remainder, "hello");
    }

    #[test]
    fn suffix_pattern() {
        let m = echo().matches("hello world backwards").unwrap();
        assert_eq!(m.pattern, 1);
        assert_eq!(m.trigger, "backwards");
        assert_eq!(m.remainder, "hello world");
    }

    #[test]
    fn other_named_captures_become_fields() {
        let m = echo().matches("coin flip").unwrap();
        assert_eq!(m.field("word"), Some("coin"));
        assert_eq!(m.trigger, "flip");
        assert!(m.remainder.is_empty());
    }

    #[test]
    fn no_match() {
        assert!(echo().matches("nothing to see").is_none());
        assert!(echo().matches("reverse").is_none());
    }

    #[test]
    fn alternation_escapes_literals() {
        let re = compile(&[format!("^({})$", alternation(&["c++", "asp.net"]))]).unwrap();
        assert!(re[0].is_match("c++"));
        assert!(re[0].is_match("asp.net"));
        assert!(!re[0].is_match("aspxnet"));
    }

    #[test]
    fn bad_pattern_is_internal_error() {
        let err = compile(&["(unclosed"]).unwrap_err();
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn quotes_are_stripped_once() {
        assert_eq!(strip_quotes("\"ahh yeah\""), "ahh yeah");
        assert_eq!(strip_quotes("'em'"), "em");
        assert_eq!(strip_quotes("see 'em"), "see 'em");
        assert_eq!(strip_quotes("\"'x'\""), "'x'");
        assert_eq!(strip_quotes("\"hello"), "\"hello");
        assert_eq!(strip_quotes("hello'"), "hello'");
        assert_eq!(strip_quotes("\"mixed'"), "\"mixed'");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn unconfigured_backend_is_external_unavailable() {
        assert_eq!(not_configured("weather").kind(), "external-unavailable");
    }
}
