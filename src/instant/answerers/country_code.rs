use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, Answerer, MatchResult, SelfTest};
use crate::instant::countries;
use crate::query::QueryContext;

pub const ISO_3166: &str = "ISO 3166-1 alpha-2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountryCodeAnswer {
    pub format: String,
    pub country: String,
    pub solution: String,
}

impl CountryCodeAnswer {
    fn new(country: countries::Country) -> Self {
        Self {
            format: ISO_3166.to_owned(),
            country: country.name.to_owned(),
            solution: country.alpha2.to_owned(),
        }
    }
}

/// `country code denmark` or `iso de`. Names win over codes.
pub struct CountryCode {
    patterns: Vec<Regex>,
}

impl CountryCode {
    pub fn new() -> Result<Self> {
        let t = alternation(&["country code", "iso code", "iso 3166", "iso"]);
        Ok(Self {
            patterns: compile(&[format!(r"^(?P<trigger>{t}) (?P<remainder>.*)$")])?,
        })
    }
}

#[async_trait]
impl Answerer for CountryCode {
    fn kind(&self) -> AnswerKind {
        AnswerKind::CountryCode
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        countries::resolve(&m.remainder)
            .map(|c| Solution::CountryCode(CountryCodeAnswer::new(c)))
            .ok_or_else(|| JiveError::InvalidInput("unknown country".into()))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        let answer = |alpha2: &str| {
            countries::by_alpha2(alpha2)
                .map(|c| Solution::CountryCode(CountryCodeAnswer::new(c)))
                .unwrap_or_else(Solution::empty)
        };
        vec![
            SelfTest::new("country code united states", answer("US")),
            SelfTest::new("iso DE", answer("DE")),
            SelfTest::new("iso code denmark", answer("DK")),
            SelfTest::new("iso 3166 sweden", answer("SE")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn wire_shape() {
        let cc = CountryCode::new().unwrap();
        let m = cc.matches("country code united states").unwrap();
        let s = cc.solve(&m, &QueryContext::new("")).await.unwrap();
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({"Format": "ISO 3166-1 alpha-2", "Country": "United States", "Solution": "US"})
        );
    }

    #[tokio::test]
    async fn unknown_country_is_invalid_input() {
        let cc = CountryCode::new().unwrap();
        let m = cc.matches("iso atlantis").unwrap();
        let err = cc.solve(&m, &QueryContext::new("")).await.unwrap_err();
        assert_eq!(err.kind(), "invalid-input");
    }
}
