use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, not_configured, Answerer, MatchResult};
use crate::query::QueryContext;

/// States and territories with their postal codes.
const STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
    ("American Samoa", "AS"),
    ("District of Columbia", "DC"),
    ("Guam", "GU"),
    ("Northern Mariana Islands", "MP"),
    ("Puerto Rico", "PR"),
    ("Virgin Islands", "VI"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLocation {
    pub short: String,
    pub state: String,
}

impl StateLocation {
    /// A state by name or postal code, ignoring case.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        STATES
            .iter()
            .find(|(name, code)| name.eq_ignore_ascii_case(input) || code.eq_ignore_ascii_case(input))
            .map(|&(name, code)| Self {
                short: code.to_owned(),
                state: name.to_owned(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub district: u32,
    pub gender: String,
    pub party: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub facebook: String,
    pub next_election: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub location: StateLocation,
    pub role: String,
    pub members: Vec<Member>,
    pub provider: String,
}

#[async_trait]
pub trait CongressFetcher: Send + Sync {
    async fn senators(&self, location: &StateLocation) -> Result<Delegation>;
}

/// `utah senators`, `senator ny`.
pub struct Congress {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn CongressFetcher>>,
}

impl Congress {
    pub fn new(fetcher: Option<Arc<dyn CongressFetcher>>) -> Result<Self> {
        let t = alternation(&["senators", "senator", "senate"]);
        Ok(Self {
            patterns: compile(&[
                format!(r"^(?P<trigger>{t}) (?P<state>.*)$"),
                format!(r"^(?P<state>.*) (?P<trigger>{t})$"),
            ])?,
            fetcher,
        })
    }
}

#[async_trait]
impl Answerer for Congress {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Congress
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let location = m
            .field("state")
            .and_then(StateLocation::parse)
            .ok_or_else(|| JiveError::InvalidInput("invalid state".into()))?;
        let fetcher = self.fetcher.as_ref().ok_or_else(|| not_configured("congress"))?;
        Ok(Solution::Congress(fetcher.senators(&location).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_by_name_or_code() {
        let utah = StateLocation::parse("utah").unwrap();
        assert_eq!((utah.short.as_str(), utah.state.as_str()), ("UT", "Utah"));
        assert_eq!(StateLocation::parse("ny").unwrap().state, "New York");
        assert_eq!(StateLocation::parse("district of columbia").unwrap().short, "DC");
        assert!(StateLocation::parse("atlantis").is_none());
    }

    struct Utah;

    #[async_trait]
    impl CongressFetcher for Utah {
        async fn senators(&self, location: &StateLocation) -> Result<Delegation> {
            Ok(Delegation {
                location: location.clone(),
                role: "Senators".into(),
                members: vec![Member {
                    name: "Mike Lee".into(),
                    district: 0,
                    gender: "M".into(),
                    party: "R".into(),
                    twitter: "SenMikeLee".into(),
                    facebook: "senatormikelee".into(),
                    next_election: 2022,
                }],
                provider: "ProPublica".into(),
            })
        }
    }

    #[tokio::test]
    async fn senators_for_state() {
        let c = Congress::new(Some(Arc::new(Utah))).unwrap();
        let m = c.matches("utah senators").unwrap();
        let Solution::Congress(d) = c.solve(&m, &QueryContext::new("")).await.unwrap() else {
            panic!("expected a delegation");
        };
        assert_eq!(d.location.short, "UT");
        assert_eq!(d.members[0].name, "Mike Lee");

        let m = c.matches("senate hearings today").unwrap();
        let err = c.solve(&m, &QueryContext::new("")).await.unwrap_err();
        assert_eq!(err.kind(), "invalid-input");
    }
}
