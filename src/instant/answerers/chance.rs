//! Answers that pick at random. Neither is ever cached.

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;

use crate::error::Result;
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, prefix_or_suffix, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

const DEFAULT_RANGE: (i64, i64) = (1, 100);

pub struct CoinToss {
    patterns: Vec<Regex>,
}

impl CoinToss {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: compile(&[format!(
                "^(?P<trigger>{})$",
                alternation(&["flip a coin", "heads or tails", "coin toss"])
            )])?,
        })
    }
}

#[async_trait]
impl Answerer for CoinToss {
    fn kind(&self) -> AnswerKind {
        AnswerKind::CoinToss
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, _m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let side = if rand::thread_rng().gen_bool(0.5) {
            "Heads"
        } else {
            "Tails"
        };
        Ok(Solution::text(side))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        ["flip a coin", "heads or tails", "Coin Toss"]
            .into_iter()
            .map(|q| SelfTest::any_of(q, vec![Solution::text("Heads"), Solution::text("Tails")]))
            .collect()
    }
}

/// A uniform integer in the inclusive range named by the first two
/// integers of the remainder, `[1, 100]` when there are none.
pub struct RandomNumber {
    patterns: Vec<Regex>,
    bounds: Regex,
}

impl RandomNumber {
    pub fn new() -> Result<Self> {
        let mut bounds = compile(&[r"(?P<min>-?\d+).*?(?P<max>-?\d+)"])?;
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&["random number between", "random number"]))?,
            bounds: bounds.remove(0),
        })
    }

    fn range(&self, remainder: &str) -> (i64, i64) {
        let Some(caps) = self.bounds.captures(remainder) else {
            return DEFAULT_RANGE;
        };
        let parse = |name: &str| caps.name(name).and_then(|c| c.as_str().parse::<i64>().ok());
        match (parse("min"), parse("max")) {
            (Some(a), Some(b)) if a <= b => (a, b),
            (Some(a), Some(b)) => (b, a),
            _ => DEFAULT_RANGE,
        }
    }
}

#[async_trait]
impl Answerer for RandomNumber {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Random
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let (min, max) = self.range(&m.remainder);
        let n = rand::thread_rng().gen_range(min..=max);
        Ok(Solution::Text(n.to_string()))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        let texts = |range: std::ops::RangeInclusive<i64>| {
            range.map(|n| Solution::Text(n.to_string())).collect()
        };
        vec![
            SelfTest::any_of("random number between -18 and -21", texts(-21..=-18)),
            SelfTest::any_of("random number 3 5", texts(3..=5)),
            SelfTest::any_of("random number between 0 and 1", texts(0..=1)),
        ]
    }
}
