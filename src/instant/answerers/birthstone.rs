use async_trait::async_trait;
use regex::Regex;

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, prefix_or_suffix, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

const TRIGGERS: &[&str] = &["birthstones", "birth stones", "birthstone", "birth stone"];

/// Birthstones for a month, `january birthstone`.
pub struct Birthstone {
    patterns: Vec<Regex>,
}

impl Birthstone {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(TRIGGERS))?,
        })
    }
}

fn stones(month: &str) -> Option<&'static str> {
    let stones = match month {
        "january" => "Garnet",
        "february" => "Amethyst",
        "march" => "Aquamarine, Bloodstone",
        "april" => "Diamond",
        "may" => "Emerald",
        "june" => "Pearl, Moonstone, Alexandrite",
        "july" => "Ruby",
        "august" => "Peridot, Spinel",
        "september" => "Sapphire",
        "october" => "Opal, Tourmaline",
        "november" => "Topaz, Citrine",
        "december" => "Turquoise, Zircon, Tanzanite",
        _ => return None,
    };
    Some(stones)
}

#[async_trait]
impl Answerer for Birthstone {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Birthstone
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        stones(&m.remainder)
            .map(Solution::text)
            .ok_or_else(|| JiveError::InvalidInput("not a month".into()))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new("January birthstone", Solution::text("Garnet")),
            SelfTest::new("birthstone february", Solution::text("Amethyst")),
            SelfTest::new("march birth stone", Solution::text("Aquamarine, Bloodstone")),
            SelfTest::new("birth stones may", Solution::text("Emerald")),
            SelfTest::new("birthstones June", Solution::text("Pearl, Moonstone, Alexandrite")),
            SelfTest::new("July Birth Stones", Solution::text("Ruby")),
            SelfTest::new("december birthstone", Solution::text("Turquoise, Zircon, Tanzanite")),
        ]
    }
}
