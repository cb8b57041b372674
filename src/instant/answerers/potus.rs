use async_trait::async_trait;
use regex::Regex;

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, prefix_or_suffix, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

/// Presidents in order of office. Cleveland appears twice.
const PRESIDENTS: &[&str] = &[
    "George Washington",
    "John Adams",
    "Thomas Jefferson",
    "James Madison",
    "James Monroe",
    "John Quincy Adams",
    "Andrew Jackson",
    "Martin Van Buren",
    "William Henry Harrison",
    "John Tyler",
    "James K. Polk",
    "Zachary Taylor",
    "Millard Fillmore",
    "Franklin Pierce",
    "James Buchanan",
    "Abraham Lincoln",
    "Andrew Johnson",
    "Ulysses S. Grant",
    "Rutherford B. Hayes",
    "James A. Garfield",
    "Chester A. Arthur",
    "Grover Cleveland",
    "Benjamin Harrison",
    "Grover Cleveland",
    "William McKinley",
    "Theodore Roosevelt",
    "William Howard Taft",
    "Woodrow Wilson",
    "Warren G. Harding",
    "Calvin Coolidge",
    "Herbert Hoover",
    "Franklin D. Roosevelt",
    "Harry S. Truman",
    "Dwight D. Eisenhower",
    "John F. Kennedy",
    "Lyndon B. Johnson",
    "Richard Nixon",
    "Gerald Ford",
    "Jimmy Carter",
    "Ronald Reagan",
    "George H. W. Bush",
    "Bill Clinton",
    "George W. Bush",
    "Barack Obama",
    "Donald Trump",
    "Joe Biden",
    "Donald Trump",
];

/// `current potus`, `16th president of the united states`.
pub struct Potus {
    patterns: Vec<Regex>,
    ordinal: Regex,
}

impl Potus {
    pub fn new() -> Result<Self> {
        let mut ordinal = compile(&["[0-9]+"])?;
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&["president of the united states", "potus"]))?,
            ordinal: ordinal.remove(0),
        })
    }

    /// 1-based term number; zero or absent means the sitting president.
    pub fn president(n: usize) -> Option<&'static str> {
        match n {
            0 => PRESIDENTS.last().copied(),
            n => PRESIDENTS.get(n - 1).copied(),
        }
    }
}

#[async_trait]
impl Answerer for Potus {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Potus
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, ctx: &QueryContext) -> Result<Solution> {
        if ctx.normalized.contains("vice") {
            return Err(JiveError::InvalidInput("vice presidents are not listed".into()));
        }
        let n = match self.ordinal.find(&m.remainder) {
            Some(num) => num
                .as_str()
                .parse::<usize>()
                .map_err(|_| JiveError::InvalidInput("ordinal out of range".into()))?,
            None => 0,
        };
        Self::president(n)
            .map(Solution::text)
            .ok_or_else(|| JiveError::InvalidInput(format!("no president number {n}")))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        let mut tests = vec![
            SelfTest::new("current POTUS", Solution::text("Donald Trump")),
            SelfTest::new("46th POTUS", Solution::text("Joe Biden")),
        ];
        for (i, name) in PRESIDENTS.iter().enumerate() {
            let n = i + 1;
            tests.push(SelfTest::new(
                &format!("{n}st president of the united states"),
                Solution::text(*name),
            ));
            tests.push(SelfTest::new(&format!("who was the {n}nd POTUS"), Solution::text(*name)));
        }
        tests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        assert_eq!(Potus::president(1), Some("George Washington"));
        assert_eq!(Potus::president(22), Potus::president(24));
        assert_eq!(Potus::president(0), Potus::president(PRESIDENTS.len()));
        assert_eq!(Potus::president(PRESIDENTS.len() + 1), None);
    }

    #[tokio::test]
    async fn vice_presidents_get_no_answer() {
        let p = Potus::new().unwrap();
        let ctx = QueryContext::new("32nd vice potus");
        let m = p.matches(&ctx.normalized).unwrap();
        assert!(p.solve(&m, &ctx).await.is_err());
    }

    #[tokio::test]
    async fn out_of_range() {
        let p = Potus::new().unwrap();
        let ctx = QueryContext::new("99th potus");
        let m = p.matches(&ctx.normalized).unwrap();
        assert_eq!(p.solve(&m, &ctx).await.unwrap_err().kind(), "invalid-input");
    }
}
