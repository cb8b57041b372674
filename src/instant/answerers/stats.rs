use async_trait::async_trait;
use regex::Regex;

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, prefix_or_suffix, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

/// `avg 3 4e6`, `6 3 -5 23 median`, `total -17 3 87`.
pub struct Stats {
    patterns: Vec<Regex>,
    number: Regex,
}

impl Stats {
    pub fn new() -> Result<Self> {
        let mut number = compile(&[r"[-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?"])?;
        Ok(Self {
            patterns: prefix_or_suffix(&alternation(&[
                "avg", "average", "mean", "median", "sum", "total",
            ]))?,
            number: number.remove(0),
        })
    }

    fn numbers(&self, text: &str) -> Vec<f64> {
        self.number
            .find_iter(text)
            .filter_map(|m| m.as_str().parse().ok())
            .collect()
    }
}

fn sum(numbers: &[f64]) -> f64 {
    numbers.iter().sum()
}

fn average(numbers: &[f64]) -> f64 {
    sum(numbers) / numbers.len() as f64
}

fn median(numbers: &mut [f64]) -> f64 {
    numbers.sort_by(f64::total_cmp);
    let middle = numbers.len() / 2;
    if numbers.len() % 2 == 0 {
        (numbers[middle - 1] + numbers[middle]) / 2.0
    } else {
        numbers[middle]
    }
}

#[async_trait]
impl Answerer for Stats {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Stats
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let mut numbers = self.numbers(&m.remainder);
        if numbers.is_empty() {
            return Err(JiveError::InvalidInput("no numbers".into()));
        }
        let (label, value) = match m.trigger.as_str() {
            "avg" | "average" | "mean" => ("Average", average(&numbers)),
            "median" => ("Median", median(&mut numbers)),
            _ => ("Sum", sum(&numbers)),
        };
        // f64's Display is the shortest decimal that round-trips.
        Ok(Solution::Text(format!("{label}: {value}")))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        [
            ("avg 3 4e6", "Average: 2000001.5"),
            ("11 18 -142 Average", "Average: -37.666666666666664"),
            ("6 3 -5 23 Median", "Median: 4.5"),
            ("median 17 12 -18", "Median: 12"),
            ("58 96 -41 sum", "Sum: 113"),
            ("Total -17 3 87 -476", "Sum: -403"),
        ]
        .into_iter()
        .map(|(q, s)| SelfTest::new(q, Solution::text(s)))
        .collect()
    }
}
