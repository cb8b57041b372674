use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{compile, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

/// Widest range we will enumerate.
const MAX_SPAN: u64 = 100_000;

/// Primes in `[start, end]`. A primality check is the range `[n, n]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primes {
    pub start: u64,
    pub end: u64,
    pub primes: Vec<u64>,
}

/// `prime numbers between 1 and 20`, `is 97 prime`.
pub struct Prime {
    patterns: Vec<Regex>,
}

impl Prime {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: compile(&[
                r"^(?P<trigger>prime numbers?|primes?) (?:between|from) (?P<start>\d+) (?:and|to) (?P<end>\d+)$",
                r"^(?P<trigger>is) (?P<start>\d+) (?:a )?prime(?: number)?$",
            ])?,
        })
    }
}

/// Witnesses that make Miller-Rabin exact for every `u64`.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Deterministic Miller-Rabin. Constant time in the magnitude of `n`.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for p in WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for a in WITNESSES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Primes in the inclusive range, low bound first.
pub fn primes_between(a: u64, b: u64) -> Result<Primes> {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    if end - start > MAX_SPAN {
        return Err(JiveError::InvalidInput(format!(
            "range wider than {MAX_SPAN}"
        )));
    }
    Ok(Primes {
        start,
        end,
        primes: (start..=end).filter(|&n| is_prime(n)).collect(),
    })
}

#[async_trait]
impl Answerer for Prime {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Prime
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        let parse = |name: &str| -> Result<u64> {
            m.field(name)
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| JiveError::InvalidInput(format!("{name} is not a number")))
        };
        let start = parse("start")?;
        let end = match m.field("end") {
            Some(_) => parse("end")?,
            None => start,
        };
        // A full span still costs a few hundred milliseconds; keep it off
        // the async workers so the request deadline can fire.
        tokio::task::spawn_blocking(move || primes_between(start, end))
            .await
            .map_err(|e| JiveError::Internal(format!("prime task failed: {e}")))?
            .map(Solution::Primes)
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new(
                "prime numbers between 1 and 20",
                Solution::Primes(Primes {
                    start: 1,
                    end: 20,
                    primes: vec![2, 3, 5, 7, 11, 13, 17, 19],
                }),
            ),
            SelfTest::new(
                "primes from 30 to 10",
                Solution::Primes(Primes {
                    start: 10,
                    end: 30,
                    primes: vec![11, 13, 17, 19, 23, 29],
                }),
            ),
            SelfTest::new(
                "is 97 prime",
                Solution::Primes(Primes {
                    start: 97,
                    end: 97,
                    primes: vec![97],
                }),
            ),
            SelfTest::new(
                "is 91 a prime number",
                Solution::Primes(Primes {
                    start: 91,
                    end: 91,
                    primes: Vec::new(),
                }),
            ),
        ]
    }
}
