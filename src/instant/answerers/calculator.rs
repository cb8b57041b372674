//! Arithmetic formulas and the calculator widget.

use async_trait::async_trait;
use regex::Regex;

use crate::error::{JiveError, Result};
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

const TRIGGERS: &[&str] = &[
    "calculator",
    "calculate",
    "compute",
    "formula",
    "solve",
    "add",
    "subtract",
    "multiply",
    "divide",
];

/// Characters a formula may contain.
const FORMULA: &str = r"[\s0-9\.\^+\-*/\(\)]*";

/// Operators a formula must contain at least one of. Without this a bare
/// tracking number would be "solved" here.
const OPERATORS: &[char] = &['+', '-', '/', '*', '^'];

/// Deepest nesting of parentheses, signs and exponents we evaluate.
const MAX_DEPTH: usize = 128;

pub struct Calculator {
    patterns: Vec<Regex>,
}

impl Calculator {
    pub fn new() -> Result<Self> {
        let t = alternation(TRIGGERS);
        Ok(Self {
            patterns: compile(&[
                format!(r"^(?P<trigger>{t})$"),
                format!(r"^(?P<trigger>{t})?(?P<remainder>{FORMULA})$"),
                format!(r"^(?P<remainder>{FORMULA})(?P<trigger>{t})?$"),
            ])?,
        })
    }
}

#[async_trait]
impl Answerer for Calculator {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Calculator
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        if m.pattern == 0 {
            return Ok(Solution::empty());
        }
        let formula = m.remainder.trim();
        if !formula.contains(OPERATORS) {
            return Err(JiveError::InvalidInput("not a formula".into()));
        }
        evaluate(formula).map(Solution::Number)
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        vec![
            SelfTest::new("calculator", Solution::empty()),
            SelfTest::new("calculate 2+2", Solution::Number(4.0)),
            SelfTest::new("(2+2)*3+6.3", Solution::Number(18.3)),
            SelfTest::new("(2+2)*3/6.4 compute", Solution::Number(1.875)),
        ]
    }
}

/// Evaluate `+ - * / ^`, parentheses and unary minus. `^` is
/// right-associative and binds tighter than unary minus.
pub fn evaluate(formula: &str) -> Result<f64> {
    let mut parser = Parser {
        chars: formula.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.chars.len() {
        return Err(JiveError::InvalidInput("trailing input in formula".into()));
    }
    if !value.is_finite() {
        return Err(JiveError::InvalidInput("formula is not finite".into()));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') {
                value *= self.unary()?;
            } else if self.eat('/') {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err(JiveError::InvalidInput("division by zero".into()));
                }
                value /= divisor;
            } else {
                return Ok(value);
            }
        }
    }

    /// Every recursive path passes through here, so this is where
    /// nesting is bounded.
    fn unary(&mut self) -> Result<f64> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(JiveError::InvalidInput("formula nested too deeply".into()));
        }
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64> {
        if self.eat('-') {
            return Ok(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64> {
        let base = self.primary()?;
        if self.eat('^') {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64> {
        if self.eat('(') {
            let value = self.expr()?;
            if !self.eat(')') {
                return Err(JiveError::InvalidInput("unbalanced parentheses".into()));
            }
            return Ok(value);
        }

        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(JiveError::InvalidInput("expected a number".into()));
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .parse::<f64>()
            .map_err(|_| JiveError::InvalidInput("malformed number".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
        assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
        assert_eq!(evaluate("2^3^2").unwrap(), 512.0);
        assert_eq!(evaluate("-2^2").unwrap(), -4.0);
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(evaluate("8/4/2").unwrap(), 1.0);
        assert_eq!(evaluate("-(1+2)").unwrap(), -3.0);
    }

    #[test]
    fn malformed_formulas_are_invalid_input() {
        for f in ["(1+2", "1+", "1..2+3", "4/0", "()", "2*(3))"] {
            let err = evaluate(f).unwrap_err();
            assert_eq!(err.kind(), "invalid-input", "{f}");
        }
    }

    #[test]
    fn deep_nesting_is_refused() {
        let parens = format!("{}1+1", "(".repeat(30_000));
        let signs = format!("{}1", "-".repeat(30_000));
        let powers = format!("1{}", "^1".repeat(30_000));
        for f in [parens, signs, powers] {
            assert_eq!(evaluate(&f).unwrap_err().kind(), "invalid-input");
        }

        let nested = format!("{}1+1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluate(&nested).unwrap(), 2.0);
    }

    #[tokio::test]
    async fn numbers_without_operators_fall_through() {
        let c = Calculator::new().unwrap();
        let m = c.matches("123456789012").unwrap();
        assert!(c.solve(&m, &QueryContext::new("123456789012")).await.is_err());
    }

    #[tokio::test]
    async fn bare_trigger_is_the_widget() {
        let c = Calculator::new().unwrap();
        let m = c.matches("calculate").unwrap();
        assert_eq!(
            c.solve(&m, &QueryContext::new("calculate")).await.unwrap(),
            Solution::empty()
        );
    }
}
