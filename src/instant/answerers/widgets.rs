//! Converter and form widgets. The browser does the arithmetic; the answer
//! only tells the page which widget to draw.

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, Answerer, MatchResult, SelfTest};
use crate::query::QueryContext;

/// A widget with a fixed solution.
pub struct Widget {
    kind: AnswerKind,
    solution: &'static str,
    patterns: Vec<Regex>,
    tests: &'static [&'static str],
}

/// `<units> to <units>` as prefix or suffix of the query.
fn conversion(from: &str, to: &str) -> Result<Vec<Regex>> {
    let t = format!(r"[0-9 .]*?(?:{from}) to [0-9 .]*?(?:{to})");
    compile(&[
        format!(r"^(?P<trigger>{t})(?P<remainder>.*)$"),
        format!(r"^(?P<remainder>.*?)(?P<trigger>{t})$"),
    ])
}

/// Literal units, each with an optional plural `s` and a word boundary.
fn units(list: &[&str]) -> String {
    list.iter()
        .map(|u| format!(r"{}s?\b", regex::escape(u)))
        .collect::<Vec<_>>()
        .join("|")
}

const STORAGE_UNITS: &[&str] = &[
    "bit", "byte", "kilobit", "kibibit", "kilobyte", "kibibyte", "megabit", "mebibit", "megabyte",
    "mebibyte", "gigabit", "gibibit", "gigabyte", "gibibyte", "terabit", "tebibit", "terabyte",
    "tebibyte", "petabit", "pebibit", "petabyte", "pebibyte", "kb", "kbit", "kibit", "kib", "mb",
    "mbit", "mibit", "mib", "gb", "gbit", "gibit", "gib", "tb", "tbit", "tibit", "tib", "pb",
    "pbit", "pibit", "pib",
];

const LENGTH_UNITS: &[&str] = &[
    "mile", "yard", "foot", "feet", "inch", "nautical mile", "ft", "in", "centimeter",
    "millimeter", "micrometer", "nanometer", "meter", "kilometer", "centimetre", "millimetre",
    "micrometre", "nanometre", "metre", "kilometre", "cm", "mm", "nm", "km",
];

const SPEED_UNITS: &[&str] = &["mile", "foot", "feet", "ft", "kilometer", "km", "meter", "knot", "mach"];

const SPEED_RATES: &[&str] = &["s", "hr", "second", "hour"];

const POWER_UNITS: &[&str] = &[
    "watt", "kilowatt", "megawatt", "gigawatt", "terawatt", "petawatt", "exawatt", "horsepower",
    "hp",
];

const TEMPERATURE_UNITS: &[&str] = &["celsius", "c", "fahrenheit", "f"];

impl Widget {
    fn new(
        kind: AnswerKind,
        solution: &'static str,
        patterns: Vec<Regex>,
        tests: &'static [&'static str],
    ) -> Self {
        Self {
            kind,
            solution,
            patterns,
            tests,
        }
    }

    /// `convert`, or `50gb to mb`.
    pub fn digital_storage() -> Result<Self> {
        let u = units(STORAGE_UNITS);
        let mut patterns = compile(&[r"^(?P<trigger>convert|converter)$"])?;
        patterns.extend(conversion(&u, &u)?);
        Ok(Self::new(
            AnswerKind::DigitalStorage,
            "digital storage",
            patterns,
            &[
                "convert",
                "convert 1mb to pbs",
                "50gb to mb converter",
                "gb to mb",
                "petabytes to megabit",
                "50gbs to mbs",
            ],
        ))
    }

    /// `10 meters to foot`. A bare `m` is accepted only as the target unit.
    pub fn length() -> Result<Self> {
        let u = units(LENGTH_UNITS);
        Ok(Self::new(
            AnswerKind::Length,
            "length",
            conversion(&u, &format!(r"{u}|m\b"))?,
            &["ins to cms", "convert 1 meter to feet", "10 meters to foot", "cm to m", "nm to feets"],
        ))
    }

    /// `mph to kmh`, `miles per hour to feet per second`.
    pub fn speed() -> Result<Self> {
        let mut list = Vec::new();
        for unit in SPEED_UNITS {
            for rate in SPEED_RATES {
                list.push(format!(r"{unit}s? per {rate}\b"));
                list.push(format!(r"{unit}s?/{rate}\b"));
            }
        }
        list.push("mph".into());
        list.push("kmh".into());
        let u = list.join("|");
        Ok(Self::new(
            AnswerKind::Speed,
            "speed",
            conversion(&u, &u)?,
            &["mph to kmh", "miles per hour to feet per second"],
        ))
    }

    pub fn power() -> Result<Self> {
        let u = units(POWER_UNITS);
        Ok(Self::new(
            AnswerKind::Power,
            "power",
            conversion(&u, &u)?,
            &["horsepower to watt", "megawatt to kilowatt", "terawatt to hp"],
        ))
    }

    /// `17 degrees c to f`, or a bare `temperature converter`.
    pub fn temperature() -> Result<Self> {
        let u = units(TEMPERATURE_UNITS);
        let mut patterns = compile(&[format!(
            "^(?P<trigger>{})$",
            alternation(&["temperature converter", "temperature", "temp"])
        )])?;
        patterns.extend(conversion(&u, &u)?);
        Ok(Self::new(
            AnswerKind::Temperature,
            "temperature",
            patterns,
            &[
                "temperature",
                "temperature converter",
                "17 degrees c to f",
                "79.9 f to c",
                "107.9 fahrenheit to celsius",
                "-9.3 celsius to fahrenheit",
            ],
        ))
    }

    /// `minify javascript`, `css prettifier`.
    pub fn minify() -> Result<Self> {
        let t = alternation(&["minify", "minifier", "pretty", "prettifier", "prettify"]);
        Ok(Self::new(
            AnswerKind::Minify,
            "",
            compile(&[
                format!(r"^(?P<trigger>{t})$"),
                format!(r"^(?P<trigger>{t}) (?P<remainder>.*)$"),
                format!(r"^(?P<remainder>.*) (?P<trigger>{t})$"),
            ])?,
            &["minify javascript", "pretty", "css prettifier"],
        ))
    }

    pub fn mortgage_calculator() -> Result<Self> {
        let t = alternation(&[
            "mortgage calculator",
            "calculate mortgage",
            "mortgage payments",
            "mortgage",
        ]);
        Ok(Self::new(
            AnswerKind::MortgageCalculator,
            "",
            compile(&[format!(r"^(?P<trigger>{t})$")])?,
            &["mortgage calculator", "mortgage"],
        ))
    }
}

#[async_trait]
impl Answerer for Widget {
    fn kind(&self) -> AnswerKind {
        self.kind
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, _m: &MatchResult, _ctx: &QueryContext) -> Result<Solution> {
        Ok(Solution::text(self.solution))
    }

    fn self_tests(&self) -> Vec<SelfTest> {
        self.tests
            .iter()
            .map(|q| SelfTest::new(q, Solution::text(self.solution)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_need_units_on_both_sides() {
        let length = Widget::length().unwrap();
        assert!(length.matches("10 meters to foot").is_some());
        assert!(length.matches("how to tie a tie").is_none());
        assert!(length.matches("meters").is_none());

        let temperature = Widget::temperature().unwrap();
        assert!(temperature.matches("fred astaire").is_none());
        assert!(temperature.matches("go to france").is_none());
        assert!(temperature.matches("c to fix").is_none());
    }

    #[test]
    fn units_match_whole_words() {
        let power = Widget::power().unwrap();
        assert!(power.matches("hp to watts").is_some());
        assert!(power.matches("hp to wattage").is_none());
    }

    #[test]
    fn storage_converter_bare_trigger() {
        let ds = Widget::digital_storage().unwrap();
        let m = ds.matches("converter").unwrap();
        assert_eq!(m.pattern, 0);
    }
}
