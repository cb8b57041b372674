//! Profanity filter applied before a query is learned.

use std::path::Path;

use regex::{Regex, RegexBuilder};

use crate::error::{JiveError, Result};

const EMBEDDED: &str = include_str!("naughty.txt");

/// Case-insensitive, word-boundary deny list.
#[derive(Debug, Clone)]
pub struct NaughtyFilter {
    pattern: Regex,
    terms: usize,
}

impl NaughtyFilter {
    /// The list compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`JiveError::Config`] if the embedded list is empty.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED)
    }

    /// Load a list from disk: one term per line, `#` starts a comment line.
    ///
    /// # Errors
    ///
    /// Returns [`JiveError::Io`] if the file cannot be read and
    /// [`JiveError::Config`] if it holds no terms.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let filter = Self::parse(&content)?;
        tracing::info!(path = %path.display(), terms = filter.terms, "naughty list loaded");
        Ok(filter)
    }

    /// Parse a list in the on-disk format.
    ///
    /// # Errors
    ///
    /// Returns [`JiveError::Config`] if no terms remain after comments and
    /// blank lines are dropped.
    pub fn parse(list: &str) -> Result<Self> {
        let terms: Vec<String> = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| regex::escape(&line.to_lowercase()))
            .collect();
        if terms.is_empty() {
            return Err(JiveError::Config("no naughty words".into()));
        }

        let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", terms.join("|")))
            .case_insensitive(true)
            .build()
            .map_err(|e| JiveError::Config(format!("naughty list: {e}")))?;
        Ok(Self {
            pattern,
            terms: terms.len(),
        })
    }

    /// True when `query` contains a listed term as a whole word.
    pub fn is_naughty(&self, query: &str) -> bool {
        self.pattern.is_match(query)
    }

    pub fn len(&self) -> usize {
        self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms == 0
    }
}
