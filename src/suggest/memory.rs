use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Completions, Suggester};
use crate::error::{JiveError, Result};

/// Distinct queries kept by [`MemorySuggester::new`].
pub const DEFAULT_CAPACITY: usize = 100_000;

/// In-process suggestion store holding at most `capacity` distinct queries.
///
/// Storing a new query into a full store first evicts the least searched
/// one (alphabetically last among ties). Eviction scans the whole map.
///
/// Thread-safe via an internal `Mutex`; the lock is never held across an
/// await point.
#[derive(Debug)]
pub struct MemorySuggester {
    counts: Mutex<HashMap<String, u64>>,
    capacity: usize,
}

impl Default for MemorySuggester {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemorySuggester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map_or(0, |counts| counts.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How often `query` has been searched, if it is stored.
    pub fn count(&self, query: &str) -> Option<u64> {
        self.lock().ok()?.get(query).copied()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, u64>>> {
        self.counts
            .lock()
            .map_err(|e| JiveError::Internal(format!("suggestion store poisoned: {e}")))
    }

    /// The counter for `query`, making room for it first if it is new.
    fn slot<'a>(&self, counts: &'a mut HashMap<String, u64>, query: &str) -> &'a mut u64 {
        if !counts.contains_key(query) && counts.len() >= self.capacity {
            let victim = counts
                .iter()
                .min_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(q, _)| q.clone());
            if let Some(victim) = victim {
                counts.remove(&victim);
            }
        }
        counts.entry(query.to_owned()).or_insert(0)
    }
}

#[async_trait]
impl Suggester for MemorySuggester {
    async fn exists(&self, query: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(query))
    }

    async fn insert(&self, query: &str) -> Result<()> {
        let mut counts = self.lock()?;
        self.slot(&mut counts, query);
        Ok(())
    }

    async fn increment(&self, query: &str) -> Result<()> {
        let mut counts = self.lock()?;
        *self.slot(&mut counts, query) += 1;
        Ok(())
    }

    async fn completion(&self, prefix: &str, size: usize) -> Result<Completions> {
        let prefix = prefix.to_lowercase();
        let mut matched: Vec<(String, u64)> = self
            .lock()?
            .iter()
            .filter(|(q, _)| q.starts_with(&prefix))
            .map(|(q, n)| (q.clone(), *n))
            .collect();
        matched.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(Completions {
            suggestions: matched.into_iter().take(size).map(|(q, _)| q).collect(),
        })
    }
}
