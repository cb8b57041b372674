//! Autocomplete: learn queries from page-one searches and complete prefixes.
//!
//! Learning a query that the store has never seen runs the profanity
//! filter first; a refused query is never persisted. Known queries only
//! have their counter bumped.

mod memory;
mod naughty;

pub use memory::MemorySuggester;
pub use naughty::NaughtyFilter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};

/// Autocomplete payload, wrapped in an object rather than a bare array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completions {
    pub suggestions: Vec<String>,
}

/// Storage for learned queries.
#[async_trait]
pub trait Suggester: Send + Sync {
    async fn exists(&self, query: &str) -> Result<bool>;

    /// Store `query` with a zero counter. A no-op if it is already stored.
    async fn insert(&self, query: &str) -> Result<()>;

    async fn increment(&self, query: &str) -> Result<()>;

    /// Up to `size` stored queries starting with `prefix`, most searched
    /// first, ties broken alphabetically.
    async fn completion(&self, prefix: &str, size: usize) -> Result<Completions>;
}

/// Record one search of `query` (already normalized).
///
/// # Errors
///
/// [`JiveError::NaughtyWord`] when a new query hits the deny list, or
/// whatever the store reports.
pub async fn learn(store: &dyn Suggester, filter: &NaughtyFilter, query: &str) -> Result<()> {
    if query.is_empty() {
        return Err(JiveError::InvalidInput("empty query".into()));
    }
    if !store.exists(query).await? {
        if filter.is_naughty(query) {
            return Err(JiveError::NaughtyWord);
        }
        store.insert(query).await?;
    }
    store.increment(query).await
}
