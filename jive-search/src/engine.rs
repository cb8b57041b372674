//! Trait definitions for pluggable organic and image backends.
//!
//! The organic index is a black box: any backend that can turn a query
//! plus an offset into a page of [`Document`](crate::types::Document)s
//! implements [`OrganicEngine`]. Image backends implement [`ImageEngine`].
//! Both are used as `Arc<dyn ...>` by the orchestrator.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{Filter, ImageResults, Results};

/// Parameters for one organic fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganicQuery {
    /// Query with any shortcut markers removed; not lower-cased.
    pub query: String,
    /// Resolved BCP-47 language tag, e.g. `en-US`.
    pub language: String,
    /// Two-letter region code, e.g. `US`.
    pub region: String,
    /// Results per page.
    pub number: usize,
    /// Zero-based index of the first wanted result.
    pub offset: usize,
    pub safe: bool,
    pub filter: Filter,
}

/// An organic web-search backend.
///
/// Implementations own URL construction, the HTTP request and response
/// parsing. They return an unpaginated [`Results`]; pagination and
/// truncation happen in [`crate::pipeline::search`].
#[async_trait]
pub trait OrganicEngine: Send + Sync {
    /// Fetch one page of organic results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, times out, or the
    /// response cannot be parsed.
    async fn fetch(&self, query: &OrganicQuery) -> Result<Results, SearchError>;

    /// Short backend name used in logs.
    fn name(&self) -> &'static str;
}

/// An image-search backend.
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Fetch `number` images starting at `offset`.
    ///
    /// With `safe` on, backends should only return records under their NSFW
    /// threshold; [`crate::pipeline::images`] filters again regardless.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the backend is unreachable or answers
    /// with something that is not an image page.
    async fn fetch(
        &self,
        query: &str,
        safe: bool,
        number: usize,
        offset: usize,
    ) -> Result<ImageResults, SearchError>;

    fn name(&self) -> &'static str;
}
