//! Organic result pages: offset, fetch, dedup, truncate, paginate.

use crate::engine::{OrganicEngine, OrganicQuery};
use crate::error::SearchError;
use crate::types::{Pagination, Results};

use super::dedup::dedup_documents;
use super::truncate::truncate;

/// Longest title shown on a result page.
pub const TITLE_MAX: usize = 60;

/// Longest description shown on a result page.
pub const DESCRIPTION_MAX: usize = 215;

/// Zero-based offset of the first result on `page` (1-based).
pub fn offset_for(page: usize, number: usize) -> usize {
    page.saturating_sub(1).saturating_mul(number)
}

/// Fetch and post-process one page of organic results.
///
/// # Pipeline
///
/// 1. `offset = (page - 1) * number`
/// 2. Query the engine
/// 3. Drop duplicate URLs (first occurrence wins)
/// 4. Truncate titles to [`TITLE_MAX`] and descriptions to
///    [`DESCRIPTION_MAX`] on word boundaries
/// 5. Attach [`Pagination`]
///
/// # Errors
///
/// Propagates the engine's [`SearchError`].
pub async fn search_page(
    engine: &dyn OrganicEngine,
    mut query: OrganicQuery,
    page: usize,
) -> Result<Results, SearchError> {
    let page = page.max(1);
    query.offset = offset_for(page, query.number);

    tracing::trace!(query = %query.query, offset = query.offset, "organic fetch");
    let mut results = engine.fetch(&query).await?;
    tracing::debug!(
        engine = engine.name(),
        count = results.documents.len(),
        "organic engine returned results"
    );

    results.documents = dedup_documents(results.documents)
        .into_iter()
        .map(|mut doc| {
            doc.title = truncate(&doc.title, TITLE_MAX, true);
            doc.description = truncate(&doc.description, DESCRIPTION_MAX, true);
            doc
        })
        .collect();
    results.pagination = Pagination::new(results.count, query.number, page);

    Ok(results)
}
