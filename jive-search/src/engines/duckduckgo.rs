//! DuckDuckGo organic backend.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and is tolerant of automated requests.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::config::SearchConfig;
use crate::engine::{OrganicEngine, OrganicQuery};
use crate::error::SearchError;
use crate::http;
use crate::types::{Document, Results};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo HTML scraper.
///
/// The endpoint has no result count, so [`Results::count`] is an
/// estimate: a full page implies at least one more page.
#[derive(Debug, Clone)]
pub struct DuckDuckGoEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoEngine {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::with_endpoint(config, DEFAULT_ENDPOINT)
    }

    /// Point the engine at another endpoint (a mirror, or a mock server).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn with_endpoint(config: &SearchConfig, endpoint: &str) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

/// `kl` region code, e.g. `us-en`.
fn region_param(query: &OrganicQuery) -> String {
    let lang = query
        .language
        .split(['-', '_'])
        .next()
        .unwrap_or("en")
        .to_ascii_lowercase();
    format!("{}-{lang}", query.region.to_ascii_lowercase())
}

#[async_trait]
impl OrganicEngine for DuckDuckGoEngine {
    async fn fetch(&self, query: &OrganicQuery) -> Result<Results, SearchError> {
        tracing::trace!(query = %query.query, offset = query.offset, "DuckDuckGo search");

        let offset = query.offset.to_string();
        let kl = region_param(query);
        let mut params = vec![("q", query.query.as_str()), ("kl", kl.as_str())];
        if query.offset > 0 {
            params.push(("s", offset.as_str()));
        }
        params.push(("kp", if query.safe { "1" } else { "-2" }));

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .header("Accept-Language", format!("{},en;q=0.9", query.language))
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("DuckDuckGo request failed", e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("DuckDuckGo HTTP error: {e}")))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("DuckDuckGo response read failed", e))?;

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

        let documents = parse_duckduckgo_html(&html, query.number, &query.language)?;
        let seen = query.offset.saturating_add(documents.len()) as u64;
        let count = if documents.len() >= query.number {
            seen.saturating_add(query.number as u64)
        } else {
            seen
        };

        Ok(Results {
            count,
            documents,
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Parse a DuckDuckGo HTML page into documents, skipping ads.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
    language: &str,
) -> Result<Vec<Document>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el
            .value()
            .attr("href")
            .and_then(DuckDuckGoEngine::extract_url)
        else {
            continue;
        };

        let description = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(Document {
            url,
            title,
            description,
            language: language.to_owned(),
            indexed: None,
        });

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
