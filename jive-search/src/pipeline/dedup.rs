//! Duplicate-URL removal for organic result pages.
//!
//! Backends occasionally return the same page twice (tracking parameters,
//! trailing slashes, `http` vs `https` ports). Order is the backend's
//! ranking, so the first occurrence wins.

use std::collections::HashSet;

use url::Url;

use crate::types::Document;

/// Query parameters that never change which page is served.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "msclkid",
];

/// Comparison key for a result URL.
///
/// Drops the fragment, default ports, tracking parameters and a trailing
/// slash, and sorts the remaining query pairs. Unparseable input is
/// compared verbatim.
///
/// ```
/// use jive_search::pipeline::dedup::comparison_key;
///
/// assert_eq!(
///     comparison_key("https://Example.com:443/a/?utm_source=x&b=2&a=1#top"),
///     comparison_key("https://example.com/a?a=1&b=2"),
/// );
/// ```
pub fn comparison_key(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_owned();
    };

    parsed.set_fragment(None);

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.to_ascii_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let path = parsed.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    // Url::parse already dropped default ports and lower-cased the host.
    parsed.to_string()
}

/// Remove documents whose URL was already seen, keeping backend order.
pub fn dedup_documents(documents: Vec<Document>) -> Vec<Document> {
    let mut seen = HashSet::with_capacity(documents.len());
    documents
        .into_iter()
        .filter(|doc| seen.insert(comparison_key(&doc.url)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(url: &str, title: &str) -> Document {
        Document {
            url: url.into(),
            title: title.into(),
            description: String::new(),
            language: String::new(),
            indexed: None,
        }
    }

    #[test]
    fn key_ignores_fragment_and_tracking() {
        assert_eq!(
            comparison_key("https://rust-lang.org/learn?utm_campaign=x#intro"),
            comparison_key("https://rust-lang.org/learn"),
        );
    }

    #[test]
    fn key_keeps_meaningful_params() {
        assert_ne!(
            comparison_key("https://example.com/search?q=a"),
            comparison_key("https://example.com/search?q=b"),
        );
    }

    #[test]
    fn key_keeps_root_slash() {
        assert_eq!(comparison_key("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn key_passes_through_garbage() {
        assert_eq!(comparison_key("not a url"), "not a url");
    }

    #[test]
    fn first_occurrence_wins_and_order_is_kept() {
        let docs = vec![
            doc("https://a.com/", "A1"),
            doc("https://b.com/page", "B"),
            doc("https://a.com/?utm_source=feed", "A2"),
            doc("https://c.com", "C"),
            doc("https://b.com/page/", "B2"),
        ];
        let out = dedup_documents(docs);
        let titles: Vec<&str> = out.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["A1", "B", "C"]);
    }

    #[test]
    fn empty_input() {
        assert!(dedup_documents(vec![]).is_empty());
    }
}
