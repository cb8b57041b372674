//! Core types for organic documents, image records, and result pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of page anchors shown under a result page.
pub const MAX_ANCHORS: usize = 10;

/// A single organic result returned by an [`crate::engine::OrganicEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Canonical URL of the page.
    pub url: String,
    /// Page title, truncated to 60 characters before display.
    pub title: String,
    /// Snippet or meta description, truncated to 215 characters before display.
    pub description: String,
    /// Language of the page, when the backend knows it.
    #[serde(default)]
    pub language: String,
    /// When the backend indexed the page.
    #[serde(default, rename = "index_timestamp", skip_serializing_if = "Option::is_none")]
    pub indexed: Option<DateTime<Utc>>,
}

/// An image record returned by an [`crate::engine::ImageEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Source URL of the image (the index uses it as the document id).
    #[serde(rename = "id")]
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alt: String,
    /// Classifier score in `[0, 1]`; higher is less safe.
    #[serde(default)]
    pub nsfw_score: f64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime: String,
    /// Date the image was last crawled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled: Option<String>,
    /// Thumbnail bytes fetched through the image proxy, base64 encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

/// Page navigation attached to organic and image result pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub last: usize,
    /// Up to [`MAX_ANCHORS`] page numbers to link to.
    pub anchors: Vec<usize>,
}

impl Pagination {
    /// Build navigation for `count` total hits shown `number` per page.
    ///
    /// `last` is `ceil(count / number)`. Once the user is past page 6 the
    /// anchor window starts five pages back.
    pub fn new(count: u64, number: usize, page: usize) -> Self {
        let number = number.max(1) as u64;
        let last = count.div_ceil(number) as usize;
        let previous = (page > 1).then(|| page - 1);

        let current = page.min(last);
        let next = (last > current).then(|| current + 1);
        let first = if current > 6 { current - 5 } else { 1 };

        Self {
            page,
            previous,
            next,
            last,
            anchors: (first..=last).take(MAX_ANCHORS).collect(),
        }
    }
}

/// One page of organic results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// Total hits reported by the backend (may be an estimate).
    pub count: u64,
    #[serde(default)]
    pub pagination: Pagination,
    pub documents: Vec<Document>,
}

/// One page of image results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResults {
    pub count: u64,
    #[serde(default)]
    pub pagination: Pagination,
    pub images: Vec<Image>,
}

/// Content filter requested by the caller (`f` parameter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Off,
    #[default]
    Moderate,
    Strict,
}

impl Filter {
    /// Parse the `f` parameter; anything unrecognised is [`Filter::Moderate`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Self::Off,
            "strict" => Self::Strict,
            _ => Self::Moderate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Moderate => "moderate",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_first_page() {
        let p = Pagination::new(250, 25, 1);
        assert_eq!(p.page, 1);
        assert_eq!(p.previous, None);
        assert_eq!(p.next, Some(2));
        assert_eq!(p.last, 10);
        assert_eq!(p.anchors, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn pagination_rounds_last_page_up() {
        let p = Pagination::new(26, 25, 1);
        assert_eq!(p.last, 2);
        assert_eq!(p.anchors, vec![1, 2]);
    }

    #[test]
    fn pagination_window_moves_after_page_six() {
        let p = Pagination::new(1000, 10, 8);
        assert_eq!(p.previous, Some(7));
        assert_eq!(p.next, Some(9));
        assert_eq!(p.anchors, (3..=12).collect::<Vec<_>>());
    }

    #[test]
    fn pagination_last_page_has_no_next() {
        let p = Pagination::new(100, 25, 4);
        assert_eq!(p.next, None);
        assert_eq!(p.previous, Some(3));
    }

    #[test]
    fn pagination_page_past_end_is_clamped_for_next() {
        let p = Pagination::new(30, 10, 9);
        assert_eq!(p.last, 3);
        assert_eq!(p.next, None);
        assert_eq!(p.anchors, vec![1, 2, 3]);
    }

    #[test]
    fn pagination_no_results() {
        let p = Pagination::new(0, 25, 1);
        assert_eq!(p.last, 0);
        assert_eq!(p.next, None);
        assert!(p.anchors.is_empty());
    }

    #[test]
    fn pagination_zero_number_does_not_divide_by_zero() {
        let p = Pagination::new(3, 0, 1);
        assert_eq!(p.last, 3);
    }

    #[test]
    fn filter_parse() {
        assert_eq!(Filter::parse("off"), Filter::Off);
        assert_eq!(Filter::parse("STRICT"), Filter::Strict);
        assert_eq!(Filter::parse("moderate"), Filter::Moderate);
        assert_eq!(Filter::parse("bogus"), Filter::Moderate);
        assert_eq!(Filter::Strict.to_string(), "strict");
    }

    #[test]
    fn image_uses_id_for_url_on_the_wire() {
        let json = r#"{"id":"https://example.com/a.jpg","domain":"example.com","nsfw_score":0.2}"#;
        let img: Image = serde_json::from_str(json).expect("deserialize");
        assert_eq!(img.url, "https://example.com/a.jpg");
        assert_eq!(img.width, 0);
        assert!(img.base64.is_none());

        let back = serde_json::to_value(&img).expect("serialize");
        assert_eq!(back["id"], "https://example.com/a.jpg");
        assert!(back.get("base64").is_none());
    }

    #[test]
    fn document_timestamp_is_optional() {
        let json = r#"{"url":"https://a.com","title":"A","description":"d"}"#;
        let doc: Document = serde_json::from_str(json).expect("deserialize");
        assert!(doc.indexed.is_none());
        assert!(doc.language.is_empty());
    }
}
