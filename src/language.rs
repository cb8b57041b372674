//! Language negotiation.
//!
//! `preferred_languages` come from the `l` parameter followed by the
//! q-weighted `Accept-Language` header. [`LanguageMatcher::best_match`]
//! picks one tag from the supported set by base-language comparison.

/// Languages the front-end can serve when none are configured.
pub const SUPPORTED: &[&str] = &[
    "en", "de", "es", "fr", "it", "ja", "nl", "pl", "pt", "ru", "sv", "zh",
];

/// Region assumed for a language when the request names none.
pub fn likely_region(language: &str) -> &'static str {
    match base(language).as_str() {
        "de" => "DE",
        "es" => "ES",
        "fr" => "FR",
        "it" => "IT",
        "ja" => "JP",
        "nl" => "NL",
        "pl" => "PL",
        "pt" => "BR",
        "ru" => "RU",
        "sv" => "SE",
        "zh" => "CN",
        _ => "US",
    }
}

fn base(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// The region subtag of a tag such as `en-GB`, upper-cased.
pub fn region_subtag(tag: &str) -> Option<String> {
    tag.split(['-', '_'])
        .skip(1)
        .find(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_ascii_uppercase)
}

/// Parse an `Accept-Language` header into tags ordered by descending `q`.
///
/// Entries with equal weight keep header order; `*` and `q=0` entries are
/// dropped.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let q = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (q > 0.0).then(|| (tag.to_owned(), q))
        })
        .collect();

    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// Picks one supported language per request. Read-only after startup.
#[derive(Debug, Clone)]
pub struct LanguageMatcher {
    supported: Vec<String>,
}

impl LanguageMatcher {
    /// `configured` empty means every tag in [`SUPPORTED`]. The first entry
    /// is the fallback.
    pub fn new(configured: &[String]) -> Self {
        let supported = if configured.is_empty() {
            SUPPORTED.iter().map(|s| (*s).to_owned()).collect()
        } else {
            configured.iter().map(|s| base(s)).collect()
        };
        Self { supported }
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    /// First supported tag whose base language appears in `preferred`.
    pub fn best_match(&self, preferred: &[String]) -> String {
        preferred
            .iter()
            .map(|tag| base(tag))
            .find_map(|b| self.supported.iter().find(|s| **s == b).cloned())
            .or_else(|| self.supported.first().cloned())
            .unwrap_or_else(|| "en".to_owned())
    }
}

impl Default for LanguageMatcher {
    fn default() -> Self {
        Self::new(&[])
    }
}
