//! `!bang` shortcuts: detection, redirect construction and suggestions.
//!
//! The catalog is embedded TOML (see `bangs.toml`) and read-only after
//! startup. Detection runs on the trimmed original query, not the
//! normalized one, so the residual keeps its case.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};

const EMBEDDED: &str = include_str!("bangs.toml");

/// Region key used when the request's region has no template.
const DEFAULT_REGION: &str = "default";

/// Suggested for a bare `!`.
const BARE_SUGGESTIONS: &[&str] = &["g", "a", "b", "reddit", "w"];

/// Offered on the start page when the `b` parameter names nothing known.
const FALLBACK_DEFAULTS: &[&str] = &["g", "b", "a", "yt"];

/// Post-processing applied to the residual query before substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BangFunction {
    /// `bob maRLey` becomes `Bob_Marley`.
    #[serde(rename = "wikipediaCanonical")]
    WikipediaCanonical,
}

impl BangFunction {
    fn apply(&self, q: &str) -> String {
        match self {
            Self::WikipediaCanonical => title_case(&q.to_lowercase()).replace(' ', "_"),
        }
    }
}

/// One registered shortcut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bang {
    pub name: String,
    pub favicon: String,
    pub triggers: Vec<String>,
    /// Lower-cased region (or `default`) to redirect template.
    pub regions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<BangFunction>,
}

impl Bang {
    fn template_for(&self, region: &str) -> Option<&str> {
        self.regions
            .get(&region.to_ascii_lowercase())
            .or_else(|| self.regions.get(DEFAULT_REGION))
            .map(String::as_str)
    }
}

/// A detected bang and where it sends the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub bang: String,
    pub trigger: String,
    pub location: String,
}

/// One autocomplete entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub trigger: String,
    pub name: String,
    pub favicon: String,
}

/// Autocomplete payload. Wrapped in an object rather than a top-level array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Deserialize)]
struct Catalog {
    #[serde(rename = "bang", default)]
    bangs: Vec<Bang>,
}

/// The bang registry.
#[derive(Debug, Clone)]
pub struct Bangs {
    bangs: Vec<Bang>,
    by_trigger: HashMap<String, usize>,
}

impl Bangs {
    /// Load the catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns [`JiveError::Config`] if the embedded catalog is malformed.
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED)
    }

    /// Parse and validate a catalog.
    ///
    /// Every bang needs a favicon and a `default` region, every template
    /// exactly one `{{.Query}}`, and triggers must be lower-case and unique.
    ///
    /// # Errors
    ///
    /// Returns [`JiveError::Config`] naming the offending bang.
    pub fn from_toml(source: &str) -> Result<Self> {
        let catalog: Catalog =
            toml::from_str(source).map_err(|e| JiveError::Config(format!("bangs: {e}")))?;

        let mut by_trigger = HashMap::new();
        for (i, bang) in catalog.bangs.iter().enumerate() {
            if bang.favicon.is_empty() {
                return Err(JiveError::Config(format!("bang {:?} needs a favicon", bang.name)));
            }
            if !bang.regions.contains_key(DEFAULT_REGION) {
                return Err(JiveError::Config(format!(
                    "bang {:?} needs a default region",
                    bang.name
                )));
            }
            if let Some((region, _)) = bang
                .regions
                .iter()
                .find(|(_, t)| t.matches("{{.Query}}").count() != 1)
            {
                return Err(JiveError::Config(format!(
                    "bang {:?} region {region} must contain exactly one {{{{.Query}}}}",
                    bang.name
                )));
            }
            for trigger in &bang.triggers {
                if trigger.is_empty() || *trigger != trigger.to_lowercase() {
                    return Err(JiveError::Config(format!(
                        "bang {:?} trigger {trigger:?} must be non-empty lower case",
                        bang.name
                    )));
                }
                if by_trigger.insert(trigger.clone(), i).is_some() {
                    return Err(JiveError::Config(format!("duplicate trigger {trigger:?}")));
                }
            }
        }

        Ok(Self {
            bangs: catalog.bangs,
            by_trigger,
        })
    }

    pub fn all(&self) -> &[Bang] {
        &self.bangs
    }

    pub fn len(&self) -> usize {
        self.bangs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bangs.is_empty()
    }

    /// Look up a bang by one of its triggers.
    pub fn get(&self, trigger: &str) -> Option<&Bang> {
        self.by_trigger.get(trigger).map(|&i| &self.bangs[i])
    }

    /// Find the first field (left to right) that starts or ends with `!` and
    /// names a known trigger, and build its redirect.
    ///
    /// A bare `!` is never a candidate; it belongs to the first-result
    /// shortcut.
    pub fn detect(&self, query: &str, region: &str, language: &str) -> Option<Redirect> {
        let fields: Vec<&str> = query.split_whitespace().collect();

        for (i, field) in fields.iter().enumerate() {
            if *field == "!" || !(field.starts_with('!') || field.ends_with('!')) {
                continue;
            }

            let key = field.trim_matches('!').to_lowercase();
            let Some(bang) = self.get(&key) else {
                continue;
            };

            let mut remainder = fields
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, f)| *f)
                .collect::<Vec<_>>()
                .join(" ");
            for function in &bang.functions {
                remainder = function.apply(&remainder);
            }

            let template = bang.template_for(region)?;
            let encoded: String = url::form_urlencoded::byte_serialize(remainder.as_bytes()).collect();
            let location = template
                .replace("{{.Query}}", &encoded)
                .replace("{{.Region}}", region)
                .replace("{{.Language}}", language);

            tracing::debug!(bang = %bang.name, trigger = %key, "bang detected");
            return Some(Redirect {
                bang: bang.name.clone(),
                trigger: key,
                location,
            });
        }
        None
    }

    /// Up to `size` bangs whose trigger starts with `term` (leading `!`
    /// ignored), ordered by trigger then name. A bare `!` yields the fixed
    /// default list.
    pub fn suggest(&self, term: &str, size: usize) -> Suggestions {
        let prefix = term.trim().trim_start_matches('!').to_lowercase();

        let suggestions = if prefix.is_empty() {
            self.suggestions_for(BARE_SUGGESTIONS.iter().copied())
                .take(size)
                .collect()
        } else {
            let mut matched: Vec<Suggestion> = self
                .by_trigger
                .keys()
                .filter(|t| t.starts_with(&prefix))
                .filter_map(|t| self.suggestion(t))
                .collect();
            matched.sort_by(|a, b| a.trigger.cmp(&b.trigger).then_with(|| a.name.cmp(&b.name)));
            matched.truncate(size);
            matched
        };

        Suggestions { suggestions }
    }

    /// The bangs offered on the start page: the known triggers among
    /// `requested`, or `g, b, a, yt` when none are known.
    pub fn defaults(&self, requested: &[String]) -> Vec<Suggestion> {
        let picked: Vec<Suggestion> = self
            .suggestions_for(requested.iter().map(String::as_str))
            .collect();
        if picked.is_empty() {
            self.suggestions_for(FALLBACK_DEFAULTS.iter().copied())
                .collect()
        } else {
            picked
        }
    }

    fn suggestions_for<'a>(
        &'a self,
        triggers: impl Iterator<Item = &'a str> + 'a,
    ) -> impl Iterator<Item = Suggestion> + 'a {
        triggers.filter_map(|t| self.suggestion(t))
    }

    fn suggestion(&self, trigger: &str) -> Option<Suggestion> {
        self.get(trigger).map(|bang| Suggestion {
            trigger: trigger.to_owned(),
            name: bang.name.clone(),
            favicon: bang.favicon.clone(),
        })
    }
}

/// If `query` asks for the first organic result (`! rust`, `rust !` or
/// `\rust`), return the query without the marker.
///
/// An internal `!` (`example ! now`) is not a shortcut.
pub fn first_result_shortcut(query: &str) -> Option<String> {
    let q = query.trim();
    let stripped = if let Some(rest) = q.strip_prefix('\\') {
        rest
    } else if let Some(rest) = q.strip_prefix("! ") {
        rest
    } else if let Some(rest) = q.strip_suffix(" !") {
        rest
    } else {
        return None;
    };

    let stripped = stripped.trim();
    (!stripped.is_empty()).then(|| stripped.to_owned())
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bangs() -> Bangs {
        Bangs::embedded().unwrap()
    }

    #[test]
    fn embedded_catalog_is_valid() {
        let b = bangs();
        assert!(!b.is_empty());
        for bang in b.all() {
            assert!(bang.regions.contains_key("default"), "{}", bang.name);
            assert!(!bang.favicon.is_empty(), "{}", bang.name);
        }
    }

    #[test]
    fn detect_cases() {
        let b = bangs();
        let cases = [
            ("!g bob", "US", "fr", Some("https://encrypted.google.com/search?hl=fr&q=bob")),
            ("!g at&t", "US", "en", Some("https://encrypted.google.com/search?hl=en&q=at%26t")),
            ("!g bob french", "FR", "en", Some("https://www.google.fr/search?hl=en&q=bob+french")),
            (
                "!gfr something french",
                "FR",
                "en",
                Some("https://www.google.fr/search?hl=en&q=something+french"),
            ),
            ("!W bob maRLey", "US", "fr", Some("https://en.wikipedia.org/wiki/Bob_Marley")),
            ("bob marley w!", "DE", "de", Some("https://de.wikipedia.org/wiki/Bob_Marley")),
            ("nonexistent! some query", "US", "fr", None),
            ("this is not a bang", "US", "en", None),
            ("this is not a bang g", "US", "en", None),
            ("this is not a bang google", "US", "en", None),
            ("! rust", "US", "en", None),
        ];

        for (q, region, lang, want) in cases {
            let got = b.detect(q, region, lang).map(|r| r.location);
            assert_eq!(got.as_deref(), want, "query {q:?}");
        }
    }

    #[test]
    fn first_trigger_left_to_right_wins() {
        let r = bangs().detect("!yt cats !g", "US", "en").unwrap();
        assert_eq!(r.bang, "YouTube");
        assert_eq!(r.location, "https://www.youtube.com/results?search_query=cats+%21g");
    }

    #[test]
    fn unknown_candidate_is_skipped_for_a_later_one() {
        let r = bangs().detect("!nope rust !ddg", "US", "en").unwrap();
        assert_eq!(r.trigger, "ddg");
        assert_eq!(r.location, "https://duckduckgo.com/?q=%21nope+rust");
    }

    #[test]
    fn region_and_language_placeholders() {
        let r = bangs().detect("!b rust", "GB", "en").unwrap();
        assert_eq!(r.location, "https://www.bing.com/search?q=rust&setlang=en&cc=GB");
    }

    #[test]
    fn suggest_by_prefix_is_sorted() {
        let got = bangs().suggest("!g", 4);
        let triggers: Vec<_> = got.suggestions.iter().map(|s| s.trigger.as_str()).collect();
        assert_eq!(triggers, vec!["g", "gfr", "gh", "gi"]);
        assert_eq!(got.suggestions[0].name, "Google");
        assert_eq!(got.suggestions[2].name, "GitHub");
    }

    #[test]
    fn suggest_bare_bang_returns_fixed_list() {
        let got = bangs().suggest("!", 10);
        let pairs: Vec<_> = got
            .suggestions
            .iter()
            .map(|s| (s.trigger.as_str(), s.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("g", "Google"),
                ("a", "Amazon"),
                ("b", "Bing"),
                ("reddit", "Reddit"),
                ("w", "Wikipedia"),
            ]
        );
    }

    #[test]
    fn suggestions_serialize_in_an_object() {
        let json = serde_json::to_value(bangs().suggest("!yt", 1)).unwrap();
        assert_eq!(json["suggestions"][0]["trigger"], "yt");
        assert_eq!(json["suggestions"][0]["name"], "YouTube");
    }

    #[test]
    fn defaults_respect_b_param() {
        let b = bangs();
        let picked: Vec<_> = b
            .defaults(&["w".into(), "nope".into(), "gh".into()])
            .into_iter()
            .map(|s| s.trigger)
            .collect();
        assert_eq!(picked, vec!["w", "gh"]);

        let fallback: Vec<_> = b.defaults(&[]).into_iter().map(|s| s.trigger).collect();
        assert_eq!(fallback, vec!["g", "b", "a", "yt"]);
    }

    #[test]
    fn catalog_validation_errors() {
        let no_default = r#"
            [[bang]]
            name = "X"
            favicon = "f"
            triggers = ["x"]
            [bang.regions]
            us = "https://x/?q={{.Query}}"
        "#;
        assert!(Bangs::from_toml(no_default).is_err());

        let duplicate = r#"
            [[bang]]
            name = "X"
            favicon = "f"
            triggers = ["x"]
            [bang.regions]
            default = "https://x/?q={{.Query}}"

            [[bang]]
            name = "Y"
            favicon = "f"
            triggers = ["x"]
            [bang.regions]
            default = "https://y/?q={{.Query}}"
        "#;
        let err = Bangs::from_toml(duplicate).unwrap_err();
        assert!(err.to_string().contains("duplicate trigger"));

        let two_placeholders = r#"
            [[bang]]
            name = "X"
            favicon = "f"
            triggers = ["x"]
            [bang.regions]
            default = "https://x/?q={{.Query}}&r={{.Query}}"
        "#;
        assert!(Bangs::from_toml(two_placeholders).is_err());

        let unknown_function = r#"
            [[bang]]
            name = "X"
            favicon = "f"
            triggers = ["x"]
            functions = ["shout"]
            [bang.regions]
            default = "https://x/?q={{.Query}}"
        "#;
        assert!(Bangs::from_toml(unknown_function).is_err());
    }

    #[test]
    fn shortcut_markers() {
        assert_eq!(first_result_shortcut("! rust lang"), Some("rust lang".into()));
        assert_eq!(first_result_shortcut("rust lang !"), Some("rust lang".into()));
        assert_eq!(first_result_shortcut("  \\rust lang "), Some("rust lang".into()));
        assert_eq!(first_result_shortcut("example ! now"), None);
        assert_eq!(first_result_shortcut("!g rust"), None);
        assert_eq!(first_result_shortcut("rust"), None);
        assert_eq!(first_result_shortcut("!"), None);
        assert_eq!(first_result_shortcut("\\"), None);
    }

    #[test]
    fn wikipedia_canonical() {
        assert_eq!(BangFunction::WikipediaCanonical.apply("bob maRLey"), "Bob_Marley");
    }
}
