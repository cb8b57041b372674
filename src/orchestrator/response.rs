//! What the orchestrator hands back to the front-end.

use jive_search::{ImageResults, Results};
use serde::Serialize;

use crate::bangs::{Suggestion, Suggestions};
use crate::config::BrandConfig;
use crate::instant::Answer;
use crate::query::{Output, QueryContext, Tab};
use crate::suggest::Completions;

/// Exactly one of these per search request.
#[derive(Debug)]
pub enum Outcome {
    /// The query was empty.
    StartPage(StartPage),
    /// A bang or the first-result shortcut fired.
    Redirect(String),
    Page(Box<SearchPage>),
}

#[derive(Debug, Clone, Serialize)]
pub struct StartPage {
    pub brand: BrandConfig,
    pub bangs: Vec<Suggestion>,
}

/// Which page layout renders a [`SearchPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Search,
    Maps,
    Json,
}

impl Template {
    pub fn for_context(ctx: &QueryContext) -> Self {
        match (ctx.tab, ctx.output) {
            (Tab::Maps, _) => Self::Maps,
            (_, Output::Json) => Self::Json,
            _ => Self::Search,
        }
    }
}

/// One slot per producer. A producer that failed or missed the deadline
/// leaves its slot at the zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub instant: Answer,
    pub search: Option<Results>,
    pub images: Option<ImageResults>,
}

/// The `o=json` envelope: `{brand, context, results: {instant, search, images}}`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub brand: BrandConfig,
    pub context: QueryContext,
    pub results: Aggregate,
    #[serde(skip)]
    pub template: Template,
}

/// `/autocomplete` payload: bang suggestions for `!` prefixes, learned
/// completions otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Autocomplete {
    Bangs(Suggestions),
    Queries(Completions),
}
