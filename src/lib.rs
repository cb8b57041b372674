//! Jive: a privacy-respecting search front-end.
//!
//! One query fans out to several producers under a single deadline:
//! - **Bangs**: `!g rust` style triggers that redirect to another site
//! - **Instant answers**: an ordered catalog of answerers (calculator,
//!   weather, stock quotes, ...) of which the first match wins
//! - **Organic and image results**: the verticals in [`jive_search`]
//! - **Suggestions**: the learner behind `/autocomplete`
//!
//! Everything shares one namespaced TTL cache, and whatever is ready when
//! the deadline fires is rendered.

pub mod bangs;
pub mod config;
pub mod error;
pub mod frontend;
pub mod instant;
pub mod language;
pub mod orchestrator;
pub mod query;
pub mod suggest;

pub use bangs::Bangs;
pub use config::JiveConfig;
pub use error::{JiveError, Result};
pub use frontend::Frontend;
pub use instant::{Answer, Dispatcher};
pub use orchestrator::{Orchestrator, Outcome};
pub use query::QueryContext;
