//! # jive-search
//!
//! Organic and image search verticals for Jive, plus the result cache
//! shared by every producer.
//!
//! ## Design
//!
//! - The organic index is a black box behind [`OrganicEngine`]; the
//!   default backend scrapes DuckDuckGo's HTML endpoint
//! - Image records come from an Elasticsearch index behind [`ImageEngine`]
//! - [`pipeline`] turns raw engine pages into display pages: offsets,
//!   duplicate URLs, truncation, the safe-search cut and pagination
//! - [`ResultCache`] stores JSON blobs under namespaced fingerprints
//!   with per-entry TTLs and set-if-absent writes
//!
//! ## Privacy
//!
//! - Queries are logged only at trace level
//! - Error messages never contain the query text
//! - Thumbnails are fetched through a signing image proxy so the
//!   browser never talks to third-party hosts

pub mod cache;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod types;

pub use cache::{canonical_request_url, CacheKey, CacheKind, ResultCache};
pub use config::SearchConfig;
pub use engine::{ImageEngine, OrganicEngine, OrganicQuery};
pub use engines::{DuckDuckGoEngine, ElasticsearchImages};
pub use error::{Result, SearchError};
pub use pipeline::images::{image_page, ImageProxy, IMAGES_PER_PAGE};
pub use pipeline::search::search_page;
pub use types::{Document, Filter, Image, ImageResults, Pagination, Results};
