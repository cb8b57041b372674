//! Concrete organic and image backends.
//!
//! [`DuckDuckGoEngine`] scrapes the HTML-only DuckDuckGo endpoint and
//! implements [`crate::engine::OrganicEngine`]. [`ElasticsearchImages`]
//! queries an image index and implements [`crate::engine::ImageEngine`].

pub mod duckduckgo;
pub mod elasticsearch;

pub use duckduckgo::DuckDuckGoEngine;
pub use elasticsearch::ElasticsearchImages;
