//! Post-processing for the organic and image verticals.
//!
//! Engines return raw pages; the functions here compute offsets, drop
//! duplicate URLs, apply the safe-search cut, truncate display text and
//! attach pagination before anything is cached or rendered.

pub mod dedup;
pub mod images;
pub mod search;
pub mod truncate;
