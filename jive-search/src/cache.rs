//! Namespaced TTL cache shared by the instant, organic and image producers.
//!
//! Keys are the fingerprint `::<kind>::<lang>::<region>::<url>` prefixed
//! with a per-deployment namespace, so one backing store can serve
//! several deployments and the three kinds never collide. Values are
//! JSON blobs, each with its own TTL (backed by a [`moka`] expiry policy).
//!
//! `put` is set-if-absent: when a live value already sits under the key,
//! the write is refused with [`SearchError::CannotSetKey`]. Concurrent
//! builders of the same fingerprint therefore agree on a single value.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SearchError;

/// Upper bound used when the caller passes `0` for the entry budget.
const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Which producer a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Instant,
    Search,
    Images,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Search => "search",
            Self::Images => "images",
        }
    }
}

/// The `(kind, language, region, canonical url)` fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: CacheKind,
    language: String,
    region: String,
    url: String,
}

impl CacheKey {
    pub fn new(kind: CacheKind, language: &str, region: &str, url: &str) -> Self {
        Self {
            kind,
            language: language.to_owned(),
            region: region.to_owned(),
            url: url.to_owned(),
        }
    }

    pub fn kind(&self) -> CacheKind {
        self.kind
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "::{}::{}::{}::{}",
            self.kind.as_str(),
            self.language,
            self.region,
            self.url
        )
    }
}

/// Build the canonical form of a request URL: the path followed by the
/// query pairs sorted by key then value, form-encoded.
///
/// ```
/// use jive_search::cache::canonical_request_url;
///
/// let a = canonical_request_url("/", &[("t", "web"), ("q", "reverse \"this\"")]);
/// assert_eq!(a, "/?q=reverse+%22this%22&t=web");
/// ```
pub fn canonical_request_url(path: &str, params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<(&str, &str)> = params.to_vec();
    sorted.sort_unstable();

    if sorted.is_empty() {
        return path.to_owned();
    }

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in sorted {
        query.append_pair(k, v);
    }
    format!("{path}?{}", query.finish())
}

#[derive(Clone)]
struct Entry {
    blob: Arc<str>,
    ttl: Duration,
}

/// Expire every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process result cache with per-entry TTL and set-if-absent writes.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<String, Entry>,
    prefix: Arc<str>,
}

impl ResultCache {
    /// Create a cache whose keys all live under `prefix`.
    pub fn new(prefix: &str, max_entries: u64) -> Self {
        let capacity = if max_entries == 0 {
            DEFAULT_MAX_ENTRIES
        } else {
            max_entries
        };
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
            prefix: Arc::from(prefix),
        }
    }

    fn namespaced(&self, key: &CacheKey) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Look up a raw blob. Expired entries are misses.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<str>> {
        self.inner
            .get(&self.namespaced(key))
            .await
            .map(|entry| entry.blob)
    }

    /// Store `blob` under `key` for `ttl` unless a live value already exists.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::CannotSetKey`] when another writer got there
    /// first; the existing value is left untouched.
    pub async fn put(&self, key: &CacheKey, blob: String, ttl: Duration) -> Result<(), SearchError> {
        let namespaced = self.namespaced(key);
        let entry = self
            .inner
            .entry(namespaced.clone())
            .or_insert_with(async move {
                Entry {
                    blob: Arc::from(blob),
                    ttl,
                }
            })
            .await;

        if entry.is_fresh() {
            tracing::trace!(key = %namespaced, ttl_ms = ttl.as_millis() as u64, "cache put");
            Ok(())
        } else {
            Err(SearchError::CannotSetKey(namespaced))
        }
    }

    /// Look up and decode a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] if the stored blob does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, SearchError> {
        match self.get(key).await {
            Some(blob) => serde_json::from_str(&blob)
                .map(Some)
                .map_err(|e| SearchError::Parse(format!("cached value for {key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and [`put`](Self::put) it.
    ///
    /// # Errors
    ///
    /// [`SearchError::Parse`] if encoding fails, otherwise as for `put`.
    pub async fn put_json<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> Result<(), SearchError> {
        let blob = serde_json::to_string(value)
            .map_err(|e| SearchError::Parse(format!("encode value for {key}: {e}")))?;
        self.put(key, blob, ttl).await
    }

    /// The TTL a live entry was written with.
    pub async fn ttl_of(&self, key: &CacheKey) -> Option<Duration> {
        self.inner
            .get(&self.namespaced(key))
            .await
            .map(|entry| entry.ttl)
    }

    /// Number of live entries (approximate until pending tasks run).
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
