//! Image result pages and thumbnail inlining through the image proxy.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use futures::future::join_all;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::SearchConfig;
use crate::engine::ImageEngine;
use crate::error::SearchError;
use crate::http;
use crate::types::{Image, ImageResults, Pagination};

type HmacSha256 = Hmac<Sha256>;

/// Images requested per page, independent of the organic `n` parameter.
pub const IMAGES_PER_PAGE: usize = 100;

/// Thumbnail geometry requested from the proxy.
const THUMBNAIL_SPEC: &str = "225x";

/// Fetch one page of images and enforce the safe-search cut.
///
/// The offset is `page * 100 - 100`. When `safe` is on every record
/// scoring above `nsfw_threshold` is removed, whatever the engine did.
///
/// # Errors
///
/// Propagates the engine's [`SearchError`].
pub async fn image_page(
    engine: &dyn ImageEngine,
    query: &str,
    safe: bool,
    page: usize,
    nsfw_threshold: f64,
) -> Result<ImageResults, SearchError> {
    let page = page.max(1);
    let offset = (page - 1).saturating_mul(IMAGES_PER_PAGE);

    let mut results = engine.fetch(query, safe, IMAGES_PER_PAGE, offset).await?;
    if safe {
        let before = results.images.len();
        results.images.retain(|img| img.nsfw_score <= nsfw_threshold);
        let dropped = before - results.images.len();
        if dropped > 0 {
            tracing::debug!(engine = engine.name(), dropped, "dropped images above nsfw threshold");
        }
    }
    results.pagination = Pagination::new(results.count, IMAGES_PER_PAGE, page);
    Ok(results)
}

/// HMAC-SHA256 of `image_url` under `secret`, URL-safe base64 encoded.
///
/// The image proxy recomputes this to refuse URLs it did not sign.
pub fn hmac_key(secret: &str, image_url: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length.
        Err(_) => return String::new(),
    };
    mac.update(image_url.as_bytes());
    URL_SAFE.encode(mac.finalize().into_bytes())
}

/// Client for the reverse image proxy that serves resized thumbnails.
#[derive(Debug, Clone)]
pub struct ImageProxy {
    host: String,
    secret: String,
    client: reqwest::Client,
}

impl ImageProxy {
    /// Build a proxy client, or `None` when no proxy host is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Option<Self>, SearchError> {
        let Some(host) = config.proxy_host.as_deref() else {
            return Ok(None);
        };
        if config.hmac_secret.is_empty() {
            tracing::info!("image proxy hmac secret is blank; thumbnails will be signed with an empty key");
        }
        Ok(Some(Self {
            host: host.trim_end_matches('/').to_owned(),
            secret: config.hmac_secret.clone(),
            client: http::build_proxy_client(config)?,
        }))
    }

    /// `{host}/image/225x,s{hmac}/{url}`
    pub fn thumbnail_url(&self, image_url: &str) -> String {
        format!(
            "{}/image/{THUMBNAIL_SPEC},s{}/{image_url}",
            self.host,
            hmac_key(&self.secret, image_url)
        )
    }

    async fn fetch_thumbnail(&self, image_url: &str) -> Result<String, SearchError> {
        let bytes = self
            .client
            .get(self.thumbnail_url(image_url))
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("image proxy request failed", e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("image proxy HTTP error: {e}")))?
            .bytes()
            .await
            .map_err(|e| SearchError::from_reqwest("image proxy read failed", e))?;
        Ok(STANDARD.encode(&bytes))
    }

    /// Fill in [`Image::base64`] for every image, concurrently.
    ///
    /// Fan-out is bounded by the page size. A failed thumbnail is logged
    /// and leaves that record without inline bytes; the record is kept.
    pub async fn inline(&self, images: &mut [Image]) {
        let fetches = images.iter().map(|img| self.fetch_thumbnail(&img.url));
        let outcomes = join_all(fetches).await;

        for (img, outcome) in images.iter_mut().zip(outcomes) {
            match outcome {
                Ok(encoded) => img.base64 = Some(encoded),
                Err(err) => {
                    tracing::debug!(error = %err, "thumbnail fetch failed");
                }
            }
        }
    }
}
