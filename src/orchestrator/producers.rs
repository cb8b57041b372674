//! The per-request producers. Each consults the shared cache under its
//! own fingerprint before doing any work, and stores what it computed
//! with the TTL its cache policy allows.

use std::time::Duration;

use jive_search::{
    canonical_request_url, image_page, search_page, CacheKey, CacheKind, ImageResults,
    OrganicQuery, Results, SearchError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::Orchestrator;
use crate::error::{JiveError, Result};
use crate::instant::Answer;
use crate::query::QueryContext;
use crate::suggest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Producer {
    Search,
    Images,
    Instant,
    Learn,
}

/// What one producer contributed.
#[derive(Debug)]
pub(crate) enum Produced {
    Instant(Answer),
    Search(Result<Results>),
    Images(Result<ImageResults>),
    Learned(Result<()>),
}

/// Fingerprint of the instant answer for `ctx`. Only the normalized query
/// and the tab change what the dispatcher returns.
pub fn instant_key(ctx: &QueryContext) -> CacheKey {
    let url = canonical_request_url("/", &[("q", ctx.normalized.as_str()), ("t", ctx.tab.as_str())]);
    CacheKey::new(CacheKind::Instant, &ctx.language, &ctx.region, &url)
}

/// Fingerprint of an organic page for `query`.
pub fn search_key(ctx: &QueryContext, query: &str) -> CacheKey {
    let page = ctx.page.to_string();
    let number = ctx.number.to_string();
    let url = canonical_request_url(
        "/",
        &[
            ("q", query),
            ("p", page.as_str()),
            ("n", number.as_str()),
            ("safe", if ctx.safe { "t" } else { "f" }),
            ("f", ctx.filter.as_str()),
        ],
    );
    CacheKey::new(CacheKind::Search, &ctx.language, &ctx.region, &url)
}

pub fn images_key(ctx: &QueryContext) -> CacheKey {
    let page = ctx.page.to_string();
    let url = canonical_request_url(
        "/",
        &[
            ("q", ctx.raw.as_str()),
            ("p", page.as_str()),
            ("safe", if ctx.safe { "t" } else { "f" }),
            ("t", "images"),
        ],
    );
    CacheKey::new(CacheKind::Images, &ctx.language, &ctx.region, &url)
}

impl Orchestrator {
    async fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        match self.cache.get_json(key).await {
            Ok(Some(value)) => {
                debug!(kind = key.kind().as_str(), "cache hit");
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                info!(error = %e, "cache unavailable, computing fresh");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        match self.cache.put_json(key, value, ttl).await {
            Ok(()) => {}
            Err(SearchError::CannotSetKey(_)) => {
                trace!(kind = key.kind().as_str(), "cache key already set");
            }
            Err(e) => info!(error = %e, "cache unavailable, result not stored"),
        }
    }

    /// The instant answer for `ctx`, from cache or the dispatcher.
    pub async fn instant(&self, ctx: &QueryContext) -> Answer {
        let key = instant_key(ctx);
        if let Some(answer) = self.cached::<Answer>(&key).await {
            return answer;
        }

        let answer = self.dispatcher.dispatch(ctx).await;
        if let Some(ttl) = answer.cache_ttl(self.instant_ttl) {
            self.store(&key, &answer, ttl).await;
        }
        answer
    }

    /// One organic page for `query` with pagination and truncation applied.
    pub async fn organic(&self, ctx: &QueryContext, query: &str) -> Result<Results> {
        let engine = self
            .organic
            .as_ref()
            .ok_or_else(|| JiveError::ExternalUnavailable("no organic engine configured".into()))?;

        let key = search_key(ctx, query);
        if let Some(results) = self.cached::<Results>(&key).await {
            return Ok(results);
        }

        let results = search_page(
            engine.as_ref(),
            OrganicQuery {
                query: query.to_owned(),
                language: ctx.language.clone(),
                region: ctx.region.clone(),
                number: ctx.number,
                offset: 0,
                safe: ctx.safe,
                filter: ctx.filter,
            },
            ctx.page,
        )
        .await?;
        self.store(&key, &results, self.search_ttl).await;
        Ok(results)
    }

    /// One page of images, safe-search filtered and, when a proxy is
    /// configured, with thumbnails inlined.
    pub async fn images(&self, ctx: &QueryContext) -> Result<ImageResults> {
        let engine = self
            .images
            .as_ref()
            .ok_or_else(|| JiveError::ExternalUnavailable("no image engine configured".into()))?;

        let key = images_key(ctx);
        if let Some(results) = self.cached::<ImageResults>(&key).await {
            return Ok(results);
        }

        let mut results =
            image_page(engine.as_ref(), &ctx.raw, ctx.safe, ctx.page, self.nsfw_threshold).await?;
        if let Some(proxy) = &self.proxy {
            proxy.inline(&mut results.images).await;
        }
        self.store(&key, &results, self.search_ttl).await;
        Ok(results)
    }

    /// Teach the suggestion store about this query.
    pub async fn learn(&self, ctx: &QueryContext) -> Result<()> {
        suggest::learn(self.suggester.as_ref(), &self.naughty, &ctx.normalized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Tab;

    #[test]
    fn keys_follow_the_fingerprint_format() {
        let ctx = QueryContext::new("Bob Marley Age");
        assert_eq!(
            instant_key(&ctx).to_string(),
            "::instant::en::US::/?q=bob+marley+age&t=web"
        );
        assert_eq!(
            search_key(&ctx, "Bob Marley Age").to_string(),
            "::search::en::US::/?f=moderate&n=25&p=1&q=Bob+Marley+Age&safe=t"
        );
        assert_eq!(
            images_key(&ctx).to_string(),
            "::images::en::US::/?p=1&q=Bob+Marley+Age&safe=t&t=images"
        );
    }

    #[test]
    fn instant_key_depends_on_tab() {
        let web = QueryContext::new("x");
        let mut images = QueryContext::new("x");
        images.tab = Tab::Images;
        assert_ne!(instant_key(&web), instant_key(&images));
    }
}
