//! The search orchestrator: one request in, exactly one of redirect,
//! page or error out.
//!
//! # Flow
//!
//! 1. An empty normalized query renders the start page
//! 2. A bang redirects
//! 3. The first-result shortcut fetches organic results and redirects to
//!    the top hit
//! 4. Otherwise the producers run concurrently: the vertical for the tab
//!    (organic, images, or nothing for maps), plus the instant answer and
//!    the suggestion learner on page one
//! 5. Results are collected until every producer reported or the request
//!    deadline fired; late producers are aborted and leave their slot empty

mod producers;
mod response;

pub use producers::{images_key, instant_key, search_key};
pub use response::{Aggregate, Autocomplete, Outcome, SearchPage, StartPage, Template};

use std::sync::Arc;
use std::time::Duration;

use jive_search::{
    DuckDuckGoEngine, ElasticsearchImages, ImageEngine, ImageProxy, OrganicEngine, ResultCache,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bangs::{first_result_shortcut, Bangs};
use crate::config::{BrandConfig, JiveConfig};
use crate::error::{JiveError, Result};
use crate::instant::{Answer, Backends, Dispatcher};
use crate::query::{QueryContext, Tab};
use crate::suggest::{MemorySuggester, NaughtyFilter, Suggester};
use producers::{Produced, Producer};

/// Completions returned by `/autocomplete`.
pub const AUTOCOMPLETE_SIZE: usize = 10;

/// Everything a request needs, shared read-only across requests.
/// Cloning is cheap.
#[derive(Clone)]
pub struct Orchestrator {
    brand: BrandConfig,
    bangs: Arc<Bangs>,
    dispatcher: Arc<Dispatcher>,
    organic: Option<Arc<dyn OrganicEngine>>,
    images: Option<Arc<dyn ImageEngine>>,
    proxy: Option<ImageProxy>,
    suggester: Arc<dyn Suggester>,
    naughty: Arc<NaughtyFilter>,
    cache: ResultCache,
    instant_ttl: Duration,
    search_ttl: Duration,
    nsfw_threshold: f64,
}

impl Orchestrator {
    /// An orchestrator with no search verticals and an in-memory
    /// suggestion store. Attach engines with the `with_*` methods.
    pub fn new(config: &JiveConfig, bangs: Bangs, dispatcher: Dispatcher) -> Result<Self> {
        let naughty = match &config.suggest.naughty_path {
            Some(path) => NaughtyFilter::from_file(path)?,
            None => NaughtyFilter::embedded()?,
        };
        Ok(Self {
            brand: config.brand.clone(),
            bangs: Arc::new(bangs),
            dispatcher: Arc::new(dispatcher),
            organic: None,
            images: None,
            proxy: None,
            suggester: Arc::new(MemorySuggester::with_capacity(config.suggest.max_entries)),
            naughty: Arc::new(naughty),
            cache: ResultCache::new(&config.cache.prefix, config.cache.max_entries),
            instant_ttl: config.cache.instant_ttl(),
            search_ttl: config.cache.search_ttl(),
            nsfw_threshold: config.search.nsfw_threshold,
        })
    }

    /// Wire every component from configuration: the embedded bang catalog,
    /// the standard answerer catalog with its built-in providers, the
    /// DuckDuckGo organic engine and, when configured, Elasticsearch images
    /// and the image proxy.
    ///
    /// # Errors
    ///
    /// Returns an error if any component fails to initialise.
    pub fn from_config(config: &JiveConfig) -> Result<Self> {
        let search = config.search_config();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.search.organic_timeout_secs))
            .build()
            .map_err(|e| JiveError::Config(format!("failed to build HTTP client: {e}")))?;
        let backends = Backends::from_config(&config.providers, client);

        let mut orchestrator = Self::new(config, Bangs::embedded()?, Dispatcher::standard(&backends)?)?
            .with_organic(Arc::new(DuckDuckGoEngine::new(&search)?));

        if let Some(url) = &config.images.elasticsearch_url {
            orchestrator = orchestrator.with_images(Arc::new(ElasticsearchImages::new(
                &search,
                url,
                &config.images.index,
            )?));
        }
        if let Some(proxy) = ImageProxy::from_config(&search)? {
            orchestrator = orchestrator.with_proxy(proxy);
        }

        info!(
            bangs = orchestrator.bangs.len(),
            answerers = orchestrator.dispatcher.answerers().count(),
            images = orchestrator.images.is_some(),
            "orchestrator ready"
        );
        Ok(orchestrator)
    }

    pub fn with_organic(mut self, engine: Arc<dyn OrganicEngine>) -> Self {
        self.organic = Some(engine);
        self
    }

    pub fn with_images(mut self, engine: Arc<dyn ImageEngine>) -> Self {
        self.images = Some(engine);
        self
    }

    pub fn with_proxy(mut self, proxy: ImageProxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_suggester(mut self, suggester: Arc<dyn Suggester>) -> Self {
        self.suggester = suggester;
        self
    }

    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn brand(&self) -> &BrandConfig {
        &self.brand
    }

    pub fn bangs(&self) -> &Bangs {
        &self.bangs
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn instant_ttl(&self) -> Duration {
        self.instant_ttl
    }

    /// Run one search request.
    ///
    /// # Errors
    ///
    /// Producer failures never surface here; they empty their slot. Only
    /// internal errors propagate.
    pub async fn search(&self, ctx: QueryContext) -> Result<Outcome> {
        if ctx.normalized.is_empty() {
            return Ok(Outcome::StartPage(StartPage {
                brand: self.brand.clone(),
                bangs: self.bangs.defaults(&ctx.default_bangs),
            }));
        }
        tracing::trace!(query = %ctx.raw, "search");

        if let Some(redirect) = self.bangs.detect(&ctx.raw, &ctx.region, &ctx.language) {
            return Ok(Outcome::Redirect(redirect.location));
        }

        if ctx.tab == Tab::Web {
            if let Some(location) = self.first_result(&ctx).await {
                return Ok(Outcome::Redirect(location));
            }
        }

        let results = self.fan_out(&ctx).await;
        Ok(Outcome::Page(Box::new(SearchPage {
            brand: self.brand.clone(),
            template: Template::for_context(&ctx),
            context: ctx,
            results,
        })))
    }

    /// The top organic hit for a shortcut query, if any.
    async fn first_result(&self, ctx: &QueryContext) -> Option<String> {
        let query = first_result_shortcut(&ctx.raw)?;
        match tokio::time::timeout_at(ctx.deadline, self.organic(ctx, &query)).await {
            Ok(Ok(results)) => results.documents.into_iter().next().map(|d| d.url),
            Ok(Err(e)) => {
                info!(error = %e, kind = e.kind(), "first-result shortcut failed");
                None
            }
            Err(_) => {
                info!("deadline exceeded during first-result shortcut");
                None
            }
        }
    }

    /// The instant answer alone, under the request deadline.
    pub async fn answer(&self, ctx: &QueryContext) -> Answer {
        match tokio::time::timeout_at(ctx.deadline, self.instant(ctx)).await {
            Ok(answer) => answer,
            Err(_) => {
                info!("deadline exceeded before an instant answer");
                Answer::none()
            }
        }
    }

    /// Bang suggestions for `!` prefixes, learned completions otherwise.
    ///
    /// # Errors
    ///
    /// Propagates suggestion store failures.
    pub async fn autocomplete(&self, q: &str) -> Result<Autocomplete> {
        let q = q.trim();
        if q.starts_with('!') {
            return Ok(Autocomplete::Bangs(self.bangs.suggest(q, AUTOCOMPLETE_SIZE)));
        }
        let completions = self
            .suggester
            .completion(&crate::query::normalize(q), AUTOCOMPLETE_SIZE)
            .await?;
        Ok(Autocomplete::Queries(completions))
    }

    // -----------------------------------------------------------------------
    // Fan-out / fan-in
    // -----------------------------------------------------------------------

    fn spawn(&self, ctx: &QueryContext, tx: &mpsc::Sender<Produced>, producer: Producer) -> JoinHandle<()> {
        let me = self.clone();
        let ctx = ctx.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let produced = match producer {
                Producer::Search => Produced::Search(me.organic(&ctx, &ctx.raw).await),
                Producer::Images => Produced::Images(me.images(&ctx).await),
                Producer::Instant => Produced::Instant(me.instant(&ctx).await),
                Producer::Learn => Produced::Learned(me.learn(&ctx).await),
            };
            let _ = tx.send(produced).await;
        })
    }

    async fn fan_out(&self, ctx: &QueryContext) -> Aggregate {
        let (tx, mut rx) = mpsc::channel(4);
        let mut handles = Vec::new();

        match ctx.tab {
            Tab::Web => handles.push(self.spawn(ctx, &tx, Producer::Search)),
            Tab::Images => handles.push(self.spawn(ctx, &tx, Producer::Images)),
            Tab::Maps => {}
        }
        if ctx.page == 1 {
            handles.push(self.spawn(ctx, &tx, Producer::Instant));
            handles.push(self.spawn(ctx, &tx, Producer::Learn));
        }
        drop(tx);

        let expected = handles.len();
        let mut received = 0;
        let mut aggregate = Aggregate::default();

        let deadline = tokio::time::sleep_until(ctx.deadline);
        tokio::pin!(deadline);

        while received < expected {
            tokio::select! {
                () = &mut deadline => {
                    info!(missing = expected - received, "deadline exceeded, rendering partial results");
                    break;
                }
                produced = rx.recv() => {
                    let Some(produced) = produced else { break };
                    received += 1;
                    collect(&mut aggregate, produced);
                }
            }
        }

        for handle in handles {
            handle.abort();
        }
        aggregate
    }
}

/// Write one producer's contribution into its slot.
fn collect(aggregate: &mut Aggregate, produced: Produced) {
    match produced {
        Produced::Instant(answer) => aggregate.instant = answer,
        Produced::Search(Ok(results)) => aggregate.search = Some(results),
        Produced::Images(Ok(images)) => aggregate.images = Some(images),
        Produced::Learned(Ok(())) => {}
        Produced::Learned(Err(JiveError::NaughtyWord)) => {
            debug!("query not learned: naughty word");
        }
        Produced::Search(Err(e)) | Produced::Images(Err(e)) | Produced::Learned(Err(e)) => {
            info!(error = %e, kind = e.kind(), "producer failed");
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("bangs", &self.bangs.len())
            .field("organic", &self.organic.as_ref().map(|e| e.name()))
            .field("images", &self.images.as_ref().map(|e| e.name()))
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
