//! Orchestrator integration tests: bangs, the first-result shortcut, the
//! cache policy matrix, the request deadline and concurrent cache misses.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use jive::instant::answerers::stock::{Exchange, Last, Quote, StockFetcher};
use jive::instant::answerers::wikipedia::{WikiArticle, WikiFetcher};
use jive::instant::{Answer, AnswerKind, Answerer, Backends, Dispatcher, MatchResult, Solution};
use jive::orchestrator::{images_key, instant_key, Autocomplete, Outcome};
use jive::query::{normalize, Tab};
use jive::{Bangs, JiveConfig, Orchestrator, QueryContext};
use jive_search::{
    Document, Image, ImageEngine, ImageResults, OrganicEngine, OrganicQuery, Results, SearchError,
};
use regex::Regex;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Organic engine over a fixed list that counts its calls.
#[derive(Default)]
struct Corpus {
    calls: AtomicUsize,
}

#[async_trait]
impl OrganicEngine for Corpus {
    async fn fetch(&self, query: &OrganicQuery) -> Result<Results, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let documents = (1..=3)
            .map(|n| Document {
                url: format!("https://example.com/{}/{n}", query.query.replace(' ', "-")),
                title: format!("{} #{n}", query.query),
                description: "A result.".into(),
                language: "en".into(),
                indexed: None,
            })
            .collect();
        Ok(Results {
            count: 3,
            documents,
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "corpus"
    }
}

/// Organic engine that never answers in time.
struct Stalled;

#[async_trait]
impl OrganicEngine for Stalled {
    async fn fetch(&self, _query: &OrganicQuery) -> Result<Results, SearchError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Results::default())
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

/// Image engine over two safe images that counts its calls.
#[derive(Default)]
struct Gallery {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageEngine for Gallery {
    async fn fetch(
        &self,
        query: &str,
        _safe: bool,
        _number: usize,
        _offset: usize,
    ) -> Result<ImageResults, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let images = (1..=2)
            .map(|n| Image {
                url: format!("https://img.example.com/{}/{n}.jpg", query.replace(' ', "-")),
                domain: "img.example.com".into(),
                alt: query.to_owned(),
                nsfw_score: 0.1,
                width: 640,
                height: 480,
                mime: "image/jpeg".into(),
                crawled: None,
                base64: None,
            })
            .collect();
        Ok(ImageResults {
            count: 2,
            images,
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "gallery"
    }
}

/// Answerer that matches everything and takes ten seconds to solve.
struct Sleeper(Vec<Regex>);

#[async_trait]
impl Answerer for Sleeper {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Reverse
    }

    fn triggers(&self) -> &[Regex] {
        &self.0
    }

    async fn solve(&self, _m: &MatchResult, _ctx: &QueryContext) -> jive::Result<Solution> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(Solution::text("too late"))
    }
}

#[derive(Default)]
struct Marley {
    calls: AtomicUsize,
}

#[async_trait]
impl WikiFetcher for Marley {
    async fn fetch(&self, _query: &str, _language: &str) -> jive::Result<WikiArticle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(WikiArticle {
            title: "Bob Marley".into(),
            text: "Robert Nesta Marley was a Jamaican singer.".into(),
            birthday: NaiveDate::from_ymd_opt(1945, 2, 6),
            death: NaiveDate::from_ymd_opt(1981, 5, 11),
            ..WikiArticle::default()
        })
    }
}

struct Ticker;

#[async_trait]
impl StockFetcher for Ticker {
    async fn fetch(&self, ticker: &str) -> jive::Result<Quote> {
        Ok(Quote {
            ticker: ticker.to_owned(),
            name: "Apple Inc.".into(),
            exchange: Exchange::Nasdaq,
            last: Last {
                price: 171.42,
                time: Utc.timestamp_opt(1_522_090_355, 0).unwrap(),
                change: 6.48,
                change_percent: 0.03929,
            },
            history: Vec::new(),
            provider: "test".into(),
        })
    }
}

fn config() -> JiveConfig {
    let mut config = JiveConfig::default();
    config.cache.instant_secs = 3600;
    config.cache.search_secs = 3600;
    config
}

fn orchestrator(config: &JiveConfig, backends: &Backends) -> Orchestrator {
    Orchestrator::new(
        config,
        Bangs::embedded().unwrap(),
        Dispatcher::standard(backends).unwrap(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Redirects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bang_redirects_without_searching() {
    let corpus = Arc::new(Corpus::default());
    let o = orchestrator(&config(), &Backends::default()).with_organic(corpus.clone());

    let Outcome::Redirect(location) = o.search(QueryContext::new("!g something")).await.unwrap()
    else {
        panic!("expected a redirect");
    };
    let url = url::Url::parse(&location).unwrap();
    let q = url.query_pairs().find(|(k, _)| k == "q").map(|(_, v)| v.into_owned());
    assert_eq!(q.as_deref(), Some("something"));
    assert_eq!(corpus.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bang_anywhere_in_the_query_wins() {
    let o = orchestrator(&config(), &Backends::default()).with_organic(Arc::new(Corpus::default()));
    for q in ["bob marley !yt", "!w bob marley", "bob !a marley"] {
        let outcome = o.search(QueryContext::new(q)).await.unwrap();
        assert!(matches!(outcome, Outcome::Redirect(_)), "{q}");
    }
}

#[tokio::test]
async fn first_result_shortcut_redirects_to_the_top_hit() {
    let o = orchestrator(&config(), &Backends::default()).with_organic(Arc::new(Corpus::default()));
    for q in ["\\jimi hendrix", "! jimi hendrix", "jimi hendrix !"] {
        let Outcome::Redirect(location) = o.search(QueryContext::new(q)).await.unwrap() else {
            panic!("expected a redirect for {q:?}");
        };
        assert_eq!(location, "https://example.com/jimi-hendrix/1");
    }

    let outcome = o.search(QueryContext::new("jimi ! hendrix")).await.unwrap();
    assert!(matches!(outcome, Outcome::Page(_)));
}

// ---------------------------------------------------------------------------
// Cache policy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn uncacheable_answers_are_never_stored() {
    let o = orchestrator(&config(), &Backends::default());
    for q in ["flip a coin", "random number 3 5"] {
        let ctx = QueryContext::new(q);
        let answer = o.instant(&ctx).await;
        assert!(answer.triggered && !answer.cache, "{q}");
        assert_eq!(o.cache().ttl_of(&instant_key(&ctx)).await, None, "{q}");
    }
    assert!(o.cache().is_empty().await);
}

#[tokio::test]
async fn cacheable_answers_use_the_tighter_ttl() {
    let backends = Backends {
        stock: Some(Arc::new(Ticker)),
        ..Backends::default()
    };
    let o = orchestrator(&config(), &backends);

    let ctx = QueryContext::new("january birthstone");
    o.instant(&ctx).await;
    assert_eq!(
        o.cache().ttl_of(&instant_key(&ctx)).await,
        Some(Duration::from_secs(3600))
    );

    let ctx = QueryContext::new("aapl quote");
    assert_eq!(o.instant(&ctx).await.kind, Some(AnswerKind::StockQuote));
    assert_eq!(
        o.cache().ttl_of(&instant_key(&ctx)).await,
        Some(Duration::from_secs(60))
    );

    let mut short = config();
    short.cache.instant_secs = 30;
    let o = orchestrator(&short, &backends);
    o.instant(&ctx).await;
    assert_eq!(
        o.cache().ttl_of(&instant_key(&ctx)).await,
        Some(Duration::from_secs(30))
    );
}

// ---------------------------------------------------------------------------
// Deadline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deadline_returns_empty_slots() {
    let sleeper: Arc<dyn Answerer> = Arc::new(Sleeper(vec![Regex::new("^.*$").unwrap()]));
    let slow = Dispatcher::new(vec![sleeper]);
    let o = Orchestrator::new(&config(), Bangs::embedded().unwrap(), slow)
        .unwrap()
        .with_organic(Arc::new(Stalled));

    let mut ctx = QueryContext::new("jimi hendrix");
    ctx.deadline = tokio::time::Instant::now() + Duration::from_millis(300);

    let started = std::time::Instant::now();
    let Outcome::Page(page) = o.search(ctx).await.unwrap() else {
        panic!("expected a page");
    };
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(page.results.instant, Answer::none());
    assert!(page.results.search.is_none());
    assert!(page.results.images.is_none());
}

#[tokio::test]
async fn prime_checks_near_u64_max_finish_inside_the_deadline() {
    let o = orchestrator(&config(), &Backends::default());

    let mut ctx = QueryContext::new("is 18446744073709551557 prime");
    ctx.deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    let started = std::time::Instant::now();
    let answer = o.answer(&ctx).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(answer.kind, Some(AnswerKind::Prime));
    let Solution::Primes(primes) = &answer.solution else {
        panic!("expected primes, got {:?}", answer.solution);
    };
    assert_eq!(primes.primes, vec![18_446_744_073_709_551_557]);

    let mut ctx = QueryContext::new(
        "prime numbers between 18446744073709451615 and 18446744073709551615",
    );
    ctx.deadline = tokio::time::Instant::now() + Duration::from_millis(200);
    let started = std::time::Instant::now();
    o.answer(&ctx).await;
    assert!(started.elapsed() < Duration::from_secs(2));
}

// ---------------------------------------------------------------------------
// Producer selection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn later_pages_skip_instant_answers_and_learning() {
    let o = orchestrator(&config(), &Backends::default()).with_organic(Arc::new(Corpus::default()));

    let mut ctx = QueryContext::new("january birthstone");
    ctx.page = 2;
    let Outcome::Page(page) = o.search(ctx.clone()).await.unwrap() else {
        panic!("expected a page");
    };
    assert_eq!(page.results.instant, Answer::none());
    assert!(page.results.search.is_some());
    assert_eq!(o.cache().ttl_of(&instant_key(&ctx)).await, None);

    let Autocomplete::Queries(c) = o.autocomplete("january").await.unwrap() else {
        panic!("expected learned completions");
    };
    assert!(c.suggestions.is_empty());
}

#[tokio::test]
async fn image_tab_fills_only_the_images_slot() {
    let corpus = Arc::new(Corpus::default());
    let gallery = Arc::new(Gallery::default());
    let backends = Backends {
        wikipedia: Some(Arc::new(Marley::default())),
        ..Backends::default()
    };
    let o = orchestrator(&config(), &backends)
        .with_organic(corpus.clone())
        .with_images(gallery.clone());

    // On the web tab this is a birthstone answer.
    let mut ctx = QueryContext::new("january birthstone");
    ctx.tab = Tab::Images;
    let Outcome::Page(page) = o.search(ctx.clone()).await.unwrap() else {
        panic!("expected a page");
    };

    assert!(page.results.search.is_none());
    assert_eq!(corpus.calls.load(Ordering::SeqCst), 0);
    let images = page.results.images.as_ref().expect("images slot");
    assert_eq!(images.images.len(), 2);
    assert_eq!(page.results.instant.kind, Some(AnswerKind::Wikipedia));

    assert_eq!(
        o.cache().ttl_of(&images_key(&ctx)).await,
        Some(Duration::from_secs(3600))
    );
    o.search(ctx).await.unwrap();
    assert_eq!(gallery.calls.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_identical_misses_agree() {
    let marley = Arc::new(Marley::default());
    let backends = Backends {
        wikipedia: Some(marley.clone()),
        ..Backends::default()
    };
    let o = orchestrator(&config(), &backends);

    let ctx = QueryContext::new("bob marley age");
    let (a, b) = tokio::join!(o.instant(&ctx), o.instant(&ctx));
    assert_eq!(a.kind, Some(AnswerKind::WikidataAge));
    assert_eq!(a, b);
    assert!(marley.calls.load(Ordering::SeqCst) >= 1);

    // Whichever writer lost, the stored value is the shared answer.
    let cached: Answer = o.cache().get_json(&instant_key(&ctx)).await.unwrap().unwrap();
    assert_eq!(cached, a);

    let calls = marley.calls.load(Ordering::SeqCst);
    assert_eq!(o.instant(&ctx).await, a);
    assert_eq!(marley.calls.load(Ordering::SeqCst), calls);

    let err = o
        .cache()
        .put_json(&instant_key(&ctx), &a, Duration::from_secs(60))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::CannotSetKey(_)));
}

// ---------------------------------------------------------------------------
// Suggestions and normalization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn searches_feed_autocomplete_except_naughty_ones() {
    let o = orchestrator(&config(), &Backends::default()).with_organic(Arc::new(Corpus::default()));
    o.search(QueryContext::new("Jimi Hendrix")).await.unwrap();
    o.search(QueryContext::new("jimi hendrix?")).await.unwrap();
    o.search(QueryContext::new("jimi is a bastard")).await.unwrap();

    let Autocomplete::Queries(c) = o.autocomplete("jimi").await.unwrap() else {
        panic!("expected learned completions");
    };
    assert_eq!(c.suggestions, vec!["jimi hendrix"]);
}

#[test]
fn normalize_is_idempotent() {
    for q in [
        "  Bob   Marley?? ",
        "WHAT IS\tTHE TIME?",
        "¿Dónde está?",
        "?",
        "",
        "C++ vs Rust",
    ] {
        let once = normalize(q);
        assert_eq!(normalize(&once), once, "{q:?}");
    }
}
