//! Instant-answer integration tests: the full catalog behind the
//! dispatcher, driven by each answerer's own self tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use jive::instant::answerers::stock::{Exchange, Quote};
use jive::instant::providers::Iex;
use jive::instant::{Answer, AnswerKind, Backends, Dispatcher, Solution};
use jive::QueryContext;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn standard() -> Dispatcher {
    Dispatcher::standard(&Backends::default()).unwrap()
}

async fn ask(dispatcher: &Dispatcher, q: &str) -> Answer {
    dispatcher.dispatch(&QueryContext::new(q)).await
}

// ---------------------------------------------------------------------------
// Catalog-wide properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_self_test_passes_through_the_dispatcher() {
    let dispatcher = standard();
    let tests = dispatcher.self_tests();
    assert!(!tests.is_empty());

    for (kind, test) in tests {
        let mut ctx = QueryContext::new(&test.query);
        if let Some(ua) = &test.user_agent {
            ctx.user_agent = ua.clone();
        }
        let answer = dispatcher.dispatch(&ctx).await;
        assert!(answer.triggered, "{:?} did not trigger {kind}", test.query);
        assert_eq!(answer.kind, Some(kind), "wrong answerer for {:?}", test.query);
        assert!(
            test.expected.contains(&answer.solution),
            "{:?} solved to {:?}",
            test.query,
            answer.solution
        );
    }
}

#[tokio::test]
async fn at_most_one_answer_and_untriggered_is_empty() {
    let dispatcher = standard();
    for q in ["", "   "] {
        assert_eq!(ask(&dispatcher, q).await, Answer::none(), "{q:?}");
    }
    for q in ["bob marley", "jimi hendrix"] {
        let answer = ask(&dispatcher, q).await;
        assert!(!answer.triggered, "{q:?}");
        assert_eq!(answer.type_tag(), "");
        assert_eq!(answer.solution, Solution::empty());
        // Wikipedia matches anything but has no backend here.
        assert_eq!(answer.error.as_deref(), Some("external-unavailable"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deeply_nested_formula_is_declined() {
    let dispatcher = Arc::new(standard());
    let q = format!("{}1+1", "(".repeat(30_000));
    let answer = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.dispatch(&QueryContext::new(&q)).await }
    })
    .await
    .unwrap();
    assert!(!answer.triggered);
    assert_ne!(answer.kind, Some(AnswerKind::Calculator));

    let answer = ask(&dispatcher, "((1+1)*3)").await;
    assert_eq!(answer.solution, Solution::Number(6.0));
}

#[tokio::test]
async fn answers_carry_their_cache_policy() {
    let dispatcher = standard();
    let coin = ask(&dispatcher, "flip a coin").await;
    assert_eq!(coin.kind, Some(AnswerKind::CoinToss));
    assert!(!coin.cache);

    let reverse = ask(&dispatcher, "reverse abc").await;
    assert!(reverse.cache);
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn january_birthstone() {
    let answer = ask(&standard(), "january birthstone").await;
    assert_eq!(
        serde_json::to_value(&answer).unwrap(),
        json!({"type": "birthstone", "triggered": true, "solution": "Garnet", "cache": true})
    );
}

#[tokio::test]
async fn md5_of_a_word() {
    let answer = ask(&standard(), "md5 this").await;
    assert_eq!(
        serde_json::to_value(&answer).unwrap(),
        json!({
            "type": "hash",
            "triggered": true,
            "solution": {
                "original": "this",
                "algo": "MD5",
                "digest": "9e925e9341b490bfd3b4c4ca3b0c1ef2"
            },
            "cache": true
        })
    );
}

#[tokio::test]
async fn random_number_in_a_descending_range() {
    let dispatcher = standard();
    for _ in 0..20 {
        let answer = ask(&dispatcher, "random number between -18 and -21").await;
        assert_eq!(answer.kind, Some(AnswerKind::Random));
        assert!(!answer.cache);
        let Solution::Text(n) = &answer.solution else {
            panic!("expected a number, got {:?}", answer.solution);
        };
        let n: i64 = n.parse().unwrap();
        assert!((-21..=-18).contains(&n), "{n} out of range");
    }
}

#[tokio::test]
async fn reverse_strips_outer_quotes() {
    let answer = ask(&standard(), r#"reverse "ahh yeah""#).await;
    assert_eq!(answer.kind, Some(AnswerKind::Reverse));
    assert_eq!(answer.solution, Solution::text("haey hha"));
}

#[tokio::test]
async fn country_code_of_the_united_states() {
    let answer = ask(&standard(), "country code united states").await;
    assert_eq!(
        serde_json::to_value(&answer).unwrap()["solution"],
        json!({"Format": "ISO 3166-1 alpha-2", "Country": "United States", "Solution": "US"})
    );
}

/// The chart is deliberately out of order.
const AAPL: &str = r#"{
  "quote": {
    "symbol": "AAPL",
    "companyName": "Apple Inc.",
    "primaryExchange": "Nasdaq Global Select",
    "latestPrice": 171.42,
    "latestUpdate": 1522090355062,
    "change": 6.48,
    "changePercent": 0.03929
  },
  "chart": [
    {"date": "2013-03-27", "open": 59.3599, "high": 59.4041, "low": 58.6147, "close": 58.7903, "volume": 81854409},
    {"date": "2013-03-26", "open": 60.5276, "high": 60.5797, "low": 59.8891, "close": 59.9679, "volume": 73428208}
  ]
}"#;

#[tokio::test]
async fn aapl_quote_from_iex() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/AAPL/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(AAPL, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let backends = Backends {
        stock: Some(Arc::new(Iex::new(reqwest::Client::new(), &server.uri()))),
        ..Backends::default()
    };
    let dispatcher = Dispatcher::standard(&backends).unwrap();
    let answer = ask(&dispatcher, "AAPL quote").await;

    assert_eq!(answer.type_tag(), "stock-quote");
    let Solution::Stock(Quote {
        exchange, history, ..
    }) = &answer.solution
    else {
        panic!("expected a stock quote, got {:?}", answer.solution);
    };
    assert_eq!(*exchange, Exchange::Nasdaq);
    assert_eq!(history.len(), 2);
    assert!(history.windows(2).all(|w| w[0].date <= w[1].date));

    let wire = serde_json::to_value(&answer).unwrap();
    assert_eq!(wire["solution"]["exchange"], "NASDAQ");
}
