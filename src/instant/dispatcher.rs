//! Selects at most one instant answer per query.
//!
//! Answerers are tried in registration order. The first whose pattern
//! matches is solved; a failed solve is logged and the walk continues, so
//! an unreachable backend only costs its own answer. When every matching
//! answerer declined, the untriggered answer carries the last error kind.

use std::sync::Arc;

use tracing::debug;

use super::answer::{Answer, AnswerKind};
use super::answerer::{Answerer, SelfTest};
use super::answerers::{
    Birthstone, BreachCheck, Calculator, CamelCase, Carrier, Characters, CoinToss, Congress,
    CountryCode, CurrencyAnswerer, Discography, Econ, Frequency, Hash, Maps, ParcelTracker,
    Potus, Prime, RandomNumber, Reverse, StackOverflow, Stats, StockQuote, UrlDecode, UrlEncode,
    UrlShortener, UserAgent, WeatherAnswerer, Whois, Widget, Wikipedia,
};
use super::backends::Backends;
use crate::error::Result;
use crate::query::{QueryContext, Tab};

/// Answerers still consulted on the image and map tabs.
const RESTRICTED: &[AnswerKind] = &[AnswerKind::Maps, AnswerKind::Wikipedia];

pub struct Dispatcher {
    answerers: Vec<Arc<dyn Answerer>>,
}

impl Dispatcher {
    pub fn new(answerers: Vec<Arc<dyn Answerer>>) -> Self {
        Self { answerers }
    }

    /// The full catalog, in the order that decides between overlapping
    /// patterns. Wikipedia matches everything and goes last.
    pub fn standard(b: &Backends) -> Result<Self> {
        let answerers: Vec<Arc<dyn Answerer>> = vec![
            Arc::new(Birthstone::new()?),
            Arc::new(BreachCheck::new(b.breach.clone())?),
            Arc::new(Calculator::new()?),
            Arc::new(CamelCase::new()?),
            Arc::new(Characters::new()?),
            Arc::new(CoinToss::new()?),
            Arc::new(Congress::new(b.congress.clone())?),
            Arc::new(CountryCode::new()?),
            Arc::new(CurrencyAnswerer::new(b.forex.clone(), b.crypto.clone())?),
            Arc::new(Discography::new(b.discography.clone())?),
            Arc::new(Widget::digital_storage()?),
            Arc::new(ParcelTracker::new(Carrier::Fedex, b.fedex.clone())?),
            Arc::new(Frequency::new()?),
            Arc::new(Econ::gdp(b.econ.clone())?),
            Arc::new(Hash::new()?),
            Arc::new(Widget::speed()?),
            Arc::new(Widget::length()?),
            Arc::new(Maps::new(b.geolocation.clone())?),
            Arc::new(Widget::minify()?),
            Arc::new(Widget::mortgage_calculator()?),
            Arc::new(Econ::population(b.econ.clone())?),
            Arc::new(Potus::new()?),
            Arc::new(Widget::power()?),
            Arc::new(Prime::new()?),
            Arc::new(RandomNumber::new()?),
            Arc::new(Reverse::new()?),
            Arc::new(UrlShortener::new(b.shortener.clone())?),
            Arc::new(Stats::new()?),
            Arc::new(StockQuote::new(b.stock.clone())?),
            Arc::new(Widget::temperature()?),
            Arc::new(ParcelTracker::new(Carrier::Usps, b.usps.clone())?),
            Arc::new(ParcelTracker::new(Carrier::Ups, b.ups.clone())?),
            Arc::new(UrlDecode::new()?),
            Arc::new(UrlEncode::new()?),
            Arc::new(UserAgent::new()?),
            Arc::new(StackOverflow::new(b.stackoverflow.clone())?),
            Arc::new(WeatherAnswerer::new(b.weather.clone(), b.geolocation.clone())?),
            Arc::new(Whois::new(b.whois.clone())?),
            Arc::new(Wikipedia::new(b.wikipedia.clone())?),
        ];
        Ok(Self::new(answerers))
    }

    pub fn answerers(&self) -> impl Iterator<Item = &dyn Answerer> {
        self.answerers.iter().map(|a| a.as_ref())
    }

    /// The answer for `ctx`, or an untriggered answer when nothing solved.
    pub async fn dispatch(&self, ctx: &QueryContext) -> Answer {
        if ctx.normalized.is_empty() {
            return Answer::none();
        }
        let restricted = matches!(ctx.tab, Tab::Images | Tab::Maps);
        let mut declined = None;

        for answerer in &self.answerers {
            if restricted && !RESTRICTED.contains(&answerer.kind()) {
                continue;
            }
            let Some(m) = answerer.matches(&ctx.normalized) else {
                continue;
            };
            let kind = answerer.kind_of(&m);
            match answerer.solve(&m, ctx).await {
                Ok(solution) => {
                    let cache = answerer.cache_policy(kind).cache;
                    debug!(kind = %kind, trigger = %m.trigger, "instant answer");
                    return Answer::solved(kind, solution, cache);
                }
                Err(e) => {
                    debug!(kind = %kind, error = %e, "answerer declined, trying the next one");
                    declined = Some(e.kind());
                }
            }
        }
        Answer::declined(declined)
    }

    /// Every answerer's self tests, tagged with the answerer's kind.
    pub fn self_tests(&self) -> Vec<(AnswerKind, SelfTest)> {
        self.answerers
            .iter()
            .flat_map(|a| {
                let kind = a.kind();
                a.self_tests().into_iter().map(move |t| (kind, t))
            })
            .collect()
    }
}
