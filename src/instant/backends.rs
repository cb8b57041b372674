//! The external services instant answers draw on. Any slot may be empty;
//! its answerers then decline and dispatch moves on.

use std::sync::Arc;

use super::answerers::{
    BreachFetcher, CongressFetcher, DiscographyFetcher, EconFetcher, Geolocator, ParcelFetcher,
    RateFetcher, Shortener, StackOverflowFetcher, StockFetcher, WeatherFetcher, WhoisFetcher,
    WikiFetcher,
};
use super::providers::{Iex, IsGd, OpenWeatherMap};
use crate::config::ProvidersConfig;

#[derive(Clone, Default)]
pub struct Backends {
    pub breach: Option<Arc<dyn BreachFetcher>>,
    pub congress: Option<Arc<dyn CongressFetcher>>,
    pub forex: Option<Arc<dyn RateFetcher>>,
    pub crypto: Option<Arc<dyn RateFetcher>>,
    pub discography: Option<Arc<dyn DiscographyFetcher>>,
    pub econ: Option<Arc<dyn EconFetcher>>,
    pub geolocation: Option<Arc<dyn Geolocator>>,
    pub fedex: Option<Arc<dyn ParcelFetcher>>,
    pub ups: Option<Arc<dyn ParcelFetcher>>,
    pub usps: Option<Arc<dyn ParcelFetcher>>,
    pub stackoverflow: Option<Arc<dyn StackOverflowFetcher>>,
    pub stock: Option<Arc<dyn StockFetcher>>,
    pub shortener: Option<Arc<dyn Shortener>>,
    pub weather: Option<Arc<dyn WeatherFetcher>>,
    pub whois: Option<Arc<dyn WhoisFetcher>>,
    pub wikipedia: Option<Arc<dyn WikiFetcher>>,
}

impl Backends {
    /// Wire the providers that have built-in clients.
    pub fn from_config(config: &ProvidersConfig, client: reqwest::Client) -> Self {
        let mut backends = Self::default();

        let owm = &config.openweathermap;
        if !owm.key.is_empty() {
            backends.weather = Some(Arc::new(OpenWeatherMap::new(
                client.clone(),
                &owm.base_url,
                &owm.key,
            )));
        }
        if config.iex.enabled {
            backends.stock = Some(Arc::new(Iex::new(client.clone(), &config.iex.base_url)));
        }
        if config.isgd.enabled {
            backends.shortener = Some(Arc::new(IsGd::new(client, &config.isgd.base_url)));
        }

        tracing::info!(
            weather = backends.weather.is_some(),
            stock = backends.stock.is_some(),
            shortener = backends.shortener.is_some(),
            "instant answer backends configured"
        );
        backends
    }
}
