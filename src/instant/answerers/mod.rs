//! The answerer catalog.

pub mod birthstone;
pub mod breach;
pub mod calculator;
pub mod chance;
pub mod congress;
pub mod country_code;
pub mod currency;
pub mod discography;
pub mod econ;
pub mod hash;
pub mod location;
pub mod maps;
pub mod parcel;
pub mod potus;
pub mod prime;
pub mod shortener;
pub mod stackoverflow;
pub mod stats;
pub mod stock;
pub mod text;
pub mod weather;
pub mod whois;
pub mod widgets;
pub mod wikipedia;

pub use birthstone::Birthstone;
pub use breach::{BreachCheck, BreachFetcher, BreachReport};
pub use calculator::Calculator;
pub use chance::{CoinToss, RandomNumber};
pub use congress::{Congress, CongressFetcher, Delegation};
pub use country_code::{CountryCode, CountryCodeAnswer};
pub use currency::{CurrencyAnswerer, CurrencyQuote, RateFetcher};
pub use discography::{Album, Discography, DiscographyFetcher};
pub use econ::{Econ, EconFetcher, EconSeries};
pub use hash::{Digest, Hash};
pub use location::{City, Geolocator};
pub use maps::{MapAnswer, Maps};
pub use parcel::{Carrier, Parcel, ParcelFetcher, ParcelTracker};
pub use potus::Potus;
pub use prime::{Prime, Primes};
pub use shortener::{ShortUrl, Shortener, UrlShortener};
pub use stackoverflow::{StackOverflow, StackOverflowAnswer, StackOverflowFetcher};
pub use stats::Stats;
pub use stock::{Quote, StockFetcher, StockQuote};
pub use text::{CamelCase, Characters, Frequency, Reverse, UrlDecode, UrlEncode, UserAgent};
pub use weather::{Weather, WeatherAnswerer, WeatherFetcher};
pub use whois::{Whois, WhoisFetcher, WhoisRecord};
pub use widgets::Widget;
pub use wikipedia::{LifeDates, Quantity, WikiArticle, WikiFetcher, Wikipedia, WiktionaryEntry};
