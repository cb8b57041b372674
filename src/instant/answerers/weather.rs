use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::location::{locate_caller, Geolocator};
use crate::error::Result;
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{alternation, compile, not_configured, Answerer, MatchResult};
use crate::query::QueryContext;

/// Conditions, collapsed from the provider's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCode {
    Clear,
    LightClouds,
    ScatteredClouds,
    OvercastClouds,
    Rain,
    Snow,
    ThunderStorm,
    Windy,
    Extreme,
}

impl WeatherCode {
    /// Map an OpenWeatherMap condition id.
    pub fn from_condition(id: i64) -> Option<Self> {
        let code = match id {
            200..=299 => Self::ThunderStorm,
            300..=398 | 500..=598 => Self::Rain,
            600..=698 => Self::Snow,
            700..=798 | 900..=905 => Self::Extreme,
            800 => Self::Clear,
            801 => Self::LightClouds,
            802 | 803 => Self::ScatteredClouds,
            804 => Self::OvercastClouds,
            951..=998 => Self::Windy,
            _ => return None,
        };
        Some(code)
    }
}

/// Conditions at one point in time. Temperatures are whole degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instant {
    pub date: DateTime<Utc>,
    pub code: WeatherCode,
    pub temperature: i32,
    pub low: i32,
    pub high: i32,
    pub wind: f64,
    pub clouds: f64,
    pub rain: f64,
    pub snow: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub city: String,
    pub current: Instant,
    pub forecast: Vec<Instant>,
    pub provider: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_zone: String,
}

#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn by_zip(&self, zip: u32) -> Result<Weather>;

    async fn by_coordinates(&self, latitude: f64, longitude: f64, time_zone: &str)
        -> Result<Weather>;
}

/// `weather 84014` is cacheable. Anything else is the weather where the
/// caller is, and is not. Place names are not geocoded.
pub struct WeatherAnswerer {
    patterns: Vec<Regex>,
    fetcher: Option<Arc<dyn WeatherFetcher>>,
    geolocator: Option<Arc<dyn Geolocator>>,
}

impl WeatherAnswerer {
    pub fn new(
        fetcher: Option<Arc<dyn WeatherFetcher>>,
        geolocator: Option<Arc<dyn Geolocator>>,
    ) -> Result<Self> {
        let t = alternation(&["weather forecast", "climate", "forecast", "weather"]);
        Ok(Self {
            patterns: compile(&[
                format!(r"^(?P<trigger>{t})(?: (?P<remainder>.*))?$"),
                format!(r"^(?P<remainder>.*) (?P<trigger>{t})$"),
                r"^(?P<remainder>[0-9]{5})$".to_owned(),
            ])?,
            fetcher,
            geolocator,
        })
    }
}

fn zip(remainder: &str) -> Option<u32> {
    if remainder.len() == 5 && remainder.bytes().all(|b| b.is_ascii_digit()) {
        remainder.parse().ok()
    } else {
        None
    }
}

#[async_trait]
impl Answerer for WeatherAnswerer {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Weather
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    fn kind_of(&self, m: &MatchResult) -> AnswerKind {
        match zip(&m.remainder) {
            Some(_) => AnswerKind::Weather,
            None => AnswerKind::LocalWeather,
        }
    }

    async fn solve(&self, m: &MatchResult, ctx: &QueryContext) -> Result<Solution> {
        let fetcher = self.fetcher.as_ref().ok_or_else(|| not_configured("weather"))?;
        let weather = match zip(&m.remainder) {
            Some(zip) => fetcher.by_zip(zip).await?,
            None => {
                let geo = self
                    .geolocator
                    .as_ref()
                    .ok_or_else(|| not_configured("geolocation"))?;
                let city = locate_caller(geo.as_ref(), ctx).await?;
                fetcher
                    .by_coordinates(city.latitude, city.longitude, &city.time_zone)
                    .await?
            }
        };
        Ok(Solution::Weather(weather))
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;
    use crate::instant::answerers::location::City;

    #[test]
    fn condition_ranges() {
        use WeatherCode as W;
        let cases = [
            (200, Some(W::ThunderStorm)),
            (299, Some(W::ThunderStorm)),
            (300, Some(W::Rain)),
            (399, None),
            (550, Some(W::Rain)),
            (601, Some(W::Snow)),
            (741, Some(W::Extreme)),
            (800, Some(W::Clear)),
            (801, Some(W::LightClouds)),
            (802, Some(W::ScatteredClouds)),
            (803, Some(W::ScatteredClouds)),
            (804, Some(W::OvercastClouds)),
            (903, Some(W::Extreme)),
            (955, Some(W::Windy)),
            (999, None),
            (100, None),
        ];
        for (id, want) in cases {
            assert_eq!(WeatherCode::from_condition(id), want, "id {id}");
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    fn sample() -> Weather {
        let now = Instant {
            date: Utc.with_ymd_and_hms(2018, 4, 1, 18, 58, 0).unwrap(),
            code: WeatherCode::ScatteredClouds,
            temperature: 59,
            low: 55,
            high: 63,
            wind: 4.7,
            clouds: 40.0,
            rain: 0.0,
            snow: 0.0,
            pressure: 1014.0,
            humidity: 33.0,
        };
        Weather {
            city: "Bountiful".into(),
            current: now,
            forecast: Vec::new(),
            provider: "OpenWeatherMap".into(),
            time_zone: String::new(),
        }
    }

    #[async_trait]
    impl WeatherFetcher for Recorder {
        async fn by_zip(&self, zip: u32) -> Result<Weather> {
            self.calls.lock().unwrap().push(format!("zip {zip}"));
            Ok(sample())
        }

        async fn by_coordinates(&self, lat: f64, lon: f64, tz: &str) -> Result<Weather> {
            self.calls.lock().unwrap().push(format!("at {lat},{lon} {tz}"));
            Ok(Weather {
                time_zone: tz.to_owned(),
                ..sample()
            })
        }
    }

    struct Fixed;

    #[async_trait]
    impl Geolocator for Fixed {
        async fn locate(&self, _ip: IpAddr) -> Result<City> {
            Ok(City {
                city: "Bountiful".into(),
                state: "Utah".into(),
                country: "US".into(),
                latitude: 40.88,
                longitude: -111.87,
                time_zone: "America/Denver".into(),
            })
        }
    }

    fn answerer() -> (WeatherAnswerer, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        let a = WeatherAnswerer::new(Some(rec.clone()), Some(Arc::new(Fixed))).unwrap();
        (a, rec)
    }

    #[tokio::test]
    async fn zip_is_weather() {
        let (a, rec) = answerer();
        for q in ["weather 84014", "84014 weather", "84014"] {
            let m = a.matches(q).unwrap();
            assert_eq!(a.kind_of(&m), AnswerKind::Weather, "{q}");
            a.solve(&m, &QueryContext::new(q)).await.unwrap();
        }
        assert_eq!(rec.calls.lock().unwrap().len(), 3);
        assert!(rec.calls.lock().unwrap().iter().all(|c| c == "zip 84014"));
    }

    #[tokio::test]
    async fn bare_trigger_is_local_weather() {
        let (a, rec) = answerer();
        let mut ctx = QueryContext::new("weather");
        ctx.client_ip = Some("161.59.224.138".parse().unwrap());
        let m = a.matches(&ctx.normalized).unwrap();
        assert_eq!(a.kind_of(&m), AnswerKind::LocalWeather);
        let Solution::Weather(w) = a.solve(&m, &ctx).await.unwrap() else {
            panic!("expected weather");
        };
        assert_eq!(w.time_zone, "America/Denver");
        assert_eq!(
            rec.calls.lock().unwrap().as_slice(),
            ["at 40.88,-111.87 America/Denver"]
        );
    }

    #[tokio::test]
    async fn local_weather_needs_a_client_address() {
        let (a, _) = answerer();
        let ctx = QueryContext::new("forecast");
        let m = a.matches(&ctx.normalized).unwrap();
        assert_eq!(a.solve(&m, &ctx).await.unwrap_err().kind(), "invalid-input");
    }

    #[tokio::test]
    async fn unconfigured() {
        let a = WeatherAnswerer::new(None, None).unwrap();
        let m = a.matches("weather 84014").unwrap();
        let err = a.solve(&m, &QueryContext::new("weather 84014")).await.unwrap_err();
        assert_eq!(err.kind(), "external-unavailable");
    }

    #[test]
    fn triggers_need_a_word_boundary() {
        let (a, _) = answerer();
        assert!(a.matches("weatherproof").is_none());
        assert!(a.matches("1234").is_none());
    }
}
