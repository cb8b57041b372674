//! OpenWeatherMap current conditions and five-day forecast.

use async_trait::async_trait;
use chrono::DateTime;
use jive_search::SearchError;
use serde::Deserialize;

use super::{base, get_json};
use crate::error::Result;
use crate::instant::answerers::weather::{Instant, Weather, WeatherCode, WeatherFetcher};

const PROVIDER: &str = "OpenWeatherMap";

#[derive(Debug, Clone)]
pub struct OpenWeatherMap {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl OpenWeatherMap {
    pub fn new(client: reqwest::Client, base_url: &str, key: &str) -> Self {
        Self {
            client,
            base_url: base(base_url),
            key: key.to_owned(),
        }
    }

    /// Current conditions and forecast for the same location, fetched together.
    async fn current_and_forecast(&self, location: &[(&str, String)]) -> Result<Weather> {
        let mut params = vec![("APPID", self.key.clone()), ("units", "imperial".to_owned())];
        params.extend(location.iter().map(|(k, v)| (*k, v.clone())));

        let current = get_json::<OwmCurrent>(
            self.client
                .get(format!("{}/data/2.5/weather", self.base_url))
                .query(&params),
            PROVIDER,
        );
        let forecast = get_json::<OwmForecast>(
            self.client
                .get(format!("{}/data/2.5/forecast", self.base_url))
                .query(&params),
            PROVIDER,
        );
        let (current, forecast) = tokio::try_join!(current, forecast)?;

        tracing::debug!(points = forecast.list.len(), "OpenWeatherMap forecast received");

        Ok(Weather {
            city: current.name,
            current: current.instant.into_instant()?,
            forecast: forecast
                .list
                .into_iter()
                .map(OwmInstant::into_instant)
                .collect::<Result<_>>()?,
            provider: PROVIDER.to_owned(),
            time_zone: String::new(),
        })
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherMap {
    async fn by_zip(&self, zip: u32) -> Result<Weather> {
        self.current_and_forecast(&[("zip", format!("{zip:05},us"))]).await
    }

    async fn by_coordinates(&self, latitude: f64, longitude: f64, time_zone: &str)
        -> Result<Weather> {
        let mut weather = self
            .current_and_forecast(&[("lat", latitude.to_string()), ("lon", longitude.to_string())])
            .await?;
        weather.time_zone = time_zone.to_owned();
        Ok(weather)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OwmCurrent {
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    instant: OwmInstant,
}

#[derive(Debug, Deserialize)]
struct OwmForecast {
    #[serde(default)]
    list: Vec<OwmInstant>,
}

#[derive(Debug, Deserialize)]
struct OwmInstant {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: OwmWind,
    #[serde(default)]
    clouds: OwmClouds,
    #[serde(default)]
    rain: OwmVolume,
    #[serde(default)]
    snow: OwmVolume,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    #[serde(default)]
    pressure: f64,
    #[serde(default)]
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwmClouds {
    #[serde(default)]
    all: f64,
}

/// Precipitation over the last three hours.
#[derive(Debug, Default, Deserialize)]
struct OwmVolume {
    #[serde(default, rename = "3h")]
    three_hours: f64,
}

fn whole_degrees(t: f64) -> i32 {
    t.round() as i32
}

impl OwmInstant {
    fn into_instant(self) -> Result<Instant> {
        let id = self
            .weather
            .last()
            .map(|c| c.id)
            .ok_or_else(|| SearchError::Parse("OpenWeatherMap response: no condition".into()))?;
        let code = WeatherCode::from_condition(id).ok_or_else(|| {
            SearchError::Parse(format!("OpenWeatherMap response: unknown condition {id}"))
        })?;
        let date = DateTime::from_timestamp(self.dt, 0).ok_or_else(|| {
            SearchError::Parse(format!("OpenWeatherMap response: bad timestamp {}", self.dt))
        })?;

        Ok(Instant {
            date,
            code,
            temperature: whole_degrees(self.main.temp),
            low: whole_degrees(self.main.temp_min),
            high: whole_degrees(self.main.temp_max),
            wind: self.wind.speed,
            clouds: self.clouds.all,
            rain: self.rain.three_hours,
            snow: self.snow.three_hours,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
        })
    }
}
