use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::location::{locate_caller, City, Geolocator};
use crate::error::Result;
use crate::instant::answer::{AnswerKind, Solution};
use crate::instant::answerer::{compile, not_configured, Answerer, MatchResult};
use crate::query::QueryContext;

/// Where to center the map, and the route when directions were asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapAnswer {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "long")]
    pub longitude: f64,
    pub directions: bool,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
}

pub struct Maps {
    patterns: Vec<Regex>,
    geolocator: Option<Arc<dyn Geolocator>>,
}

impl Maps {
    pub fn new(geolocator: Option<Arc<dyn Geolocator>>) -> Result<Self> {
        Ok(Self {
            patterns: compile(&[
                r"^(?P<trigger>map|maps|direction|directions)$",
                r"^(?P<trigger>directions) to (?P<end>.+)$",
                r"^(?P<trigger>directions) (?P<start>.+) to (?P<end>.+)$",
                r"^(?P<start>.+) to (?P<end>.+) (?P<trigger>directions)$",
                r"^(?P<end>.+) (?P<trigger>directions)$",
                r"^(?P<trigger>map|maps|direction|directions) (?P<remainder>.+)$",
                r"^(?P<remainder>.+) (?P<trigger>map|maps|direction)$",
            ])?,
            geolocator,
        })
    }
}

fn place(city: &City) -> String {
    [city.city.as_str(), city.state.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Answerer for Maps {
    fn kind(&self) -> AnswerKind {
        AnswerKind::Maps
    }

    fn triggers(&self) -> &[Regex] {
        &self.patterns
    }

    async fn solve(&self, m: &MatchResult, ctx: &QueryContext) -> Result<Solution> {
        let geo = self
            .geolocator
            .as_ref()
            .ok_or_else(|| not_configured("geolocation"))?;
        let city = locate_caller(geo.as_ref(), ctx).await?;

        let destination = m.field("end").unwrap_or_default().to_owned();
        let directions = !destination.is_empty();
        let origin = match m.field("start") {
            Some(start) => start.to_owned(),
            None if directions => place(&city),
            None => String::new(),
        };
        Ok(Solution::Map(MapAnswer {
            latitude: city.latitude,
            longitude: city.longitude,
            directions,
            origin,
            destination,
        }))
    }
}
