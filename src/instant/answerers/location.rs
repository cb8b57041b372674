//! IP geolocation, shared by maps and local weather.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{JiveError, Result};
use crate::query::QueryContext;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city: String,
    pub state: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub time_zone: String,
}

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self, ip: IpAddr) -> Result<City>;
}

/// Geolocate the caller of `ctx`.
pub(crate) async fn locate_caller(geo: &dyn Geolocator, ctx: &QueryContext) -> Result<City> {
    let ip = ctx
        .client_ip
        .ok_or_else(|| JiveError::InvalidInput("client address unknown".into()))?;
    geo.locate(ip).await
}
