use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{Coordinates, GeolocationError, GeolocationProvider};
use crate::config::{FinderConfig, GeoProviderKind};

/// No location capability at all
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
  fn name(&self) -> &'static str {
    "none"
  }

  async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
    Err(GeolocationError::Unsupported)
  }
}

/// Position supplied up front (config file, env or flags)
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
  coordinates: Coordinates,
}

impl FixedPosition {
  pub fn new(coordinates: Coordinates) -> Self {
    Self { coordinates }
  }
}

#[async_trait]
impl GeolocationProvider for FixedPosition {
  fn name(&self) -> &'static str {
    "fixed"
  }

  async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
    Ok(self.coordinates)
  }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
  status: String,
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  lat: Option<f64>,
  #[serde(default)]
  lon: Option<f64>,
}

/// One-shot position lookup against an ip-api compatible endpoint
pub struct IpGeolocation {
  client: Client,
  url: String,
}

impl IpGeolocation {
  pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, reqwest::Error> {
    let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
    Ok(Self { client, url: url.into() })
  }
}

#[async_trait]
impl GeolocationProvider for IpGeolocation {
  fn name(&self) -> &'static str {
    "ip"
  }

  async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
    let response = self
      .client
      .get(&self.url)
      .send()
      .await
      .map_err(|e| GeolocationError::unavailable(format!("lookup request failed: {e}")))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      return Err(GeolocationError::denied(format!("lookup service refused access (HTTP {status})")));
    }
    if !status.is_success() {
      return Err(GeolocationError::unavailable(format!("lookup service returned HTTP {status}")));
    }

    let body: IpLookupResponse = response
      .json()
      .await
      .map_err(|e| GeolocationError::unavailable(format!("unreadable lookup response: {e}")))?;

    if body.status != "success" {
      let reason = body.message.unwrap_or_else(|| body.status.clone());
      return Err(GeolocationError::unavailable(format!("lookup failed: {reason}")));
    }

    match (body.lat, body.lon) {
      (Some(lat), Some(lon)) => Ok(Coordinates { latitude: lat, longitude: lon }),
      _ => Err(GeolocationError::unavailable("lookup response had no coordinates")),
    }
  }
}

/// Build the provider selected by the configuration
pub fn provider_from_config(
  config: &FinderConfig,
) -> anyhow::Result<Box<dyn GeolocationProvider>> {
  match config.geo_provider {
    GeoProviderKind::None => Ok(Box::new(NoGeolocation)),
    GeoProviderKind::Fixed => {
      let coordinates = config
        .fixed_position
        .ok_or_else(|| anyhow::anyhow!("fixed geolocation requires latitude and longitude"))?;
      Ok(Box::new(FixedPosition::new(coordinates)))
    }
    GeoProviderKind::Ip => Ok(Box::new(IpGeolocation::new(&config.geo_url, config.timeout_secs)?)),
  }
}
