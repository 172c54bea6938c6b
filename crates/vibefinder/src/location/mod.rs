//! Turning user input into a normalized location query
//!
//! A query comes either from free text typed by the user or from a one-shot
//! device position request. Device positions are reached through the
//! [`GeolocationProvider`] trait so the platform capability can be swapped
//! (or mocked) without touching the resolver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod providers;

pub use providers::{provider_from_config, FixedPosition, IpGeolocation, NoGeolocation};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("Please enter a location")]
  EmptyInput,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
  #[error("Geolocation is not supported on this device")]
  Unsupported,

  #[error("Location access was denied: {0}")]
  Denied(String),

  #[error("Unable to get your location: {0}")]
  Unavailable(String),
}

impl GeolocationError {
  pub fn denied(reason: impl Into<String>) -> Self {
    Self::Denied(reason.into())
  }

  pub fn unavailable(reason: impl Into<String>) -> Self {
    Self::Unavailable(reason.into())
  }
}

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude: f64,
  pub longitude: f64,
}

impl Coordinates {
  /// Returns `None` for non-finite or out-of-range values
  pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
    let valid = latitude.is_finite()
      && longitude.is_finite()
      && (-90.0..=90.0).contains(&latitude)
      && (-180.0..=180.0).contains(&longitude);
    valid.then_some(Self { latitude, longitude })
  }

  /// Both components are non-zero.
  ///
  /// The backend treats a zero component as "no location", so a pair with a
  /// zero is never sent as user coordinates.
  pub fn is_truthy(&self) -> bool {
    self.latitude != 0.0 && self.longitude != 0.0
  }

  /// Display label for a near-me search, fixed to four decimals
  pub fn near_me_label(&self) -> String {
    format!("Near me ({:.4}, {:.4})", self.latitude, self.longitude)
  }

  /// Raw `"<lat>,<lng>"` form the backend geocodes as a location
  pub fn as_query_text(&self) -> String {
    format!("{},{}", self.latitude, self.longitude)
  }
}

/// A normalized search location.
///
/// Without coordinates the text is guaranteed non-empty after trimming; with
/// coordinates the text is a label derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
  text: String,
  coordinates: Option<Coordinates>,
}

impl LocationQuery {
  pub fn from_text(input: &str) -> Result<Self, ValidationError> {
    let text = input.trim();
    if text.is_empty() {
      return Err(ValidationError::EmptyInput);
    }
    Ok(Self { text: text.to_string(), coordinates: None })
  }

  /// Text query that also carries the user's position for distance labels
  pub fn from_text_with_coordinates(
    input: &str,
    coordinates: Coordinates,
  ) -> Result<Self, ValidationError> {
    let mut query = Self::from_text(input)?;
    query.coordinates = Some(coordinates);
    Ok(query)
  }

  pub fn near(coordinates: Coordinates) -> Self {
    Self { text: coordinates.near_me_label(), coordinates: Some(coordinates) }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn coordinates(&self) -> Option<Coordinates> {
    self.coordinates
  }

  /// True when this query came from a device position rather than typed text
  pub fn is_near_me(&self) -> bool {
    self.coordinates.is_some_and(|c| self.text == c.near_me_label())
  }
}

/// Platform capability for a one-shot device position request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
  /// Short name used in logs
  fn name(&self) -> &'static str;

  /// Request the current position once; may wait on user permission
  async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Resolves raw user input or the device position into a [`LocationQuery`]
pub struct LocationResolver {
  provider: Box<dyn GeolocationProvider>,
}

impl LocationResolver {
  pub fn new(provider: Box<dyn GeolocationProvider>) -> Self {
    Self { provider }
  }

  pub fn resolve_from_text(&self, input: &str) -> Result<LocationQuery, ValidationError> {
    LocationQuery::from_text(input)
  }

  pub async fn resolve_from_device_location(&self) -> Result<LocationQuery, GeolocationError> {
    tracing::debug!(provider = self.provider.name(), "requesting device position");

    let position = self.provider.current_position().await.map_err(|e| {
      tracing::warn!(provider = self.provider.name(), error = %e, "device position request failed");
      e
    })?;

    // Providers are external; never trust them to return sane numbers
    let coordinates = Coordinates::new(position.latitude, position.longitude).ok_or_else(|| {
      GeolocationError::unavailable(format!(
        "provider returned invalid coordinates ({}, {})",
        position.latitude, position.longitude
      ))
    })?;

    Ok(LocationQuery::near(coordinates))
  }
}
