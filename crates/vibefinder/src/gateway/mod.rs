//! Outbound search requests
//!
//! [`SearchGateway`] is the seam between the session logic and the search
//! backend. The HTTP implementation lives in [`http`]; tests substitute their
//! own gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ApiEndpoint;
use crate::location::{Coordinates, LocationQuery};
use crate::restaurant::RestaurantRecord;

pub mod http;

pub use http::HttpSearchGateway;

pub const SEARCH_PATH: &str = "/api/v1/search";
pub const HEALTH_PATH: &str = "/health";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
  #[error("Search request could not complete: {0}")]
  Transport(String),

  #[error("Search API responded with HTTP {0}")]
  BadResponse(u16),

  #[error("Search API returned an unreadable payload: {0}")]
  DecodeFailure(String),
}

impl SearchError {
  pub fn transport(message: impl Into<String>) -> Self {
    Self::Transport(message.into())
  }

  pub fn decode_failure(message: impl Into<String>) -> Self {
    Self::DecodeFailure(message.into())
  }

  /// Stable short name for log fields
  pub fn kind(&self) -> &'static str {
    match self {
      SearchError::Transport(_) => "transport",
      SearchError::BadResponse(_) => "bad_response",
      SearchError::DecodeFailure(_) => "decode_failure",
    }
  }
}

/// Everything needed to issue one search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequestParams {
  pub location_text: String,
  pub max_results: u32,
  pub user_coordinates: Option<Coordinates>,
}

impl SearchRequestParams {
  pub fn from_query(query: &LocationQuery, max_results: u32) -> Self {
    // Near-me queries send the raw pair for geocoding; the label is display-only
    let location_text = match query.coordinates() {
      Some(coords) if query.is_near_me() => coords.as_query_text(),
      _ => query.text().to_string(),
    };

    Self { location_text, max_results, user_coordinates: query.coordinates() }
  }

  /// Percent-encoded query string, without the leading `?`
  pub fn query_string(&self) -> String {
    let mut query = format!(
      "location={}&max_results={}",
      urlencoding::encode(&self.location_text),
      self.max_results
    );

    if let Some(coords) = self.user_coordinates.filter(Coordinates::is_truthy) {
      query.push_str(&format!("&user_lat={}&user_lng={}", coords.latitude, coords.longitude));
    }

    query
  }

  /// Full request URL against `base_url`
  pub fn to_url(&self, base_url: &str) -> String {
    format!("{}{}?{}", base_url.trim_end_matches('/'), SEARCH_PATH, self.query_string())
  }
}

/// Body of the backend's `/health` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendHealth {
  pub status: String,
  #[serde(default)]
  pub service: Option<String>,
}

impl BackendHealth {
  pub fn is_healthy(&self) -> bool {
    self.status.eq_ignore_ascii_case("healthy")
  }
}

/// Search backend abstraction; implementations must not retry on their own
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
  /// Run one search; resolves with the records in backend order
  async fn search(&self, params: &SearchRequestParams) -> Result<Vec<RestaurantRecord>, SearchError>;

  /// Probe the backend's health endpoint
  async fn health(&self) -> Result<BackendHealth, SearchError>;

  /// The endpoint this gateway talks to, for user-facing messages
  fn endpoint(&self) -> &ApiEndpoint;
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params(text: &str, coords: Option<Coordinates>) -> SearchRequestParams {
    SearchRequestParams { location_text: text.to_string(), max_results: 10, user_coordinates: coords }
  }

  #[test]
  fn test_text_query_has_no_coordinates() {
    let query = LocationQuery::from_text("Pizza Boston").unwrap();
    let params = SearchRequestParams::from_query(&query, 10);

    assert_eq!(params.location_text, "Pizza Boston");
    assert_eq!(params.query_string(), "location=Pizza%20Boston&max_results=10");
  }

  #[test]
  fn test_near_me_query_sends_raw_pair_and_coordinates() {
    let query = LocationQuery::near(Coordinates::new(42.3601, -71.0589).unwrap());
    let params = SearchRequestParams::from_query(&query, 10);

    assert_eq!(params.location_text, "42.3601,-71.0589");
    assert_eq!(
      params.query_string(),
      "location=42.3601%2C-71.0589&max_results=10&user_lat=42.3601&user_lng=-71.0589"
    );
  }

  #[test]
  fn test_text_query_with_coordinates_keeps_text() {
    let coords = Coordinates::new(40.7128, -74.006).unwrap();
    let query = LocationQuery::from_text_with_coordinates("Sushi NYC", coords).unwrap();
    let params = SearchRequestParams::from_query(&query, 5);

    assert_eq!(
      params.query_string(),
      "location=Sushi%20NYC&max_results=5&user_lat=40.7128&user_lng=-74.006"
    );
  }

  #[test]
  fn test_zero_component_coordinates_are_not_sent() {
    let coords = Coordinates::new(0.0, -71.0589).unwrap();
    assert_eq!(params("Accra", Some(coords)).query_string(), "location=Accra&max_results=10");
  }

  #[test]
  fn test_special_characters_are_encoded() {
    assert_eq!(
      params("Joe's Pizza & Co/Main", None).query_string(),
      "location=Joe%27s%20Pizza%20%26%20Co%2FMain&max_results=10"
    );
  }

  #[test]
  fn test_to_url_joins_base() {
    assert_eq!(
      params("Boston", None).to_url("http://localhost:8000/"),
      "http://localhost:8000/api/v1/search?location=Boston&max_results=10"
    );
  }

  #[test]
  fn test_error_kinds() {
    assert_eq!(SearchError::transport("refused").kind(), "transport");
    assert_eq!(SearchError::BadResponse(500).kind(), "bad_response");
    assert_eq!(SearchError::decode_failure("eof").kind(), "decode_failure");
  }

  #[test]
  fn test_health_status_is_case_insensitive() {
    let health = BackendHealth { status: "Healthy".to_string(), service: None };
    assert!(health.is_healthy());
    let health = BackendHealth { status: "degraded".to_string(), service: None };
    assert!(!health.is_healthy());
  }
}
