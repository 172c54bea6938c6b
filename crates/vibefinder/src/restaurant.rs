use serde::{Deserialize, Serialize};

/// Sentiment summary the backend sends when it has no analysis for a place
pub const NO_SENTIMENT: &str = "N/A";

/// Vibe tag the backend puts first when no reviews could be scraped
pub const NO_REVIEWS_TAG: &str = "#NoReviewsAvailable";

/// A restaurant exactly as the search API returns it.
///
/// Field names follow the backend's JSON. Sequences missing from the payload
/// decode as empty so older backends still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
  pub name: String,
  pub rating: f64,
  #[serde(rename = "trueSentiment")]
  pub sentiment_summary: String,
  #[serde(rename = "vibeCheck", default)]
  pub vibe_tags: Vec<String>,
  #[serde(rename = "mustTryDishes", default)]
  pub recommended_dishes: Vec<String>,
  #[serde(rename = "commonComplaints", default)]
  pub known_complaints: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address: Option<String>,
  #[serde(rename = "distance", default, skip_serializing_if = "Option::is_none")]
  pub distance_label: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub place_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lat: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lng: Option<f64>,
}

impl RestaurantRecord {
  /// Minimal record with only the required fields set
  pub fn new(name: impl Into<String>, rating: f64, sentiment_summary: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      rating,
      sentiment_summary: sentiment_summary.into(),
      vibe_tags: Vec::new(),
      recommended_dishes: Vec::new(),
      known_complaints: Vec::new(),
      address: None,
      distance_label: None,
      photo_url: None,
      place_id: None,
      lat: None,
      lng: None,
    }
  }

  pub fn with_vibe_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.vibe_tags = tags.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_dishes<I, S>(mut self, dishes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.recommended_dishes = dishes.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_complaints<I, S>(mut self, complaints: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.known_complaints = complaints.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_address(mut self, address: impl Into<String>) -> Self {
    self.address = Some(address.into());
    self
  }
}
