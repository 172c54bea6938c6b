//! HTTP client for the VibeFinder search API

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{BackendHealth, SearchError, SearchGateway, SearchRequestParams, HEALTH_PATH};
use crate::config::{ApiEndpoint, FinderConfig};
use crate::restaurant::RestaurantRecord;

/// Talks to the search backend over HTTP. One request per call, no retries.
pub struct HttpSearchGateway {
  client: Client,
  endpoint: ApiEndpoint,
}

impl HttpSearchGateway {
  pub fn new(endpoint: ApiEndpoint, timeout_secs: u64) -> Result<Self, reqwest::Error> {
    let client = Client::builder().timeout(Duration::from_secs(timeout_secs)).build()?;
    Ok(Self { client, endpoint })
  }

  pub fn from_config(config: &FinderConfig) -> Result<Self, reqwest::Error> {
    Self::new(config.api.clone(), config.timeout_secs)
  }

  async fn get_body(&self, url: &str) -> Result<String, SearchError> {
    let response = self.client.get(url).send().await.map_err(|e| {
      let reason = if e.is_timeout() { "timed out".to_string() } else { e.to_string() };
      SearchError::transport(reason)
    })?;

    let status = response.status();
    if !status.is_success() {
      tracing::debug!(url, status = status.as_u16(), "search API returned an error status");
      return Err(SearchError::BadResponse(status.as_u16()));
    }

    response.text().await.map_err(|e| SearchError::transport(format!("reading body: {e}")))
  }
}

#[async_trait]
impl SearchGateway for HttpSearchGateway {
  async fn search(&self, params: &SearchRequestParams) -> Result<Vec<RestaurantRecord>, SearchError> {
    let url = params.to_url(self.endpoint.base_url());
    tracing::debug!(%url, "sending search request");

    let body = self.get_body(&url).await?;
    let records: Vec<RestaurantRecord> =
      serde_json::from_str(&body).map_err(|e| SearchError::decode_failure(e.to_string()))?;

    tracing::debug!(count = records.len(), "search request decoded");
    Ok(records)
  }

  async fn health(&self) -> Result<BackendHealth, SearchError> {
    let url = format!("{}{}", self.endpoint.base_url(), HEALTH_PATH);
    let body = self.get_body(&url).await?;
    serde_json::from_str(&body).map_err(|e| SearchError::decode_failure(e.to_string()))
  }

  fn endpoint(&self) -> &ApiEndpoint {
    &self.endpoint
  }
}
