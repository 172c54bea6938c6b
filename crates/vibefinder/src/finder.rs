//! Search orchestration: resolve a location, query the gateway, and feed the
//! outcome into the session.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ApiEndpoint, FinderConfig};
use crate::gateway::{HttpSearchGateway, SearchError, SearchGateway, SearchRequestParams};
use crate::location::{
  provider_from_config, Coordinates, GeolocationError, LocationQuery, LocationResolver,
  ValidationError,
};
use crate::session::{RequestToken, SearchSession, SearchSessionState, SessionEvent, Transition};

/// User-facing text for a failed search. The error kind is only logged.
pub fn search_failure_message(endpoint: &ApiEndpoint) -> String {
  format!("Failed to fetch restaurants. Make sure the backend is running on {}", endpoint.describe())
}

pub fn location_failure_message(error: &GeolocationError) -> String {
  match error {
    GeolocationError::Unsupported => {
      "Geolocation is not supported here. Please enter a location instead.".to_string()
    }
    GeolocationError::Denied(_) | GeolocationError::Unavailable(_) => {
      "Unable to get your location. Please enter it manually.".to_string()
    }
  }
}

/// Consumer-facing entry point tying resolver, gateway and session together.
///
/// Methods take `&self` so several searches can be in flight on one task; the
/// session lock is only held for synchronous dispatches.
pub struct Finder {
  gateway: Arc<dyn SearchGateway>,
  resolver: LocationResolver,
  session: Mutex<SearchSession>,
  max_results: u32,
}

impl Finder {
  pub fn new(gateway: Arc<dyn SearchGateway>, resolver: LocationResolver, max_results: u32) -> Self {
    Self { gateway, resolver, session: Mutex::new(SearchSession::new()), max_results }
  }

  /// HTTP gateway plus the configured geolocation provider
  pub fn from_config(config: &FinderConfig) -> anyhow::Result<Self> {
    let gateway = HttpSearchGateway::from_config(config)?;
    let resolver = LocationResolver::new(provider_from_config(config)?);
    Ok(Self::new(Arc::new(gateway), resolver, config.max_results))
  }

  /// Text search, optionally carrying the user's coordinates.
  ///
  /// Empty input is rejected before anything is dispatched, so the session
  /// never passes through `Searching` for it.
  pub async fn search(
    &self,
    text: &str,
    coordinates: Option<Coordinates>,
  ) -> Result<Transition, ValidationError> {
    let query = match coordinates {
      Some(coords) => LocationQuery::from_text_with_coordinates(text, coords)?,
      None => self.resolver.resolve_from_text(text)?,
    };

    let started = self.start(query.coordinates());
    let Transition::Started(token) = started else {
      return Ok(started);
    };
    Ok(self.run(token, query).await)
  }

  /// Search around the device's current position.
  ///
  /// The token is taken before waiting on the provider, so a search invoked
  /// while the position is pending still wins.
  pub async fn near_me(&self) -> Transition {
    let started = self.start(None);
    let Transition::Started(token) = started else {
      return started;
    };

    let query = match self.resolver.resolve_from_device_location().await {
      Ok(query) => query,
      Err(error) => {
        let message = location_failure_message(&error);
        return self.session().dispatch(SessionEvent::LocationFailed { token, message });
      }
    };

    if let Some(coordinates) = query.coordinates() {
      let resolved = self.session().dispatch(SessionEvent::LocationResolved { token, coordinates });
      if let Transition::Discarded { .. } = resolved {
        tracing::info!(%token, "near-me search superseded while locating");
        return resolved;
      }
    }

    self.run(token, query).await
  }

  pub fn current_state(&self) -> SearchSessionState {
    self.session().current_state().clone()
  }

  pub fn user_location(&self) -> Option<Coordinates> {
    self.session().user_location()
  }

  pub fn endpoint(&self) -> &ApiEndpoint {
    self.gateway.endpoint()
  }

  pub fn gateway(&self) -> &Arc<dyn SearchGateway> {
    &self.gateway
  }

  pub fn last_started_at(&self) -> Option<DateTime<Utc>> {
    self.session().last_started_at()
  }

  fn start(&self, coordinates: Option<Coordinates>) -> Transition {
    self.session().dispatch(SessionEvent::SearchStarted { coordinates })
  }

  async fn run(&self, token: RequestToken, query: LocationQuery) -> Transition {
    let params = SearchRequestParams::from_query(&query, self.max_results);
    tracing::info!(%token, location = query.text(), "searching");

    let event = match self.gateway.search(&params).await {
      Ok(results) => SessionEvent::SearchSucceeded { token, results },
      Err(error) => {
        self.log_failure(&error);
        SessionEvent::SearchFailed { token, message: search_failure_message(self.endpoint()) }
      }
    };

    let transition = self.session().dispatch(event);
    if let Transition::Discarded { .. } = transition {
      tracing::info!(%token, "search superseded by a newer one");
    }
    transition
  }

  fn log_failure(&self, error: &SearchError) {
    tracing::warn!(
      kind = error.kind(),
      base_url = self.endpoint().base_url(),
      error = %error,
      "search request failed"
    );
  }

  fn session(&self) -> MutexGuard<'_, SearchSession> {
    self.session.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
