use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::location::Coordinates;
use crate::restaurant::RestaurantRecord;

/// Lifecycle of the current search, exactly one at a time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SearchSessionState {
  Idle,
  Searching,
  Success(Vec<RestaurantRecord>),
  Empty,
  Error(String),
}

impl SearchSessionState {
  pub fn name(&self) -> &'static str {
    match self {
      SearchSessionState::Idle => "idle",
      SearchSessionState::Searching => "searching",
      SearchSessionState::Success(_) => "success",
      SearchSessionState::Empty => "empty",
      SearchSessionState::Error(_) => "error",
    }
  }

  pub fn is_searching(&self) -> bool {
    matches!(self, SearchSessionState::Searching)
  }

  /// Records on display; empty for every state but `Success`
  pub fn results(&self) -> &[RestaurantRecord] {
    match self {
      SearchSessionState::Success(results) => results,
      _ => &[],
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      SearchSessionState::Error(message) => Some(message),
      _ => None,
    }
  }
}

/// Identity of one search invocation; later searches get larger tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
  pub fn value(&self) -> u64 {
    self.0
  }
}

impl std::fmt::Display for RequestToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
  /// A new search was invoked; coordinates replace the remembered user location
  SearchStarted { coordinates: Option<Coordinates> },
  /// The gateway resolved with records for `token`
  SearchSucceeded { token: RequestToken, results: Vec<RestaurantRecord> },
  /// The gateway failed for `token`; `message` is already user-facing
  SearchFailed { token: RequestToken, message: String },
  /// The device position for the near-me search `token` arrived
  LocationResolved { token: RequestToken, coordinates: Coordinates },
  /// The near-me search `token` could not get a position; no request is issued
  LocationFailed { token: RequestToken, message: String },
}

/// What a dispatched event did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// Entered `Searching` under a fresh token
  Started(RequestToken),
  /// The outcome belonged to the latest search and was applied
  Applied,
  /// The outcome was stale (or already applied) and was dropped
  Discarded { token: RequestToken, latest: Option<RequestToken> },
}

/// Explicit state container for the search lifecycle.
///
/// All mutation goes through [`SearchSession::dispatch`]. Outcomes are only
/// applied when their token is the most recently issued one, so a slow early
/// request can never overwrite a newer result.
#[derive(Debug, Clone)]
pub struct SearchSession {
  state: SearchSessionState,
  next_token: u64,
  latest: Option<RequestToken>,
  user_location: Option<Coordinates>,
  last_started_at: Option<DateTime<Utc>>,
}

impl Default for SearchSession {
  fn default() -> Self {
    Self::new()
  }
}

impl SearchSession {
  pub fn new() -> Self {
    Self {
      state: SearchSessionState::Idle,
      next_token: 1,
      latest: None,
      user_location: None,
      last_started_at: None,
    }
  }

  pub fn current_state(&self) -> &SearchSessionState {
    &self.state
  }

  /// Last coordinates supplied with a search, kept across searches
  pub fn user_location(&self) -> Option<Coordinates> {
    self.user_location
  }

  pub fn latest_token(&self) -> Option<RequestToken> {
    self.latest
  }

  pub fn last_started_at(&self) -> Option<DateTime<Utc>> {
    self.last_started_at
  }

  pub fn dispatch(&mut self, event: SessionEvent) -> Transition {
    match event {
      SessionEvent::SearchStarted { coordinates } => {
        let token = self.issue_token();
        self.last_started_at = Some(Utc::now());
        if coordinates.is_some() {
          self.user_location = coordinates;
        }
        // Drop previous results and error right away
        self.state = SearchSessionState::Searching;
        tracing::debug!(%token, "search started");
        Transition::Started(token)
      }
      SessionEvent::SearchSucceeded { token, results } => {
        if !self.accepts(token) {
          return self.discard(token);
        }
        tracing::debug!(%token, count = results.len(), "search resolved");
        self.state = if results.is_empty() {
          SearchSessionState::Empty
        } else {
          SearchSessionState::Success(results)
        };
        Transition::Applied
      }
      SessionEvent::SearchFailed { token, message } => {
        if !self.accepts(token) {
          return self.discard(token);
        }
        tracing::debug!(%token, "search failed");
        self.state = SearchSessionState::Error(message);
        Transition::Applied
      }
      SessionEvent::LocationResolved { token, coordinates } => {
        if !self.accepts(token) {
          return self.discard(token);
        }
        // Still searching; only the remembered location changes
        self.user_location = Some(coordinates);
        Transition::Applied
      }
      SessionEvent::LocationFailed { token, message } => {
        if !self.accepts(token) {
          return self.discard(token);
        }
        tracing::debug!(%token, "location request failed");
        self.state = SearchSessionState::Error(message);
        Transition::Applied
      }
    }
  }

  fn issue_token(&mut self) -> RequestToken {
    let token = RequestToken(self.next_token);
    self.next_token += 1;
    self.latest = Some(token);
    token
  }

  fn accepts(&self, token: RequestToken) -> bool {
    self.latest == Some(token) && self.state.is_searching()
  }

  fn discard(&self, token: RequestToken) -> Transition {
    tracing::debug!(%token, latest = ?self.latest, "discarding stale search outcome");
    Transition::Discarded { token, latest: self.latest }
  }
}
