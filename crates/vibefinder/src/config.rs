//! Client configuration
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! explicit overrides (CLI flags, which clap already fills from environment
//! variables). Library users without a CLI can build overrides with
//! [`ConfigOverrides::from_env`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::location::Coordinates;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IP_GEO_URL: &str = "http://ip-api.com/json";

/// Upper bound the search API accepts for `max_results`
pub const MAX_RESULTS_LIMIT: u32 = 20;

pub const API_URL_ENV: &str = "VIBEFINDER_API_URL";
pub const MAX_RESULTS_ENV: &str = "VIBEFINDER_MAX_RESULTS";
pub const TIMEOUT_ENV: &str = "VIBEFINDER_TIMEOUT_SECS";
pub const GEO_PROVIDER_ENV: &str = "VIBEFINDER_GEO_PROVIDER";
pub const LAT_ENV: &str = "VIBEFINDER_LAT";
pub const LNG_ENV: &str = "VIBEFINDER_LNG";
pub const GEO_URL_ENV: &str = "VIBEFINDER_GEO_URL";
pub const CONFIG_PATH_ENV: &str = "VIBEFINDER_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Invalid API URL '{url}': {reason}")]
  InvalidUrl { url: String, reason: String },

  #[error("Invalid value '{value}' for {key}")]
  InvalidValue { key: String, value: String },

  #[error("Failed to read config file {}: {message}", path.display())]
  File { path: PathBuf, message: String },
}

impl ConfigError {
  pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::InvalidUrl { url: url.into(), reason: reason.into() }
  }

  pub fn invalid_value(key: impl Into<String>, value: impl ToString) -> Self {
    Self::InvalidValue { key: key.into(), value: value.to_string() }
  }

  pub fn file(path: &Path, message: impl Into<String>) -> Self {
    Self::File { path: path.to_path_buf(), message: message.into() }
  }
}

/// Which device-location capability the client should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GeoProviderKind {
  /// No location capability; near-me searches report "unsupported"
  #[default]
  None,
  /// Coordinates supplied up front through config or flags
  Fixed,
  /// One-shot lookup against an IP geolocation service
  Ip,
}

impl std::str::FromStr for GeoProviderKind {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "none" => Ok(Self::None),
      "fixed" => Ok(Self::Fixed),
      "ip" => Ok(Self::Ip),
      _ => Err(ConfigError::invalid_value(GEO_PROVIDER_ENV, s)),
    }
  }
}

/// Base URL of the search backend, remembering whether it is the built-in default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
  base_url: String,
  is_default: bool,
}

impl Default for ApiEndpoint {
  fn default() -> Self {
    Self { base_url: DEFAULT_API_BASE.to_string(), is_default: true }
  }
}

impl ApiEndpoint {
  /// Parse a user-supplied base URL; only http(s) is accepted
  pub fn parse(raw: &str) -> Result<Self, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::invalid_url(raw, e.to_string()))?;

    match url.scheme() {
      "http" | "https" => {}
      other => {
        return Err(ConfigError::invalid_url(raw, format!("unsupported scheme '{other}'")));
      }
    }

    Ok(Self { base_url: trimmed.to_string(), is_default: false })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn is_default(&self) -> bool {
    self.is_default
  }

  /// Human-readable description used in error messages
  pub fn describe(&self) -> String {
    if self.is_default {
      format!("{} (default; set {} to override)", self.base_url, API_URL_ENV)
    } else {
      self.base_url.clone()
    }
  }
}

/// Optional values layered over the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
  pub api_url: Option<String>,
  pub max_results: Option<u32>,
  pub timeout_secs: Option<u64>,
  pub geo_provider: Option<GeoProviderKind>,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub geo_url: Option<String>,
}

impl ConfigOverrides {
  /// Read overrides from `VIBEFINDER_*` environment variables
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      api_url: env_string(API_URL_ENV),
      max_results: env_parsed(MAX_RESULTS_ENV)?,
      timeout_secs: env_parsed(TIMEOUT_ENV)?,
      geo_provider: env_string(GEO_PROVIDER_ENV).map(|v| v.parse()).transpose()?,
      latitude: env_parsed(LAT_ENV)?,
      longitude: env_parsed(LNG_ENV)?,
      geo_url: env_string(GEO_URL_ENV),
    })
  }

  /// Values set in `other` win over values set in `self`
  pub fn merge(self, other: ConfigOverrides) -> Self {
    Self {
      api_url: other.api_url.or(self.api_url),
      max_results: other.max_results.or(self.max_results),
      timeout_secs: other.timeout_secs.or(self.timeout_secs),
      geo_provider: other.geo_provider.or(self.geo_provider),
      latitude: other.latitude.or(self.latitude),
      longitude: other.longitude.or(self.longitude),
      geo_url: other.geo_url.or(self.geo_url),
    }
  }
}

fn env_string(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
  match env_string(key) {
    Some(raw) => {
      raw.trim().parse().map(Some).map_err(|_| ConfigError::invalid_value(key, raw))
    }
    None => Ok(None),
  }
}

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FinderConfig {
  pub api: ApiEndpoint,
  pub max_results: u32,
  pub timeout_secs: u64,
  pub geo_provider: GeoProviderKind,
  pub fixed_position: Option<Coordinates>,
  pub geo_url: String,
}

impl Default for FinderConfig {
  fn default() -> Self {
    Self {
      api: ApiEndpoint::default(),
      max_results: DEFAULT_MAX_RESULTS,
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      geo_provider: GeoProviderKind::None,
      fixed_position: None,
      geo_url: DEFAULT_IP_GEO_URL.to_string(),
    }
  }
}

impl FinderConfig {
  /// Defaults, then the config file (if any), then `overrides`
  pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
    let from_file = match config_path.map(Path::to_path_buf).or_else(default_config_path) {
      Some(path) if path.exists() => read_config_file(&path)?,
      Some(path) if config_path.is_some() => {
        return Err(ConfigError::file(&path, "file does not exist"));
      }
      _ => ConfigOverrides::default(),
    };

    Self::from_overrides(from_file.merge(overrides))
  }

  /// Apply a set of overrides to the built-in defaults
  pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
    let mut config = Self::default();

    if let Some(url) = overrides.api_url {
      config.api = ApiEndpoint::parse(&url)?;
    }

    if let Some(max_results) = overrides.max_results {
      if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
        return Err(ConfigError::invalid_value("max_results", max_results));
      }
      config.max_results = max_results;
    }

    if let Some(timeout) = overrides.timeout_secs {
      if timeout == 0 {
        return Err(ConfigError::invalid_value("timeout_secs", timeout));
      }
      config.timeout_secs = timeout;
    }

    if let Some(url) = overrides.geo_url {
      config.geo_url = url;
    }

    config.fixed_position = match (overrides.latitude, overrides.longitude) {
      (Some(latitude), Some(longitude)) => Some(
        Coordinates::new(latitude, longitude)
          .ok_or_else(|| ConfigError::invalid_value("coordinates", format!("{latitude},{longitude}")))?,
      ),
      (None, None) => None,
      (lat, lng) => {
        return Err(ConfigError::invalid_value(
          "coordinates",
          format!("latitude={lat:?} longitude={lng:?} (both are required)"),
        ));
      }
    };

    config.geo_provider = match overrides.geo_provider {
      Some(kind) => kind,
      // Supplying a position implies the fixed provider
      None if config.fixed_position.is_some() => GeoProviderKind::Fixed,
      None => GeoProviderKind::None,
    };

    if config.geo_provider == GeoProviderKind::Fixed && config.fixed_position.is_none() {
      return Err(ConfigError::invalid_value(
        "geo_provider",
        "fixed (requires latitude and longitude)",
      ));
    }

    Ok(config)
  }
}

/// `$VIBEFINDER_CONFIG`, else `<config dir>/vibefinder/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
  if let Some(path) = env_string(CONFIG_PATH_ENV) {
    return Some(PathBuf::from(path));
  }
  dirs::config_dir().map(|dir| dir.join("vibefinder").join("config.yaml"))
}

fn read_config_file(path: &Path) -> Result<ConfigOverrides, ConfigError> {
  let content = std::fs::read_to_string(path).map_err(|e| ConfigError::file(path, e.to_string()))?;
  if content.trim().is_empty() {
    return Ok(ConfigOverrides::default());
  }
  serde_yaml::from_str(&content).map_err(|e| ConfigError::file(path, e.to_string()))
}
