use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use vibefinder::commands::{self, OutputFormat};
use vibefinder::config::{ConfigOverrides, FinderConfig, GeoProviderKind};
use vibefinder::location::Coordinates;
use vibefinder::{display, Finder};

#[derive(Parser)]
#[command(name = "vibefinder")]
#[command(about = "Find the vibe of a restaurant before you go")]
#[command(version)]
struct Cli {
  /// Base URL of the search API
  #[arg(long, global = true, env = "VIBEFINDER_API_URL")]
  api_url: Option<String>,

  /// Maximum number of restaurants to request (1-20)
  #[arg(long, global = true, env = "VIBEFINDER_MAX_RESULTS")]
  max_results: Option<u32>,

  /// HTTP request timeout in seconds
  #[arg(long, global = true, env = "VIBEFINDER_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,

  /// Geolocation provider used by `near`
  #[arg(long, global = true, env = "VIBEFINDER_GEO_PROVIDER")]
  geo_provider: Option<GeoProviderKind>,

  /// IP geolocation endpoint for the `ip` provider
  #[arg(long, global = true, env = "VIBEFINDER_GEO_URL")]
  geo_url: Option<String>,

  /// Config file (defaults to <config dir>/vibefinder/config.yaml)
  #[arg(long, global = true, env = "VIBEFINDER_CONFIG")]
  config: Option<PathBuf>,

  /// Output format
  #[arg(short, long, global = true, default_value = "pretty")]
  format: OutputFormat,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Search restaurants by location or name
  Search {
    /// Free-text query, e.g. "Pizza Boston"
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
    /// Your latitude, used for distance labels
    #[arg(long, requires = "lng", allow_hyphen_values = true, env = "VIBEFINDER_LAT")]
    lat: Option<f64>,
    /// Your longitude, used for distance labels
    #[arg(long, requires = "lat", allow_hyphen_values = true, env = "VIBEFINDER_LNG")]
    lng: Option<f64>,
  },
  /// Search restaurants around your current position
  Near {
    /// Latitude to use instead of asking the geolocation provider
    #[arg(long, requires = "lng", allow_hyphen_values = true, env = "VIBEFINDER_LAT")]
    lat: Option<f64>,
    /// Longitude to use instead of asking the geolocation provider
    #[arg(long, requires = "lat", allow_hyphen_values = true, env = "VIBEFINDER_LNG")]
    lng: Option<f64>,
  },
  /// Check that the search API is reachable
  Health,
}

fn init_tracing(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("vibefinder=debug,warn")
    } else {
      EnvFilter::new("vibefinder=warn,error")
    }
  });

  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();
}

fn overrides_from(cli: &Cli) -> ConfigOverrides {
  let (latitude, longitude) = match &cli.command {
    Commands::Search { lat, lng, .. } | Commands::Near { lat, lng } => (*lat, *lng),
    Commands::Health => (None, None),
  };

  ConfigOverrides {
    api_url: cli.api_url.clone(),
    max_results: cli.max_results,
    timeout_secs: cli.timeout_secs,
    geo_provider: cli.geo_provider,
    latitude,
    longitude,
    geo_url: cli.geo_url.clone(),
  }
}

async fn run(cli: Cli) -> Result<ExitCode> {
  let config = FinderConfig::load(cli.config.as_deref(), overrides_from(&cli))
    .context("Failed to load configuration")?;
  tracing::debug!(base_url = config.api.base_url(), provider = ?config.geo_provider, "configured");

  let finder = Finder::from_config(&config).context("Failed to set up search client")?;

  match cli.command {
    Commands::Search { query, lat, lng } => {
      let coordinates = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(
          Coordinates::new(lat, lng)
            .with_context(|| format!("Invalid coordinates: {lat}, {lng}"))?,
        ),
        _ => None,
      };
      commands::search::handle(&finder, &query.join(" "), coordinates, cli.format).await
    }
    Commands::Near { .. } => commands::near::handle(&finder, cli.format).await,
    Commands::Health => commands::health::handle(&finder).await,
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli).await {
    Ok(code) => code,
    Err(e) => {
      display::error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
