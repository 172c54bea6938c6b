use anyhow::Result;
use std::process::ExitCode;

use super::{report, OutputFormat};
use crate::display;
use crate::finder::Finder;
use crate::location::{Coordinates, LocationQuery, ValidationError};

/// Progress line for a search; fails the same way the search itself would
pub fn searching_banner(query: &str) -> Result<String, ValidationError> {
  let query = LocationQuery::from_text(query)?;
  Ok(format!("Searching for '{}'...", query.text()))
}

pub async fn handle(
  finder: &Finder,
  query: &str,
  coordinates: Option<Coordinates>,
  format: OutputFormat,
) -> Result<ExitCode> {
  let banner = match searching_banner(query) {
    Ok(banner) => banner,
    Err(validation) => {
      // Nothing was dispatched; report without touching the session
      display::error(&validation.to_string());
      return Ok(ExitCode::FAILURE);
    }
  };

  if format == OutputFormat::Pretty {
    display::info(&banner);
  }

  if let Err(validation) = finder.search(query, coordinates).await {
    display::error(&validation.to_string());
    return Ok(ExitCode::FAILURE);
  }

  report(finder, format)
}
