use anyhow::Result;
use std::process::ExitCode;

use super::{report, OutputFormat};
use crate::display;
use crate::finder::Finder;

pub async fn handle(finder: &Finder, format: OutputFormat) -> Result<ExitCode> {
  if format == OutputFormat::Pretty {
    display::info("Getting your location...");
  }

  finder.near_me().await;

  if let (OutputFormat::Pretty, Some(coords)) = (format, finder.user_location()) {
    display::info(&coords.near_me_label());
  }

  report(finder, format)
}
