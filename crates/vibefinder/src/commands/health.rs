use anyhow::Result;
use std::process::ExitCode;

use crate::display;
use crate::finder::{search_failure_message, Finder};

pub async fn handle(finder: &Finder) -> Result<ExitCode> {
  let endpoint = finder.endpoint();
  display::info(&format!("Checking backend at {}", endpoint.describe()));

  match finder.gateway().health().await {
    Ok(health) if health.is_healthy() => {
      let service = health.service.as_deref().unwrap_or("search API");
      display::success(&format!("{service} is healthy"));
      Ok(ExitCode::SUCCESS)
    }
    Ok(health) => {
      display::warn(&format!("Backend reported status '{}'", health.status));
      Ok(ExitCode::FAILURE)
    }
    Err(error) => {
      tracing::warn!(kind = error.kind(), error = %error, "health check failed");
      display::error(&search_failure_message(endpoint));
      Ok(ExitCode::FAILURE)
    }
  }
}
