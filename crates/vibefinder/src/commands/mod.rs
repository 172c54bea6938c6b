use anyhow::Result;
use clap::ValueEnum;
use std::process::ExitCode;

use crate::display;
use crate::finder::Finder;
use crate::session::SearchSessionState;

pub mod health;
pub mod near;
pub mod search;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Pretty,
  Json,
}

/// Print the session's final state and map it to an exit code
pub fn report(finder: &Finder, format: OutputFormat) -> Result<ExitCode> {
  let state = finder.current_state();
  let user_location = finder.user_location();

  match format {
    OutputFormat::Json => {
      println!("{}", display::state_to_json(&state, user_location, finder.last_started_at())?)
    }
    OutputFormat::Pretty => display::print_state(&state, user_location),
  }

  Ok(exit_code_for(&state))
}

pub fn exit_code_for(state: &SearchSessionState) -> ExitCode {
  match state {
    SearchSessionState::Error(_) => ExitCode::FAILURE,
    _ => ExitCode::SUCCESS,
  }
}
