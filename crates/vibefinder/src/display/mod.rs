use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;

use crate::insight::{derive, DerivedInsight, SentimentTier};
use crate::location::Coordinates;
use crate::restaurant::RestaurantRecord;
use crate::session::SearchSessionState;

const CARD_WIDTH: usize = 72;

fn prefixed(color: Color, prefix: &str, message: &str) {
  let tag = format!("[{}]", prefix.color(color).bold());
  for line in message.lines() {
    eprintln!("{tag} {line}");
  }
}

pub fn info(message: &str) {
  prefixed(Color::Blue, "info", message);
}

pub fn warn(message: &str) {
  prefixed(Color::Yellow, "warn", message);
}

pub fn error(message: &str) {
  prefixed(Color::Red, "error", message);
}

pub fn success(message: &str) {
  prefixed(Color::Green, "done", message);
}

pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

fn tier_color(tier: SentimentTier) -> Color {
  match tier {
    SentimentTier::Excellent => Color::Green,
    SentimentTier::Good => Color::Yellow,
    SentimentTier::Fair => Color::TrueColor { r: 255, g: 140, b: 0 },
    SentimentTier::Poor => Color::Red,
  }
}

/// Render one restaurant as a text card
pub fn format_card(record: &RestaurantRecord, insight: &DerivedInsight) -> String {
  let mut out = Vec::new();

  let mut header = format!("{}  ★ {:.1}", record.name.bold(), record.rating);
  if let Some(distance) = &record.distance_label {
    header.push_str(&format!("  · {distance}"));
  }
  if insight.has_ml_data {
    let badge = format!("{}% {}", insight.sentiment_value, insight.sentiment_tier.label());
    header.push_str(&format!("  [{}]", badge.color(tier_color(insight.sentiment_tier)).bold()));
  }

  out.push(banner_line(CARD_WIDTH, '─'));
  out.push(header);
  if let Some(address) = &record.address {
    out.push(format!("  {address}"));
  }
  out.push(banner_line(CARD_WIDTH, '─'));

  if !insight.has_ml_data {
    out.push("  Not enough reviews for AI insights yet.".to_string());
    out.push("  Try searching popular locations for full AI insights!".to_string());
    out.push(format!("  {}", "Data from Google Places".dimmed()));
    return out.join("\n");
  }

  if !record.vibe_tags.is_empty() {
    out.push(format!("  Vibe Check: {}", record.vibe_tags.join(" ").cyan()));
  }

  let counts = insight.feedback_counts;
  out.push(format!(
    "  Estimated from ~{} reviews: {} positive · {} neutral · {} negative",
    counts.total,
    counts.positive.to_string().green(),
    counts.neutral.to_string().blue(),
    counts.negative.to_string().red()
  ));

  if !record.recommended_dishes.is_empty() {
    out.push("  Must-Try Dishes:".to_string());
    out.extend(record.recommended_dishes.iter().map(|dish| format!("    • {dish}")));
  }

  if !record.known_complaints.is_empty() {
    out.push("  Heads Up:".to_string());
    out.extend(record.known_complaints.iter().map(|complaint| format!("    ! {complaint}")));
  }

  out.push(format!("  {}", "AI analysis from hundreds of reviews".dimmed()));
  out.join("\n")
}

/// Text for whatever the session currently shows. Exactly one of loading,
/// error, empty notice or result list is rendered.
pub fn format_state(state: &SearchSessionState, user_location: Option<Coordinates>) -> String {
  match state {
    SearchSessionState::Idle => {
      "Search by location or restaurant name to see what reviewers really think.".to_string()
    }
    SearchSessionState::Searching => "Analyzing reviews and finding insights...".to_string(),
    SearchSessionState::Empty => "No restaurants found. Try a different location.".to_string(),
    SearchSessionState::Error(message) => format!("{} {}", "⚠".red().bold(), message),
    SearchSessionState::Success(results) => {
      let mut sections = Vec::with_capacity(results.len() + 1);
      let mut summary = format!("Found {} restaurant(s)", results.len());
      if let Some(coords) = user_location {
        summary.push_str(&format!(" near ({:.4}, {:.4})", coords.latitude, coords.longitude));
      }
      sections.push(summary);
      sections.extend(results.iter().map(|record| format_card(record, &derive(record))));
      sections.join("\n\n")
    }
  }
}

pub fn print_state(state: &SearchSessionState, user_location: Option<Coordinates>) {
  match state {
    SearchSessionState::Error(_) => eprintln!("{}", format_state(state, user_location)),
    _ => println!("{}", format_state(state, user_location)),
  }
}

#[derive(Debug, Serialize)]
struct CardView<'a> {
  #[serde(flatten)]
  record: &'a RestaurantRecord,
  insight: DerivedInsight,
}

#[derive(Debug, Serialize)]
struct StateView<'a> {
  state: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  user_location: Option<Coordinates>,
  #[serde(skip_serializing_if = "Option::is_none")]
  started_at: Option<DateTime<Utc>>,
  results: Vec<CardView<'a>>,
}

/// Machine-readable view of the session, each record paired with its insight
pub fn state_to_json(
  state: &SearchSessionState,
  user_location: Option<Coordinates>,
  started_at: Option<DateTime<Utc>>,
) -> serde_json::Result<String> {
  let view = StateView {
    state: state.name(),
    error: state.error(),
    user_location,
    started_at,
    results: state
      .results()
      .iter()
      .map(|record| CardView { record, insight: derive(record) })
      .collect(),
  };
  serde_json::to_string_pretty(&view)
}
