//! Display statistics derived from a single restaurant record
//!
//! The backend only sends an aggregate sentiment percentage. Everything here
//! is a pure function of the record: deriving twice from the same record
//! always gives identical output.

use serde::Serialize;

use crate::restaurant::{RestaurantRecord, NO_REVIEWS_TAG, NO_SENTIMENT};

/// Share of synthesized feedback reserved for neutral reviews, in percent
pub const NEUTRAL_SHARE: u32 = 10;

/// Inclusive bounds for the synthesized review count
pub const MIN_FEEDBACK_TOTAL: u32 = 40;
pub const MAX_FEEDBACK_TOTAL: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentTier {
  Excellent,
  Good,
  Fair,
  Poor,
}

impl SentimentTier {
  pub fn from_value(value: u8) -> Self {
    match value {
      85.. => SentimentTier::Excellent,
      70..=84 => SentimentTier::Good,
      50..=69 => SentimentTier::Fair,
      _ => SentimentTier::Poor,
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      SentimentTier::Excellent => "Excellent",
      SentimentTier::Good => "Good",
      SentimentTier::Fair => "Fair",
      SentimentTier::Poor => "Poor",
    }
  }
}

/// Estimated review breakdown. Always sums exactly to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackCounts {
  pub total: u32,
  pub positive: u32,
  pub neutral: u32,
  pub negative: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedInsight {
  pub has_ml_data: bool,
  /// Only meaningful when `has_ml_data` is true
  pub sentiment_value: u8,
  pub sentiment_tier: SentimentTier,
  pub feedback_counts: FeedbackCounts,
}

pub fn derive(record: &RestaurantRecord) -> DerivedInsight {
  let sentiment_value = parse_sentiment_value(&record.sentiment_summary);

  DerivedInsight {
    has_ml_data: has_ml_data(record),
    sentiment_value,
    sentiment_tier: SentimentTier::from_value(sentiment_value),
    feedback_counts: feedback_counts(&record.name, sentiment_value),
  }
}

pub fn has_ml_data(record: &RestaurantRecord) -> bool {
  record.sentiment_summary != NO_SENTIMENT
    && record.vibe_tags.first().map(String::as_str) != Some(NO_REVIEWS_TAG)
}

/// Leading integer of a summary like `"82% Positive"`, clamped to 0..=100.
/// Anything without leading digits (including `"N/A"`) is 0.
pub fn parse_sentiment_value(summary: &str) -> u8 {
  let digits: String = summary.trim_start().chars().take_while(char::is_ascii_digit).collect();
  if digits.is_empty() {
    return 0;
  }
  // Overlong digit runs saturate instead of failing
  digits.parse::<u32>().map_or(100, |v| v.min(100)) as u8
}

/// Stable pseudo-random review count in `MIN_FEEDBACK_TOTAL..=MAX_FEEDBACK_TOTAL`
pub fn feedback_total(name: &str) -> u32 {
  let width = MAX_FEEDBACK_TOTAL - MIN_FEEDBACK_TOTAL + 1;
  let code_sum = name.encode_utf16().fold(0u32, |acc, unit| acc.wrapping_add(u32::from(unit)));
  MIN_FEEDBACK_TOTAL + code_sum % width
}

pub fn feedback_counts(name: &str, sentiment_value: u8) -> FeedbackCounts {
  let total = feedback_total(name);
  let positive_share = u32::from(sentiment_value.min(100));
  let negative_share = 100u32.saturating_sub(positive_share).saturating_sub(NEUTRAL_SHARE);

  let positive = percent_of(total, positive_share);
  let negative = percent_of(total, negative_share);
  // Neutral goes last so rounding never breaks the sum
  let neutral = total - positive - negative;

  FeedbackCounts { total, positive, neutral, negative }
}

/// `round(total * share / 100)`, halves rounded up
fn percent_of(total: u32, share: u32) -> u32 {
  (total * share * 2 + 100) / 200
}
