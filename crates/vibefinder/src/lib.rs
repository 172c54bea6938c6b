pub mod commands;
pub mod config;
pub mod display;
pub mod finder;
pub mod gateway;
pub mod insight;
pub mod location;
pub mod restaurant;
pub mod session;

// Re-export commonly used types for easier testing
pub use config::{ApiEndpoint, FinderConfig};
pub use finder::Finder;
pub use gateway::{SearchError, SearchGateway, SearchRequestParams};
pub use insight::{derive, DerivedInsight, FeedbackCounts, SentimentTier};
pub use location::{Coordinates, GeolocationError, LocationQuery, LocationResolver, ValidationError};
pub use restaurant::RestaurantRecord;
pub use session::{RequestToken, SearchSession, SearchSessionState, SessionEvent, Transition};
