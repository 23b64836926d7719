pub mod config;
pub mod error;
pub mod quote;
pub mod recommendation;

pub use config::{AppConfig, Credentials, MarketDataConfig, RecommendationConfig, ServerConfig};
pub use error::ConfigError;
pub use quote::PriceQuote;
pub use recommendation::RecommendationResult;
