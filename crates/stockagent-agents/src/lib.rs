pub mod error;
pub mod http;
pub mod orchestrator;
pub mod price;
pub mod prompts;
pub mod recommender;

pub mod test_support;

pub use error::AnalysisError;
pub use http::{HttpTransport, ReqwestTransport};
pub use orchestrator::Orchestrator;
pub use price::{PriceProvider, YahooPriceProvider};
pub use recommender::{OpenRouterRecommender, Recommender, FALLBACK_RECOMMENDATION};
