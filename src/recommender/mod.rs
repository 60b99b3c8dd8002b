pub mod adapters;
pub mod client;
pub mod credentials;
pub mod error;
pub mod parse;
pub mod ports;
pub mod prompt;
pub mod types;

pub use client::{
    RecommendationClient, Recommended, generator_failed_fallback, malformed_response_fallback,
};
pub use error::{GeneratorError, GeneratorErrorKind};
pub use ports::{GenerationRequest, GeneratorPort};
pub use types::{FallbackReason, GeneratorDialect, RecommendationSource, RecommenderConfig};
