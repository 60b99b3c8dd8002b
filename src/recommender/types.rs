use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::recommender::credentials::CredentialRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorDialect {
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
}

impl GeneratorDialect {
    pub fn as_str(self) -> &'static str {
        match self {
            GeneratorDialect::Anthropic => "anthropic",
            GeneratorDialect::OpenAiCompatible => "openai_compatible",
        }
    }
}

fn default_dialect() -> GeneratorDialect {
    GeneratorDialect::Anthropic
}

fn default_endpoint() -> Option<String> {
    Some("https://api.anthropic.com".to_string())
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_max_tokens() -> u64 {
    300
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_city() -> String {
    "Mangaluru".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    #[serde(default = "default_dialect")]
    pub dialect: GeneratorDialect,
    #[serde(default = "default_endpoint")]
    pub endpoint: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub credential: CredentialRef,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_city")]
    pub city: String,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            endpoint: default_endpoint(),
            model: default_model(),
            credential: CredentialRef::default(),
            max_tokens: default_max_tokens(),
            request_timeout_ms: default_request_timeout_ms(),
            city: default_city(),
        }
    }
}

impl RecommenderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Transport, HTTP status, timeout or credential failure.
    GeneratorFailed,
    /// The generator answered but not with a usable recommendation.
    MalformedResponse,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackReason::GeneratorFailed => "generator_failed",
            FallbackReason::MalformedResponse => "malformed_response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    Generated,
    Fallback { reason: FallbackReason },
}

impl RecommendationSource {
    pub fn is_fallback(self) -> bool {
        matches!(self, RecommendationSource::Fallback { .. })
    }
}
