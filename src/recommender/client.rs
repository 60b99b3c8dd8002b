use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::{
    recommender::{
        error::{self, GeneratorError},
        parse::parse_recommendation,
        ports::{GenerationRequest, GeneratorPort},
        prompt::build_recommendation_prompt,
        types::{FallbackReason, RecommendationSource, RecommenderConfig},
    },
    types::{MealSize, Recommendation, UserProfile},
};

pub fn generator_failed_fallback() -> Recommendation {
    Recommendation::new("Pabbas", "Gudbud", "Fallback")
}

pub fn malformed_response_fallback() -> Recommendation {
    Recommendation::new("Machali", "Fish Thali", "Fallback")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommended {
    pub recommendation: Recommendation,
    pub source: RecommendationSource,
}

/// Single-attempt recommender. Every failure collapses into a deterministic
/// fallback so a trigger always has something to order.
#[derive(Clone)]
pub struct RecommendationClient {
    generator: Arc<dyn GeneratorPort>,
    city: String,
    max_tokens: u64,
    deadline: Duration,
}

impl RecommendationClient {
    pub fn new(generator: Arc<dyn GeneratorPort>, config: &RecommenderConfig) -> Self {
        Self {
            generator,
            city: config.city.clone(),
            max_tokens: config.max_tokens,
            deadline: config.request_timeout(),
        }
    }

    pub async fn recommend(
        &self,
        trigger_id: u64,
        profile: &UserProfile,
        meal_size: MealSize,
    ) -> Recommended {
        let request = GenerationRequest {
            request_id: format!("growl-recommend-{trigger_id}"),
            prompt: build_recommendation_prompt(profile, meal_size, &self.city),
            max_tokens: self.max_tokens,
        };

        match self.generate(request).await {
            Ok(recommendation) => {
                tracing::info!(
                    target: "recommender",
                    trigger_id = trigger_id,
                    backend = self.generator.backend_name(),
                    meal_size = %meal_size,
                    restaurant = %recommendation.restaurant,
                    dish = %recommendation.dish,
                    "recommendation_generated"
                );
                Recommended {
                    recommendation,
                    source: RecommendationSource::Generated,
                }
            }
            Err(err) => {
                let reason = if err.is_malformed_response() {
                    FallbackReason::MalformedResponse
                } else {
                    FallbackReason::GeneratorFailed
                };
                tracing::warn!(
                    target: "recommender",
                    trigger_id = trigger_id,
                    backend = self.generator.backend_name(),
                    kind = ?err.kind,
                    reason = reason.as_str(),
                    error = %err,
                    "recommendation_fallback"
                );
                Recommended {
                    recommendation: match reason {
                        FallbackReason::GeneratorFailed => generator_failed_fallback(),
                        FallbackReason::MalformedResponse => malformed_response_fallback(),
                    },
                    source: RecommendationSource::Fallback { reason },
                }
            }
        }
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Recommendation, GeneratorError> {
        let text = timeout(self.deadline, self.generator.generate(request))
            .await
            .map_err(|_| {
                error::timeout(format!(
                    "generator did not answer within {}ms",
                    self.deadline.as_millis()
                ))
            })??;
        parse_recommendation(&text)
    }
}
