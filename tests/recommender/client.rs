use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use growl::{
    recommender::{
        FallbackReason, GenerationRequest, GeneratorError, GeneratorPort, RecommendationClient,
        RecommendationSource, RecommenderConfig, error, generator_failed_fallback,
        malformed_response_fallback,
    },
    types::{MealSize, Recommendation, UserProfile},
};

enum Behaviour {
    Reply(&'static str),
    Fail(GeneratorError),
    Hang,
}

struct StubGenerator {
    behaviour: Behaviour,
}

#[async_trait]
impl GeneratorPort for StubGenerator {
    fn backend_name(&self) -> &'static str {
        "stub"
    }

    async fn generate(&self, _req: GenerationRequest) -> Result<String, GeneratorError> {
        match &self.behaviour {
            Behaviour::Reply(text) => Ok(text.to_string()),
            Behaviour::Fail(err) => Err(err.clone()),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            }
        }
    }
}

fn client(behaviour: Behaviour, request_timeout_ms: u64) -> RecommendationClient {
    let config = RecommenderConfig {
        request_timeout_ms,
        ..RecommenderConfig::default()
    };
    RecommendationClient::new(Arc::new(StubGenerator { behaviour }), &config)
}

#[tokio::test]
async fn given_fenced_json_reply_when_recommending_then_generated_recommendation_is_returned() {
    let client = client(
        Behaviour::Reply(
            "```json\n{\"restaurant\": \"Giri Manja's\", \"dish\": \"Fish Curry\", \"rationale\": \"Omega-3\"}\n```",
        ),
        1_000,
    );

    let recommended = client
        .recommend(1, &UserProfile::default(), MealSize::Small)
        .await;

    assert_eq!(
        recommended.recommendation,
        Recommendation::new("Giri Manja's", "Fish Curry", "Omega-3")
    );
    assert_eq!(recommended.source, RecommendationSource::Generated);
}

#[tokio::test]
async fn given_transport_failure_when_recommending_then_generator_failed_fallback_is_used() {
    let client = client(Behaviour::Fail(error::transient("connection reset")), 1_000);

    let recommended = client
        .recommend(2, &UserProfile::default(), MealSize::Big)
        .await;

    assert_eq!(recommended.recommendation, generator_failed_fallback());
    assert_eq!(
        recommended.source,
        RecommendationSource::Fallback {
            reason: FallbackReason::GeneratorFailed
        }
    );
}

#[tokio::test]
async fn given_unparseable_reply_when_recommending_then_malformed_response_fallback_is_used() {
    for reply in [
        "I would suggest something light.",
        r#"Try this: {"restaurant": "Pabbas", "dish": "Gudbud", "rationale": "Sweet"}"#,
        r#"{"restaurant": "Pabbas", "dish": "Gudbud"}"#,
        r#"{"restaurant": "Pabbas", "dish": " ", "rationale": "Sweet"}"#,
    ] {
        let client = client(Behaviour::Reply(reply), 1_000);
        let recommended = client
            .recommend(3, &UserProfile::default(), MealSize::Small)
            .await;

        assert_eq!(
            recommended.recommendation,
            malformed_response_fallback(),
            "reply {reply:?} should fall back"
        );
        assert_eq!(
            recommended.source,
            RecommendationSource::Fallback {
                reason: FallbackReason::MalformedResponse
            }
        );
    }
}

#[tokio::test]
async fn given_hanging_generator_when_deadline_passes_then_generator_failed_fallback_is_used() {
    let client = client(Behaviour::Hang, 50);

    let recommended = tokio::time::timeout(
        Duration::from_secs(5),
        client.recommend(4, &UserProfile::default(), MealSize::Small),
    )
    .await
    .expect("client must enforce its own deadline");

    assert_eq!(recommended.recommendation, generator_failed_fallback());
    assert!(recommended.source.is_fallback());
}
