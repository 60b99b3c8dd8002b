use serde::Deserialize;

use crate::{
    recommender::error::{GeneratorError, protocol_violation},
    types::Recommendation,
};

#[derive(Debug, Deserialize)]
struct RecommendationEnvelope {
    restaurant: String,
    dish: String,
    rationale: String,
}

/// Accepts a bare JSON object or one wrapped in a single code fence. Prose
/// around the object and blank fields count as malformed.
pub fn parse_recommendation(text: &str) -> Result<Recommendation, GeneratorError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(protocol_violation("generator returned empty output"));
    }

    let candidate = strip_code_fence(trimmed).unwrap_or_else(|| trimmed.to_string());
    let envelope =
        serde_json::from_str::<RecommendationEnvelope>(&candidate).map_err(|err| {
            protocol_violation(format!(
                "generator output is not a recommendation object: {err}"
            ))
        })?;

    let recommendation = Recommendation::new(
        envelope.restaurant.trim(),
        envelope.dish.trim(),
        envelope.rationale.trim(),
    );
    if !recommendation.is_complete() {
        return Err(protocol_violation("generator recommendation has blank fields"));
    }

    Ok(recommendation)
}

fn strip_code_fence(text: &str) -> Option<String> {
    if !text.starts_with("```") || !text.ends_with("```") || text.len() < 6 {
        return None;
    }

    let body = text
        .lines()
        .skip(1)
        .take_while(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>();
    Some(body.join("\n"))
}
