use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::{Value, json};

use crate::recommender::{
    adapters::http_common,
    credentials::{CredentialProvider, CredentialRef},
    error::{GeneratorError, invalid_response},
    ports::{GenerationRequest, GeneratorPort},
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct AnthropicGenerator {
    client: Client,
    endpoint: Option<String>,
    model: String,
    credential: CredentialRef,
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
}

impl AnthropicGenerator {
    pub fn new(
        endpoint: Option<String>,
        model: String,
        credential: CredentialRef,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self, GeneratorError> {
        Ok(Self {
            client: http_common::build_client()?,
            endpoint,
            model,
            credential,
            credentials,
            timeout,
        })
    }
}

#[async_trait]
impl GeneratorPort for AnthropicGenerator {
    fn backend_name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(&self, req: GenerationRequest) -> Result<String, GeneratorError> {
        let endpoint = http_common::require_endpoint(self.endpoint.as_deref(), "anthropic")?;
        let api_key = self.credentials.resolve(&self.credential).await?;

        let body = json!({
            "model": self.model,
            "max_tokens": req.max_tokens,
            "messages": [
                {"role": "user", "content": req.prompt}
            ],
        });

        let mut builder = self
            .client
            .post(format!("{endpoint}/v1/messages"))
            .timeout(self.timeout)
            .header(header::CONTENT_TYPE, "application/json")
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("x-request-id", &req.request_id)
            .json(&body);
        if let Some(api_key) = api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let payload = http_common::send_json(builder, "anthropic").await?;
        extract_text(&payload)
    }
}

fn extract_text(payload: &Value) -> Result<String, GeneratorError> {
    payload
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        })
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid_response("anthropic response missing text content"))
}
