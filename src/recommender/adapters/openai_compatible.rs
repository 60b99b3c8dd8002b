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

pub struct OpenAiCompatibleGenerator {
    client: Client,
    endpoint: Option<String>,
    model: String,
    credential: CredentialRef,
    credentials: Arc<dyn CredentialProvider>,
    timeout: Duration,
}

impl OpenAiCompatibleGenerator {
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
impl GeneratorPort for OpenAiCompatibleGenerator {
    fn backend_name(&self) -> &'static str {
        "openai_compatible"
    }

    async fn generate(&self, req: GenerationRequest) -> Result<String, GeneratorError> {
        let endpoint =
            http_common::require_endpoint(self.endpoint.as_deref(), "openai-compatible")?;
        let token = self.credentials.resolve(&self.credential).await?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": req.prompt}
            ],
            "max_tokens": req.max_tokens,
            "response_format": {"type": "json_object"},
            "stream": false,
        });

        let mut builder = self
            .client
            .post(format!("{endpoint}/chat/completions"))
            .timeout(self.timeout)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", &req.request_id)
            .json(&body);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let payload = http_common::send_json(builder, "openai-compatible").await?;
        extract_content(&payload)
    }
}

fn extract_content(payload: &Value) -> Result<String, GeneratorError> {
    payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid_response("openai-compatible response missing choices"))
}
