use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::Deserialize;

use crate::order::{
    error::{self, OrderError},
    ports::{OrderBackend, OrderRequest},
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WebhookReply {
    Flag(bool),
    Envelope { success: bool },
}

impl WebhookReply {
    fn success(&self) -> bool {
        match self {
            WebhookReply::Flag(success) | WebhookReply::Envelope { success } => *success,
        }
    }
}

/// Hands the order to an external automation agent over HTTP. The agent owns
/// the platform flow, including any login or OTP step.
pub struct WebhookOrderBackend {
    client: Client,
    endpoint: Url,
}

impl WebhookOrderBackend {
    pub fn new(endpoint: &str) -> Result<Self, OrderError> {
        let endpoint = match Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                return Err(error::invalid_request(format!(
                    "unsupported webhook scheme '{}'",
                    url.scheme()
                )));
            }
            Err(err) => {
                return Err(error::invalid_request(format!(
                    "invalid webhook endpoint '{endpoint}': {err}"
                )));
            }
        };

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| error::invalid_request(format!("unable to build http client: {err}")))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl OrderBackend for WebhookOrderBackend {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn place(&self, req: &OrderRequest) -> Result<bool, OrderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", format!("growl-order-{}", req.trigger_id))
            .json(req)
            .send()
            .await
            .map_err(|err| error::transport(format!("webhook request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt = body.chars().take(240).collect::<String>();
            return Err(error::http_status(format!(
                "webhook returned status {}: {}",
                status.as_u16(),
                excerpt
            )));
        }

        let reply = response
            .json::<WebhookReply>()
            .await
            .map_err(|err| error::protocol_violation(format!("webhook reply undecodable: {err}")))?;
        Ok(reply.success())
    }
}
