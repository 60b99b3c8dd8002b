use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::recommender::error::{GeneratorError, GeneratorErrorKind, invalid_response};

pub fn build_client() -> Result<Client, GeneratorError> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .map_err(|err| {
            GeneratorError::new(
                GeneratorErrorKind::InvalidRequest,
                format!("unable to build http client: {err}"),
            )
        })
}

pub fn require_endpoint(endpoint: Option<&str>, dialect: &str) -> Result<String, GeneratorError> {
    endpoint
        .map(|endpoint| endpoint.trim_end_matches('/').to_string())
        .filter(|endpoint| !endpoint.is_empty())
        .ok_or_else(|| {
            GeneratorError::new(
                GeneratorErrorKind::InvalidRequest,
                format!("{dialect} backend requires endpoint"),
            )
        })
}

/// Sends the request and decodes a JSON body, mapping every failure onto the
/// generator taxonomy.
pub async fn send_json(request: RequestBuilder, dialect: &str) -> Result<Value, GeneratorError> {
    let response = request.send().await.map_err(|err| map_transport_error(err, dialect))?;
    decode_json(response, dialect).await
}

async fn decode_json(response: Response, dialect: &str) -> Result<Value, GeneratorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_http_error(status.as_u16(), &body));
    }

    response
        .json::<Value>()
        .await
        .map_err(|err| invalid_response(format!("{dialect} body decode failed: {err}")))
}

fn map_transport_error(err: reqwest::Error, dialect: &str) -> GeneratorError {
    let kind = if err.is_timeout() {
        GeneratorErrorKind::Timeout
    } else {
        GeneratorErrorKind::BackendTransient
    };
    GeneratorError::new(kind, format!("{dialect} request failed: {err}"))
}

pub fn map_http_error(status: u16, body: &str) -> GeneratorError {
    let kind = match status {
        401 => GeneratorErrorKind::Authentication,
        403 => GeneratorErrorKind::Authorization,
        408 | 429 => GeneratorErrorKind::RateLimited,
        400..=499 => GeneratorErrorKind::InvalidRequest,
        _ => GeneratorErrorKind::BackendTransient,
    };

    let excerpt = body.chars().take(240).collect::<String>();
    let message = if excerpt.is_empty() {
        format!("backend returned status {status}")
    } else {
        format!("backend returned status {status}: {excerpt}")
    };

    GeneratorError::new(kind, message).with_provider_http_status(status)
}
