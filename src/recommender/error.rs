use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorErrorKind {
    InvalidRequest,
    Authentication,
    Authorization,
    RateLimited,
    Timeout,
    BackendTransient,
    InvalidResponse,
    ProtocolViolation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorError {
    pub kind: GeneratorErrorKind,
    pub message: String,
    pub provider_http_status: Option<u16>,
}

impl GeneratorError {
    pub fn new(kind: GeneratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider_http_status: None,
        }
    }

    pub fn with_provider_http_status(mut self, status: u16) -> Self {
        self.provider_http_status = Some(status);
        self
    }

    /// True when the provider returned model text that is not a
    /// recommendation. A broken provider envelope is an invocation failure.
    pub fn is_malformed_response(&self) -> bool {
        self.kind == GeneratorErrorKind::ProtocolViolation
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.provider_http_status {
            Some(status) => write!(f, "{} (http_status={})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for GeneratorError {}

pub fn invalid_request(message: impl Into<String>) -> GeneratorError {
    GeneratorError::new(GeneratorErrorKind::InvalidRequest, message)
}

pub fn invalid_response(message: impl Into<String>) -> GeneratorError {
    GeneratorError::new(GeneratorErrorKind::InvalidResponse, message)
}

pub fn protocol_violation(message: impl Into<String>) -> GeneratorError {
    GeneratorError::new(GeneratorErrorKind::ProtocolViolation, message)
}

pub fn timeout(message: impl Into<String>) -> GeneratorError {
    GeneratorError::new(GeneratorErrorKind::Timeout, message)
}

pub fn transient(message: impl Into<String>) -> GeneratorError {
    GeneratorError::new(GeneratorErrorKind::BackendTransient, message)
}
