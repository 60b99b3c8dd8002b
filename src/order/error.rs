use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderErrorKind {
    InvalidRequest,
    Transport,
    HttpStatus,
    ProtocolViolation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderError {
    pub kind: OrderErrorKind,
    pub message: String,
}

impl OrderError {
    pub fn new(kind: OrderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for OrderError {}

pub fn invalid_request(message: impl Into<String>) -> OrderError {
    OrderError::new(OrderErrorKind::InvalidRequest, message)
}

pub fn transport(message: impl Into<String>) -> OrderError {
    OrderError::new(OrderErrorKind::Transport, message)
}

pub fn http_status(message: impl Into<String>) -> OrderError {
    OrderError::new(OrderErrorKind::HttpStatus, message)
}

pub fn protocol_violation(message: impl Into<String>) -> OrderError {
    OrderError::new(OrderErrorKind::ProtocolViolation, message)
}
