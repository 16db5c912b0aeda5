use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Poll not found or expired")]
    PollNotFound,
    #[error("Invalid option index")]
    InvalidOption,
    #[error("Duplicate option index")]
    DuplicateOption,
    #[error("Request cancelled")]
    RequestCancelled,
    #[error("Resource not found")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            write!(f, "{}: {}", self.error, message)
        } else {
            write!(f, "{}", self.error)
        }
    }
}

impl ErrorResponse {
    pub fn new(error: ErrorCode) -> Self {
        Self { error, message: None }
    }

    pub fn with_message(error: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error,
            message: Some(message.into()),
        }
    }
}
