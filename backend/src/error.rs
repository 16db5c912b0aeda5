use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use thiserror::Error;
use shared::{ErrorCode, ErrorResponse, ValidationError};
use crate::store::{BoxError, StoreError};

#[derive(Error, Debug)]
pub enum PollError {
    #[error("poll not found")]
    NotFound,
    #[error("invalid option index {0}")]
    InvalidOption(i64),
    #[error("duplicate option index {0}")]
    DuplicateOption(i64),
    #[error("invalid poll: {0}")]
    InvalidPoll(String),
    #[error("persistence failure: {0}")]
    Persistence(#[source] BoxError),
    #[error("operation cancelled")]
    Cancelled,
}

impl From<StoreError> for PollError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => PollError::NotFound,
            StoreError::Persistence(source) => PollError::Persistence(source),
            StoreError::Cancelled => PollError::Cancelled,
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Poll not found or expired")]
    PollNotFound,
    #[error("Invalid option index")]
    InvalidOption,
    #[error("Duplicate option index")]
    DuplicateOption,
    #[error("Request cancelled")]
    Cancelled,
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Maps an engine error, using `internal` as the message for failures
    /// the caller cannot fix.
    pub fn from_poll(err: PollError, internal: &'static str) -> Self {
        match err {
            PollError::NotFound => ApiError::PollNotFound,
            PollError::InvalidOption(_) => ApiError::InvalidOption,
            PollError::DuplicateOption(_) => ApiError::DuplicateOption,
            PollError::InvalidPoll(reason) => ApiError::InvalidRequest(reason),
            PollError::Cancelled => ApiError::Cancelled,
            PollError::Persistence(_) => ApiError::Internal(internal),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidRequest(_) => Status::BadRequest,
            ApiError::PollNotFound => Status::NotFound,
            ApiError::InvalidOption => Status::BadRequest,
            ApiError::DuplicateOption => Status::BadRequest,
            ApiError::Cancelled => Status::ServiceUnavailable,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        let code = match self {
            ApiError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ApiError::PollNotFound => ErrorCode::PollNotFound,
            ApiError::InvalidOption => ErrorCode::InvalidOption,
            ApiError::DuplicateOption => ErrorCode::DuplicateOption,
            ApiError::Cancelled => ErrorCode::RequestCancelled,
            ApiError::Internal(_) => ErrorCode::InternalError,
        };
        let message = match self {
            ApiError::InvalidRequest(reason) => reason.clone(),
            other => other.to_string(),
        };
        ErrorResponse::with_message(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        rocket::Response::build_from(Json(self.body()).respond_to(req)?)
            .status(status)
            .ok()
    }
}
