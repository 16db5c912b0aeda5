use crate::models::{CreatePollRequest, VoteRequest};

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_OPTION_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title must be at least {MIN_TITLE_LENGTH} characters")]
    TitleTooShort,
    #[error("Title exceeds maximum length of {MAX_TITLE_LENGTH}")]
    TitleTooLong,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Too many options (maximum {MAX_OPTIONS})")]
    TooManyOptions,
    #[error("Option {0} is empty")]
    EmptyOption(usize),
    #[error("Option {0} exceeds maximum length of {MAX_OPTION_LENGTH}")]
    OptionTooLong(usize),
    #[error("At least one option index is required")]
    NoOptionsSelected,
    #[error("TTL must be at least 1 second")]
    TtlTooShort,
    #[error("TTL exceeds maximum of {0} seconds")]
    TtlTooLong(u64),
}

pub fn validate_create_request(request: &CreatePollRequest, max_ttl_secs: u64) -> Result<(), ValidationError> {
    let title_len = request.title.chars().count();
    if title_len < MIN_TITLE_LENGTH { return Err(ValidationError::TitleTooShort); }
    if title_len > MAX_TITLE_LENGTH { return Err(ValidationError::TitleTooLong); }
    if request.options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }
    if request.options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }

    for (i, option) in request.options.iter().enumerate() {
        if option.is_empty() { return Err(ValidationError::EmptyOption(i)); }
        if option.chars().count() > MAX_OPTION_LENGTH { return Err(ValidationError::OptionTooLong(i)); }
    }

    match request.ttl_seconds {
        Some(0) => Err(ValidationError::TtlTooShort),
        Some(ttl) if ttl > max_ttl_secs => Err(ValidationError::TtlTooLong(max_ttl_secs)),
        _ => Ok(()),
    }
}

/// Only the shape is checked here; index ranges depend on the poll.
pub fn validate_vote_request(request: &VoteRequest) -> Result<(), ValidationError> {
    if request.option_indices.is_empty() {
        return Err(ValidationError::NoOptionsSelected);
    }
    Ok(())
}
