use thiserror::Error;

/// Error for onboarding profile validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("Invalid secondary email: {0}")]
    InvalidSecondaryEmail(String),

    #[error("Invalid LinkedIn URL: {0}")]
    InvalidLinkedinUrl(String),

    #[error("Invalid date of birth: {0}")]
    InvalidDateOfBirth(String),
}
