use thiserror::Error;

/// Error type for JWT operations.
///
/// The verification variants are distinct for logging only; callers facing
/// clients should collapse them into a single unauthorized outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token claims are malformed: {0}")]
    MalformedClaims(String),

    #[error("Token is malformed: {0}")]
    MalformedToken(String),
}
