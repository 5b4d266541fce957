use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::domain::profile::errors::ProfileError;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for OAuthProvider parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Unsupported OAuth provider: {0}")]
    Unsupported(String),
}

/// Failures of the external identity provider collaborator.
#[derive(Debug, Clone, Error)]
pub enum IdentityProviderError {
    #[error("OAuth provider {0} is not configured")]
    NotConfigured(String),

    #[error("OAuth provider request failed: {0}")]
    RequestFailed(String),

    #[error("OAuth provider rejected the exchange: {0}")]
    Rejected(String),

    #[error("OAuth provider returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("OAuth provider did not return a usable email address")]
    MissingEmail,
}

/// Top-level error for credential, token, and profile operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid provider: {0}")]
    InvalidProvider(#[from] ProviderError),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    // Domain-level errors
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The inner reason is for logs only; clients see a generic message.
    #[error("Invalid or expired token")]
    Unauthorized(#[source] JwtError),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Profile not found for user: {0}")]
    ProfileNotFound(String),

    // Infrastructure errors
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("External provider error: {0}")]
    ExternalProvider(#[from] IdentityProviderError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
