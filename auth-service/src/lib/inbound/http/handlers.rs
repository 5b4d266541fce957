use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::User;
use crate::user::errors::IdentityProviderError;
use crate::user::errors::ProviderError;
use crate::user::errors::UserError;

pub mod get_profile;
pub mod login;
pub mod me;
pub mod oauth_callback;
pub mod oauth_login;
pub mod onboarding;
pub mod register;
pub mod root;

/// Successful response: status code plus a flat JSON body.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Client-facing failure. Serialized as `{"error": <kind>, "message": <text>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    DuplicateEmail(String),
    InvalidCredentials,
    Unauthorized,
    MissingCredentials(String),
    UserNotFound(String),
    ProfileNotFound(String),
    MissingCode,
    UnsupportedProvider(String),
    ValidationError(String),
    ExchangeError(String),
    PersistenceError(String),
    InternalServerError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateEmail(_) | ApiError::MissingCode => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::Unauthorized
            | ApiError::MissingCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiError::UserNotFound(_)
            | ApiError::ProfileNotFound(_)
            | ApiError::UnsupportedProvider(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ExchangeError(_)
            | ApiError::PersistenceError(_)
            | ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::DuplicateEmail(_) => "DuplicateEmail",
            ApiError::InvalidCredentials => "InvalidCredentials",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::MissingCredentials(_) => "MissingCredentials",
            ApiError::UserNotFound(_) => "UserNotFound",
            ApiError::ProfileNotFound(_) => "ProfileNotFound",
            ApiError::MissingCode => "MissingCode",
            ApiError::UnsupportedProvider(_) => "UnsupportedProvider",
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::ExchangeError(_) => "ExchangeError",
            ApiError::PersistenceError(_) => "PersistenceError",
            ApiError::InternalServerError(_) => "InternalServerError",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidCredentials => "Invalid email or password".to_string(),
            ApiError::Unauthorized => "Invalid or expired token".to_string(),
            ApiError::MissingCode => "Missing authorization code".to_string(),
            ApiError::DuplicateEmail(msg)
            | ApiError::MissingCredentials(msg)
            | ApiError::UserNotFound(msg)
            | ApiError::ProfileNotFound(msg)
            | ApiError::UnsupportedProvider(msg)
            | ApiError::ValidationError(msg)
            | ApiError::ExchangeError(msg)
            | ApiError::PersistenceError(msg)
            | ApiError::InternalServerError(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "message": self.message(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail(_) => ApiError::DuplicateEmail(err.to_string()),
            UserError::InvalidCredentials => ApiError::InvalidCredentials,
            UserError::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Token rejected");
                ApiError::Unauthorized
            }
            UserError::UserNotFound(_) => ApiError::UserNotFound(err.to_string()),
            UserError::ProfileNotFound(_) => ApiError::ProfileNotFound(err.to_string()),
            UserError::InvalidProvider(e) => e.into(),
            UserError::InvalidUserId(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidProfile(_) => ApiError::ValidationError(err.to_string()),
            UserError::ExternalProvider(e) => e.into(),
            UserError::PersistenceError(msg) => {
                tracing::error!(error = %msg, "Persistence failure");
                ApiError::PersistenceError("Storage operation failed".to_string())
            }
            UserError::Password(_) | UserError::Unknown(_) => {
                tracing::error!(error = %err, "Internal failure");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::UnsupportedProvider(err.to_string())
    }
}

impl From<IdentityProviderError> for ApiError {
    fn from(err: IdentityProviderError) -> Self {
        tracing::warn!(error = %err, "OAuth provider failure");
        ApiError::ExchangeError(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::ValidationError(rejection.body_text())
    }
}

/// Public view of a credential. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

impl From<&AuthenticatedUser> for UserData {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}
