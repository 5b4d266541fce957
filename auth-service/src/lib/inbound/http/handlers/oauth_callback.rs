use axum::extract::rejection::QueryRejection;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::OAuthLogin;
use crate::domain::user::models::OAuthProvider;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub async fn oauth_callback<S: UserServicePort>(
    State(state): State<AppState<S>>,
    Path(provider): Path<String>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<ApiSuccess<OAuthCallbackResponseData>, ApiError> {
    let provider: OAuthProvider = provider.parse()?;
    let Query(params) = params?;

    let code = params
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or(ApiError::MissingCode)?;

    state
        .user_service
        .complete_oauth(provider, &code)
        .await
        .map_err(ApiError::from)
        .map(|login| ApiSuccess::new(StatusCode::OK, login.into()))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthCallbackResponseData {
    pub message: String,
    pub user: UserData,
    pub access_token: String,
    pub token_type: String,
}

impl From<OAuthLogin> for OAuthCallbackResponseData {
    fn from(login: OAuthLogin) -> Self {
        Self {
            message: format!(
                "Successfully logged in with {}!",
                login.identity.provider.display_name()
            ),
            user: (&login.user).into(),
            access_token: login.token.access_token,
            token_type: login.token.token_type,
        }
    }
}
