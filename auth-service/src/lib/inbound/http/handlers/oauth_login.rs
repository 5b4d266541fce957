use axum::extract::Path;
use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

use super::ApiError;
use crate::domain::user::models::OAuthProvider;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// Redirect the browser to the provider's consent page with a 302.
pub async fn oauth_login<S: UserServicePort>(
    State(state): State<AppState<S>>,
    Path(provider): Path<String>,
) -> Result<Response, ApiError> {
    let provider: OAuthProvider = provider.parse()?;

    let url = state.user_service.authorization_url(provider).await?;
    tracing::debug!(provider = %provider, "Redirecting to OAuth provider");

    Ok((StatusCode::FOUND, [(LOCATION, url)]).into_response())
}
