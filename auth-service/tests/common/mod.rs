use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtHandler;
use auth_service::domain::user::models::EmailAddress;
use auth_service::domain::user::models::ExternalIdentity;
use auth_service::domain::user::models::OAuthProvider;
use auth_service::domain::user::models::UserId;
use auth_service::domain::user::ports::IdentityProvider;
use auth_service::domain::user::service::UserService;
use auth_service::domain::user::service::UserServiceSettings;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::repositories::InMemoryUserRepository;
use auth_service::user::errors::IdentityProviderError;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Authorization code the stub provider accepts.
pub const VALID_OAUTH_CODE: &str = "valid-code";
pub const OAUTH_EMAIL: &str = "oauth.user@example.com";

/// Identity provider that answers without network access.
pub struct StubIdentityProvider;

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_uri: &str,
    ) -> Result<String, IdentityProviderError> {
        Ok(format!(
            "https://provider.test/{}/authorize?redirect_uri={}",
            provider, redirect_uri
        ))
    }

    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<ExternalIdentity, IdentityProviderError> {
        if code != VALID_OAUTH_CODE {
            return Err(IdentityProviderError::Rejected(
                "bad_verification_code".to_string(),
            ));
        }

        Ok(ExternalIdentity {
            provider,
            external_id: "external-42".to_string(),
            email: EmailAddress::new(OAUTH_EMAIL.to_string())
                .map_err(|e| IdentityProviderError::InvalidResponse(e.to_string()))?,
            issued_at: Utc::now(),
        })
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());
        let authenticator = Arc::new(Authenticator::new(JWT_SECRET, Duration::minutes(60)));
        let settings = UserServiceSettings {
            normalize_email: true,
            public_url: address.clone(),
        };

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            Arc::new(StubIdentityProvider),
            authenticator,
            settings,
        ));

        let router = create_router(user_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            repository,
            api_client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create reqwest client"),
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Register a credential and return the response body
    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .post("/auth/register")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in and return the access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["access_token"]
            .as_str()
            .expect("Missing access_token")
            .to_string()
    }

    /// Register and log in, returning (user id, access token)
    pub async fn register_and_login(&self, email: &str, password: &str) -> (UserId, String) {
        let body = self.register(email, password).await;
        let id = UserId::from_string(body["id"].as_str().expect("Missing id"))
            .expect("Invalid user id");
        let token = self.login(email, password).await;
        (id, token)
    }
}
