use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::OAuthClientConfig;
use crate::config::OAuthConfig;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::ExternalIdentity;
use crate::domain::user::models::OAuthProvider;
use crate::domain::user::ports::IdentityProvider;
use crate::user::errors::IdentityProviderError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Static OAuth 2.0 endpoints of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub authorize_url: &'static str,
    pub token_url: &'static str,
    pub userinfo_url: &'static str,
    pub scope: &'static str,
}

impl ProviderEndpoints {
    pub fn for_provider(provider: OAuthProvider) -> Self {
        match provider {
            OAuthProvider::Google => Self {
                authorize_url: "https://accounts.google.com/o/oauth2/v2/auth",
                token_url: "https://oauth2.googleapis.com/token",
                userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo",
                scope: "openid email profile",
            },
            OAuthProvider::Github => Self {
                authorize_url: "https://github.com/login/oauth/authorize",
                token_url: "https://github.com/login/oauth/access_token",
                userinfo_url: "https://api.github.com/user",
                scope: "read:user user:email",
            },
        }
    }
}

const GITHUB_EMAILS_URL: &str = "https://api.github.com/user/emails";

/// Authorization-code flow client for Google and GitHub.
///
/// The identity returned by the provider's userinfo endpoint is trusted as-is;
/// no id_token signature is checked here.
pub struct OAuthIdentityProvider {
    client: Client,
    config: OAuthConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: u64,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

impl OAuthIdentityProvider {
    /// Create a provider client from configuration.
    ///
    /// # Errors
    /// * `RequestFailed` - HTTP client could not be built
    pub fn new(config: OAuthConfig) -> Result<Self, IdentityProviderError> {
        let client = Client::builder()
            .user_agent(concat!("auth-service/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityProviderError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn credentials(
        &self,
        provider: OAuthProvider,
    ) -> Result<&OAuthClientConfig, IdentityProviderError> {
        let credentials = match provider {
            OAuthProvider::Google => self.config.google.as_ref(),
            OAuthProvider::Github => self.config.github.as_ref(),
        };

        credentials.ok_or_else(|| IdentityProviderError::NotConfigured(provider.to_string()))
    }

    async fn request_access_token(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, IdentityProviderError> {
        let credentials = self.credentials(provider)?;
        let endpoints = ProviderEndpoints::for_provider(provider);

        let response = self
            .client
            .post(endpoints.token_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| IdentityProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityProviderError::InvalidResponse(e.to_string()))?;

        // GitHub reports failures with a 200 and an `error` field.
        if let Some(error) = token.error {
            let detail = token.error_description.unwrap_or_default();
            return Err(IdentityProviderError::Rejected(
                format!("{} {}", error, detail).trim().to_string(),
            ));
        }
        if !status.is_success() {
            return Err(IdentityProviderError::Rejected(format!(
                "token endpoint answered {}",
                status
            )));
        }

        token.access_token.ok_or_else(|| {
            IdentityProviderError::InvalidResponse("missing access_token".to_string())
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T, IdentityProviderError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| IdentityProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityProviderError::Rejected(format!(
                "{} answered {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityProviderError::InvalidResponse(e.to_string()))
    }

    async fn google_identity(
        &self,
        access_token: &str,
    ) -> Result<(String, String), IdentityProviderError> {
        let endpoints = ProviderEndpoints::for_provider(OAuthProvider::Google);
        let info: GoogleUserInfo = self.get_json(endpoints.userinfo_url, access_token).await?;

        verified_google_identity(info)
    }

    async fn github_identity(
        &self,
        access_token: &str,
    ) -> Result<(String, String), IdentityProviderError> {
        let endpoints = ProviderEndpoints::for_provider(OAuthProvider::Github);
        let user: GithubUser = self.get_json(endpoints.userinfo_url, access_token).await?;

        let email = match user.email {
            Some(email) => email,
            None => {
                let emails: Vec<GithubEmail> =
                    self.get_json(GITHUB_EMAILS_URL, access_token).await?;
                primary_verified_email(emails).ok_or(IdentityProviderError::MissingEmail)?
            }
        };

        Ok((user.id.to_string(), email))
    }
}

// An absent `email_verified` counts as unverified.
fn verified_google_identity(info: GoogleUserInfo) -> Result<(String, String), IdentityProviderError> {
    match (info.email, info.email_verified) {
        (Some(email), Some(true)) => Ok((info.sub, email)),
        _ => Err(IdentityProviderError::MissingEmail),
    }
}

fn primary_verified_email(emails: Vec<GithubEmail>) -> Option<String> {
    emails
        .into_iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email)
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_uri: &str,
    ) -> Result<String, IdentityProviderError> {
        let credentials = self.credentials(provider)?;
        let endpoints = ProviderEndpoints::for_provider(provider);

        let url = Url::parse_with_params(
            endpoints.authorize_url,
            &[
                ("client_id", credentials.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", endpoints.scope),
            ],
        )
        .map_err(|e| IdentityProviderError::InvalidResponse(e.to_string()))?;

        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExternalIdentity, IdentityProviderError> {
        let access_token = self
            .request_access_token(provider, code, redirect_uri)
            .await?;

        let (external_id, email) = match provider {
            OAuthProvider::Google => self.google_identity(&access_token).await?,
            OAuthProvider::Github => self.github_identity(&access_token).await?,
        };

        let email = EmailAddress::new(email).map_err(|_| IdentityProviderError::MissingEmail)?;

        tracing::debug!(provider = %provider, external_id = %external_id, "OAuth code exchanged");

        Ok(ExternalIdentity {
            provider,
            external_id,
            email,
            issued_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OAuthIdentityProvider {
        OAuthIdentityProvider::new(OAuthConfig {
            google: Some(OAuthClientConfig {
                client_id: "google-client".to_string(),
                client_secret: "google-secret".to_string(),
            }),
            github: None,
        })
        .unwrap()
    }

    #[test]
    fn test_authorize_url_contains_code_flow_parameters() {
        let url = provider()
            .authorize_url(
                OAuthProvider::Google,
                "http://127.0.0.1:8000/auth/google/callback",
            )
            .unwrap();
        let url = Url::parse(&url).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(params.contains(&("client_id".to_string(), "google-client".to_string())));
        assert!(params.contains(&("response_type".to_string(), "code".to_string())));
        assert!(params.contains(&(
            "redirect_uri".to_string(),
            "http://127.0.0.1:8000/auth/google/callback".to_string()
        )));
    }

    #[test]
    fn test_authorize_url_never_leaks_secret() {
        let url = provider()
            .authorize_url(OAuthProvider::Google, "http://localhost/cb")
            .unwrap();
        assert!(!url.contains("google-secret"));
    }

    #[test]
    fn test_unconfigured_provider() {
        let result = provider().authorize_url(OAuthProvider::Github, "http://localhost/cb");
        assert!(matches!(
            result,
            Err(IdentityProviderError::NotConfigured(p)) if p == "github"
        ));
    }

    #[tokio::test]
    async fn test_exchange_with_unconfigured_provider_makes_no_request() {
        let result = provider()
            .exchange_code(OAuthProvider::Github, "code", "http://localhost/cb")
            .await;
        assert!(matches!(result, Err(IdentityProviderError::NotConfigured(_))));
    }

    #[test]
    fn test_google_email_must_be_verified() {
        let info = |email: Option<&str>, email_verified: Option<bool>| GoogleUserInfo {
            sub: "1089".to_string(),
            email: email.map(str::to_string),
            email_verified,
        };

        assert_eq!(
            verified_google_identity(info(Some("a@x.com"), Some(true))).unwrap(),
            ("1089".to_string(), "a@x.com".to_string())
        );
        for (email, verified) in [
            (Some("a@x.com"), None),
            (Some("a@x.com"), Some(false)),
            (None, Some(true)),
        ] {
            assert!(matches!(
                verified_google_identity(info(email, verified)),
                Err(IdentityProviderError::MissingEmail)
            ));
        }
    }

    #[test]
    fn test_primary_verified_email() {
        let emails = vec![
            GithubEmail {
                email: "old@x.com".to_string(),
                primary: false,
                verified: true,
            },
            GithubEmail {
                email: "unverified@x.com".to_string(),
                primary: true,
                verified: false,
            },
        ];
        assert_eq!(primary_verified_email(emails), None);

        let emails = vec![GithubEmail {
            email: "main@x.com".to_string(),
            primary: true,
            verified: true,
        }];
        assert_eq!(primary_verified_email(emails), Some("main@x.com".to_string()));
    }
}
