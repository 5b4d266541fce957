use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::JwtError;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::profile::models::OnboardingCommand;
use crate::domain::profile::models::Profile;
use crate::domain::user::models::AccessToken;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::OAuthLogin;
use crate::domain::user::models::OAuthProvider;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::IdentityProvider;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

const DUMMY_PASSWORD: &str = "login-timing-placeholder";

/// Policy knobs of the credential flow, fixed at startup.
#[derive(Debug, Clone)]
pub struct UserServiceSettings {
    /// Lowercase emails before lookup and storage.
    pub normalize_email: bool,
    /// Base URL OAuth providers redirect back to.
    pub public_url: String,
}

/// Domain service implementation for credential, token, and profile operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, IP>
where
    UR: UserRepository,
    IP: IdentityProvider,
{
    repository: Arc<UR>,
    identity_provider: Arc<IP>,
    authenticator: Arc<Authenticator>,
    settings: UserServiceSettings,
    dummy_hash: OnceCell<String>,
}

impl<UR, IP> UserService<UR, IP>
where
    UR: UserRepository,
    IP: IdentityProvider,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential and profile store
    /// * `identity_provider` - OAuth provider client
    /// * `authenticator` - Password hasher and token service
    /// * `settings` - Credential flow policy
    pub fn new(
        repository: Arc<UR>,
        identity_provider: Arc<IP>,
        authenticator: Arc<Authenticator>,
        settings: UserServiceSettings,
    ) -> Self {
        Self {
            repository,
            identity_provider,
            authenticator,
            settings,
            dummy_hash: OnceCell::new(),
        }
    }

    fn canonical_email(&self, email: EmailAddress) -> EmailAddress {
        if self.settings.normalize_email {
            email.normalized()
        } else {
            email
        }
    }

    fn redirect_uri(&self, provider: OAuthProvider) -> String {
        format!(
            "{}/auth/{}/callback",
            self.settings.public_url.trim_end_matches('/'),
            provider
        )
    }

    // Argon2 is CPU-bound; keep it off the async executor.
    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(UserError::from)
    }

    async fn verify_and_issue(
        &self,
        password: String,
        stored_hash: String,
        subject: String,
    ) -> Result<AccessToken, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &subject)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?;

        match result {
            Ok(issued) => Ok(issued.into()),
            Err(AuthenticationError::InvalidCredentials) => Err(UserError::InvalidCredentials),
            Err(AuthenticationError::PasswordError(e)) => {
                tracing::error!(error = %e, "Stored password hash could not be parsed");
                Err(UserError::InvalidCredentials)
            }
            Err(AuthenticationError::JwtError(e)) => {
                Err(UserError::Unknown(format!("Token generation failed: {}", e)))
            }
        }
    }

    /// Spend one Argon2 verification on a login that has no stored hash to
    /// check, so unknown emails take as long as wrong passwords.
    async fn verify_against_dummy(&self, password: String) -> Result<(), UserError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD.to_string()))
            .await?
            .clone();
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || {
            let _ = authenticator.verify_password(&password, &dummy_hash);
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))
    }

    async fn find_or_create_oauth_user(&self, email: EmailAddress) -> Result<User, UserError> {
        if let Some(user) = self.repository.find_by_email(&email).await? {
            return Ok(user);
        }

        let user = User {
            id: UserId::new(),
            email: email.clone(),
            password_hash: None,
            created_at: Utc::now(),
        };

        match self.repository.insert(user).await {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "User created from OAuth identity");
                Ok(created)
            }
            // Lost a race with a concurrent callback for the same email.
            Err(UserError::DuplicateEmail(_)) => self
                .repository
                .find_by_email(&email)
                .await?
                .ok_or_else(|| {
                    UserError::PersistenceError("User vanished after insert conflict".to_string())
                }),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<UR, IP> UserServicePort for UserService<UR, IP>
where
    UR: UserRepository,
    IP: IdentityProvider,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError> {
        let email = self.canonical_email(command.email);

        // Early exit only; the store's unique constraint decides races.
        if self.repository.find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "Registration rejected: email already registered");
            return Err(UserError::DuplicateEmail(email.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let user = User {
            id: UserId::new(),
            email,
            password_hash: Some(password_hash),
            created_at: Utc::now(),
        };

        let created_user = self.repository.insert(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<AccessToken, UserError> {
        let email = self.canonical_email(command.email);

        let Some(user) = self.repository.find_by_email(&email).await? else {
            tracing::debug!("Login rejected: unknown email");
            self.verify_against_dummy(command.password).await?;
            return Err(UserError::InvalidCredentials);
        };

        let Some(stored_hash) = user.password_hash.clone() else {
            tracing::debug!(user_id = %user.id, "Login rejected: account has no password");
            self.verify_against_dummy(command.password).await?;
            return Err(UserError::InvalidCredentials);
        };

        let token = self
            .verify_and_issue(command.password, stored_hash, user.id.to_string())
            .await
            .inspect_err(|e| {
                if matches!(e, UserError::InvalidCredentials) {
                    tracing::debug!(user_id = %user.id, "Login rejected: password mismatch");
                }
            })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(token)
    }

    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, UserError> {
        let subject = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(reason = %e, "Token verification failed");
            UserError::Unauthorized(e)
        })?;

        let user_id = UserId::from_string(&subject).map_err(|e| {
            tracing::warn!(reason = %e, "Token subject is not a user id");
            UserError::Unauthorized(JwtError::MalformedClaims(e.to_string()))
        })?;

        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Token subject no longer exists");
                UserError::UserNotFound(user_id.to_string())
            })?;

        Ok(AuthenticatedUser::from(&user))
    }

    async fn authorization_url(&self, provider: OAuthProvider) -> Result<String, UserError> {
        let redirect_uri = self.redirect_uri(provider);

        Ok(self
            .identity_provider
            .authorize_url(provider, &redirect_uri)?)
    }

    async fn complete_oauth(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<OAuthLogin, UserError> {
        let redirect_uri = self.redirect_uri(provider);

        let identity = self
            .identity_provider
            .exchange_code(provider, code, &redirect_uri)
            .await
            .inspect_err(|e| {
                tracing::error!(provider = %provider, error = %e, "OAuth code exchange failed");
            })?;

        let email = self.canonical_email(identity.email.clone());
        let user = self.find_or_create_oauth_user(email).await?;

        let token = self
            .authenticator
            .issue_token(&user.id.to_string())
            .map_err(|e| UserError::Unknown(format!("Token generation failed: {}", e)))?;

        tracing::info!(
            user_id = %user.id,
            provider = %provider,
            external_id = %identity.external_id,
            "User logged in through OAuth"
        );

        Ok(OAuthLogin {
            user: AuthenticatedUser::from(&user),
            identity,
            token: token.into(),
        })
    }

    async fn complete_onboarding(
        &self,
        user: &AuthenticatedUser,
        command: OnboardingCommand,
    ) -> Result<Profile, UserError> {
        command.validate()?;

        let profile = self
            .repository
            .upsert_profile(command.into_profile(user.id))
            .await?;

        tracing::info!(user_id = %user.id, "Onboarding profile saved");
        Ok(profile)
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, UserError> {
        self.repository
            .find_profile(user_id)
            .await?
            .ok_or(UserError::ProfileNotFound(user_id.to_string()))
    }
}
