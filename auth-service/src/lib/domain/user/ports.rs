use async_trait::async_trait;

use crate::domain::profile::models::OnboardingCommand;
use crate::domain::profile::models::Profile;
use crate::domain::user::models::AccessToken;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::ExternalIdentity;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::OAuthLogin;
use crate::domain::user::models::OAuthProvider;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::IdentityProviderError;
use crate::user::errors::UserError;

/// Port for credential, token, and profile operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new email/password credential.
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `PersistenceError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<User, UserError>;

    /// Verify email and password and issue an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `PersistenceError` - Store operation failed
    async fn login(&self, command: LoginCommand) -> Result<AccessToken, UserError>;

    /// Resolve a bearer token to the identity it was issued for.
    ///
    /// # Errors
    /// * `Unauthorized` - Signature, expiry, or claim validation failed
    /// * `UserNotFound` - Token is valid but the user no longer exists
    /// * `PersistenceError` - Store operation failed
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, UserError>;

    /// Build the provider URL the client is redirected to.
    ///
    /// # Errors
    /// * `ExternalProvider` - Provider is not configured
    async fn authorization_url(&self, provider: OAuthProvider) -> Result<String, UserError>;

    /// Complete an OAuth callback: exchange the code, map or create the local
    /// credential, and issue a local access token.
    ///
    /// # Errors
    /// * `ExternalProvider` - Exchange with the provider failed
    /// * `PersistenceError` - Store operation failed
    async fn complete_oauth(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<OAuthLogin, UserError>;

    /// Create or replace the onboarding profile of an authenticated user.
    ///
    /// # Errors
    /// * `InvalidProfile` - Command violates profile invariants
    /// * `PersistenceError` - Store operation failed
    async fn complete_onboarding(
        &self,
        user: &AuthenticatedUser,
        command: OnboardingCommand,
    ) -> Result<Profile, UserError>;

    /// Retrieve the onboarding profile of a user.
    ///
    /// # Errors
    /// * `ProfileNotFound` - User has not onboarded yet
    /// * `PersistenceError` - Store operation failed
    async fn get_profile(&self, user_id: &UserId) -> Result<Profile, UserError>;
}

/// Persistence operations for credentials and profiles.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user by email address (exact match).
    ///
    /// # Errors
    /// * `PersistenceError` - Store operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `PersistenceError` - Store operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Persist a new user.
    ///
    /// The store's uniqueness constraint on email is the final arbiter for
    /// concurrent registrations.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `PersistenceError` - Store operation failed
    async fn insert(&self, user: User) -> Result<User, UserError>;

    /// Insert or replace the profile keyed by `profile.user_id`.
    ///
    /// # Errors
    /// * `PersistenceError` - Store operation failed or user does not exist
    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, UserError>;

    /// Retrieve the profile of a user.
    ///
    /// # Errors
    /// * `PersistenceError` - Store operation failed
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, UserError>;
}

/// External OAuth identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Build the provider's authorization URL for the code flow.
    ///
    /// # Errors
    /// * `NotConfigured` - No client credentials for this provider
    fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_uri: &str,
    ) -> Result<String, IdentityProviderError>;

    /// Exchange an authorization code for the provider-verified identity.
    ///
    /// # Errors
    /// * `NotConfigured` - No client credentials for this provider
    /// * `RequestFailed` - Provider unreachable
    /// * `Rejected` - Provider refused the code
    /// * `InvalidResponse` - Provider answered with an unexpected payload
    /// * `MissingEmail` - Provider did not disclose a verified email
    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExternalIdentity, IdentityProviderError>;
}
