use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::profile::models::Profile;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local UserRepository.
///
/// Backs local runs without a database and the black-box test suite. Enforces
/// the same email uniqueness and profile ownership rules as the Postgres schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    profiles: RwLock<HashMap<UserId, Profile>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user and its profile, returning the removed user.
    ///
    /// Not part of the repository port; credentials are never deleted by the
    /// service itself.
    pub async fn delete(&self, id: &UserId) -> Option<User> {
        let removed = self.users.write().await.remove(id);
        if removed.is_some() {
            self.profiles.write().await.remove(id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email.to_string()));
        }
        if users.contains_key(&user.id) {
            return Err(UserError::PersistenceError(format!(
                "User id already exists: {}",
                user.id
            )));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, UserError> {
        if !self.users.read().await.contains_key(&profile.user_id) {
            return Err(UserError::PersistenceError(format!(
                "Profile references unknown user: {}",
                profile.user_id
            )));
        }

        self.profiles
            .write()
            .await
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, UserError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use chrono::Utc;

    use super::*;
    use crate::domain::profile::models::ApiKeys;
    use crate::domain::profile::models::CareerPreferences;

    fn user(email: &str) -> User {
        User {
            id: UserId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: Some("$argon2id$test_hash".to_string()),
            created_at: Utc::now(),
        }
    }

    fn profile(user_id: UserId, full_name: &str) -> Profile {
        Profile {
            user_id,
            full_name: full_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            secondary_email: None,
            address: "Somewhere".to_string(),
            profile_photo_url: None,
            govt_id_url: None,
            linkedin_url: None,
            github_username: None,
            skills: vec![],
            education: vec![],
            career_preferences: CareerPreferences {
                preferred_roles: vec![],
                target_lpa: None,
                preferred_locations: vec![],
                work_preference: vec![],
                other_preferences: vec![],
            },
            api_keys: ApiKeys::default(),
            onboarding_completed: true,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repository = InMemoryUserRepository::new();
        let created = repository.insert(user("a@x.com")).await.unwrap();

        let by_id = repository.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, created.email);

        let by_email = repository
            .find_by_email(&created.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn test_insert_enforces_unique_email() {
        let repository = InMemoryUserRepository::new();
        repository.insert(user("a@x.com")).await.unwrap();

        let result = repository.insert(user("a@x.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact() {
        let repository = InMemoryUserRepository::new();
        repository.insert(user("a@x.com")).await.unwrap();

        let upper = EmailAddress::new("A@X.com".to_string()).unwrap();
        assert!(repository.find_by_email(&upper).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_profile_replaces_existing() {
        let repository = InMemoryUserRepository::new();
        let created = repository.insert(user("a@x.com")).await.unwrap();

        repository
            .upsert_profile(profile(created.id, "First"))
            .await
            .unwrap();
        repository
            .upsert_profile(profile(created.id, "Second"))
            .await
            .unwrap();

        let stored = repository.find_profile(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.full_name, "Second");
    }

    #[tokio::test]
    async fn test_upsert_profile_requires_user() {
        let repository = InMemoryUserRepository::new();

        let result = repository.upsert_profile(profile(UserId::new(), "Ghost")).await;
        assert!(matches!(result, Err(UserError::PersistenceError(_))));
    }

    #[tokio::test]
    async fn test_delete_drops_user_and_profile() {
        let repository = InMemoryUserRepository::new();
        let created = repository.insert(user("a@x.com")).await.unwrap();
        repository
            .upsert_profile(profile(created.id, "Ada"))
            .await
            .unwrap();

        assert!(repository.delete(&created.id).await.is_some());
        assert!(repository.find_by_id(&created.id).await.unwrap().is_none());
        assert!(repository.find_profile(&created.id).await.unwrap().is_none());
        assert!(repository.is_empty().await);
    }
}
