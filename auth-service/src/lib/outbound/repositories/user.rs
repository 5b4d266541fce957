use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::profile::models::ApiKeys;
use crate::domain::profile::models::CareerPreferences;
use crate::domain::profile::models::Education;
use crate::domain::profile::models::Profile;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";

/// PostgreSQL implementation of UserRepository.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: String,
    date_of_birth: NaiveDate,
    secondary_email: Option<String>,
    address: String,
    profile_photo_url: Option<String>,
    govt_id_url: Option<String>,
    linkedin_url: Option<String>,
    github_username: Option<String>,
    skills: Vec<String>,
    education: Json<Vec<Education>>,
    career_preferences: Json<CareerPreferences>,
    api_keys: Json<ApiKeys>,
    onboarding_completed: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = UserError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            user_id: UserId(row.id),
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            secondary_email: row.secondary_email.map(EmailAddress::new).transpose()?,
            address: row.address,
            profile_photo_url: row.profile_photo_url,
            govt_id_url: row.govt_id_url,
            linkedin_url: row.linkedin_url,
            github_username: row.github_username,
            skills: row.skills,
            education: row.education.0,
            career_preferences: row.career_preferences.0,
            api_keys: row.api_keys.0,
            onboarding_completed: row.onboarding_completed,
            updated_at: row.updated_at,
        })
    }
}

fn persistence_error(e: sqlx::Error) -> UserError {
    UserError::PersistenceError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_error)?;

        row.map(User::try_from).transpose()
    }

    async fn insert(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.password_hash.as_deref())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(USERS_EMAIL_CONSTRAINT)
                {
                    return UserError::DuplicateEmail(user.email.to_string());
                }
            }
            persistence_error(e)
        })?;

        Ok(user)
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<Profile, UserError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (
                id, full_name, date_of_birth, secondary_email, address,
                profile_photo_url, govt_id_url, linkedin_url, github_username,
                skills, education, career_preferences, api_keys,
                onboarding_completed, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id)
            DO UPDATE SET
                full_name = EXCLUDED.full_name,
                date_of_birth = EXCLUDED.date_of_birth,
                secondary_email = EXCLUDED.secondary_email,
                address = EXCLUDED.address,
                profile_photo_url = EXCLUDED.profile_photo_url,
                govt_id_url = EXCLUDED.govt_id_url,
                linkedin_url = EXCLUDED.linkedin_url,
                github_username = EXCLUDED.github_username,
                skills = EXCLUDED.skills,
                education = EXCLUDED.education,
                career_preferences = EXCLUDED.career_preferences,
                api_keys = EXCLUDED.api_keys,
                onboarding_completed = EXCLUDED.onboarding_completed,
                updated_at = EXCLUDED.updated_at
            RETURNING
                id, full_name, date_of_birth, secondary_email, address,
                profile_photo_url, govt_id_url, linkedin_url, github_username,
                skills, education, career_preferences, api_keys,
                onboarding_completed, updated_at
            "#,
        )
        .bind(profile.user_id.0)
        .bind(&profile.full_name)
        .bind(profile.date_of_birth)
        .bind(profile.secondary_email.as_ref().map(EmailAddress::as_str))
        .bind(&profile.address)
        .bind(profile.profile_photo_url.as_deref())
        .bind(profile.govt_id_url.as_deref())
        .bind(profile.linkedin_url.as_deref())
        .bind(profile.github_username.as_deref())
        .bind(&profile.skills)
        .bind(Json(&profile.education))
        .bind(Json(&profile.career_preferences))
        .bind(Json(&profile.api_keys))
        .bind(profile.onboarding_completed)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(persistence_error)?;

        tracing::debug!("Profile {} upserted", profile.user_id);
        Profile::try_from(row)
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<Profile>, UserError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                id, full_name, date_of_birth, secondary_email, address,
                profile_photo_url, govt_id_url, linkedin_url, github_username,
                skills, education, career_preferences, api_keys,
                onboarding_completed, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_error)?;

        row.map(Profile::try_from).transpose()
    }
}
