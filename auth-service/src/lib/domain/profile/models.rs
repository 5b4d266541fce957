use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::domain::profile::errors::ProfileError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserId;

/// Onboarding profile, keyed 1:1 by the owning user's id.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub secondary_email: Option<EmailAddress>,
    pub address: String,
    pub profile_photo_url: Option<String>,
    pub govt_id_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    pub career_preferences: CareerPreferences,
    pub api_keys: ApiKeys,
    pub onboarding_completed: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerPreferences {
    pub preferred_roles: Vec<String>,
    pub target_lpa: Option<i64>,
    pub preferred_locations: Vec<String>,
    pub work_preference: Vec<String>,
    pub other_preferences: Vec<String>,
}

/// Third-party API keys supplied during onboarding. Stored, never echoed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub gemini_ai_key: Option<String>,
    pub linkedin_api_key: Option<String>,
    pub naukri_api_key: Option<String>,
    pub indeed_api_key: Option<String>,
    pub gmail_api_key: Option<String>,
}

impl ApiKeys {
    /// Names of the keys that carry a non-empty value.
    pub fn configured(&self) -> Vec<&'static str> {
        [
            ("gemini_ai_key", &self.gemini_ai_key),
            ("linkedin_api_key", &self.linkedin_api_key),
            ("naukri_api_key", &self.naukri_api_key),
            ("indeed_api_key", &self.indeed_api_key),
            ("gmail_api_key", &self.gmail_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_some_and(|v| !v.is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Command to create or replace the caller's onboarding profile
#[derive(Debug, Clone)]
pub struct OnboardingCommand {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub secondary_email: Option<EmailAddress>,
    pub address: String,
    pub profile_photo_url: Option<String>,
    pub govt_id_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    pub career_preferences: CareerPreferences,
    pub api_keys: ApiKeys,
}

impl OnboardingCommand {
    /// Check the invariants the inbound adapter cannot express in types.
    ///
    /// # Errors
    /// * `EmptyField` - `full_name` or `address` is blank
    /// * `InvalidDateOfBirth` - Date lies in the future
    /// * `InvalidLinkedinUrl` - URL is not an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.full_name.trim().is_empty() {
            return Err(ProfileError::EmptyField("full_name"));
        }
        if self.address.trim().is_empty() {
            return Err(ProfileError::EmptyField("address"));
        }
        if self.date_of_birth > Utc::now().date_naive() {
            return Err(ProfileError::InvalidDateOfBirth(
                "date lies in the future".to_string(),
            ));
        }
        if let Some(linkedin_url) = &self.linkedin_url {
            validate_http_url(linkedin_url)?;
        }
        Ok(())
    }

    /// Materialize the profile for `user_id`, marking onboarding as completed.
    pub fn into_profile(self, user_id: UserId) -> Profile {
        Profile {
            user_id,
            full_name: self.full_name.trim().to_string(),
            date_of_birth: self.date_of_birth,
            secondary_email: self.secondary_email,
            address: self.address.trim().to_string(),
            profile_photo_url: self.profile_photo_url,
            govt_id_url: self.govt_id_url,
            linkedin_url: self.linkedin_url,
            github_username: self.github_username,
            skills: self.skills,
            education: self.education,
            career_preferences: self.career_preferences,
            api_keys: self.api_keys,
            onboarding_completed: true,
            updated_at: Utc::now(),
        }
    }
}

fn validate_http_url(value: &str) -> Result<(), ProfileError> {
    let url = Url::parse(value).map_err(|e| ProfileError::InvalidLinkedinUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ProfileError::InvalidLinkedinUrl(format!(
            "unsupported scheme {}",
            scheme
        ))),
    }
}
