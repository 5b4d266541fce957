use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::profile::errors::ProfileError;
use crate::domain::profile::models::ApiKeys;
use crate::domain::profile::models::CareerPreferences;
use crate::domain::profile::models::Education;
use crate::domain::profile::models::OnboardingCommand;
use crate::domain::profile::models::Profile;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub async fn onboarding<S: UserServicePort>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<OnboardingRequest>, JsonRejection>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    let Json(body) = payload?;
    let command = body
        .try_into_command()
        .map_err(|e| ApiError::ValidationError(e.to_string()))?;

    state
        .user_service
        .complete_onboarding(&user, command)
        .await
        .map_err(ApiError::from)
        .map(|ref profile| ApiSuccess::new(StatusCode::CREATED, profile.into()))
}

/// HTTP request body for onboarding (raw JSON)
#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingRequest {
    full_name: String,
    date_of_birth: NaiveDate,
    secondary_email: Option<String>,
    address: String,
    profile_photo_url: Option<String>,
    govt_id_url: Option<String>,
    linkedin_url: Option<String>,
    github_username: Option<String>,
    skills: Vec<String>,
    #[serde(default)]
    education: Vec<Education>,
    career_preferences: CareerPreferences,
    #[serde(default)]
    api_keys: ApiKeys,
}

impl OnboardingRequest {
    fn try_into_command(self) -> Result<OnboardingCommand, ProfileError> {
        let secondary_email = non_blank(self.secondary_email)
            .map(|email| {
                EmailAddress::new(email)
                    .map_err(|e| ProfileError::InvalidSecondaryEmail(e.to_string()))
            })
            .transpose()?;

        let command = OnboardingCommand {
            full_name: self.full_name,
            date_of_birth: self.date_of_birth,
            secondary_email,
            address: self.address,
            profile_photo_url: non_blank(self.profile_photo_url),
            govt_id_url: non_blank(self.govt_id_url),
            linkedin_url: non_blank(self.linkedin_url),
            github_username: non_blank(self.github_username),
            skills: self.skills,
            education: self.education,
            career_preferences: self.career_preferences,
            api_keys: self.api_keys,
        };
        command.validate()?;

        Ok(command)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Stored profile as returned to its owner. API key values are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub user_id: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub secondary_email: Option<String>,
    pub address: String,
    pub profile_photo_url: Option<String>,
    pub govt_id_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    pub career_preferences: CareerPreferences,
    pub api_keys_configured: Vec<&'static str>,
    pub onboarding_completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileResponseData {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            full_name: profile.full_name.clone(),
            date_of_birth: profile.date_of_birth,
            secondary_email: profile
                .secondary_email
                .as_ref()
                .map(|email| email.as_str().to_string()),
            address: profile.address.clone(),
            profile_photo_url: profile.profile_photo_url.clone(),
            govt_id_url: profile.govt_id_url.clone(),
            linkedin_url: profile.linkedin_url.clone(),
            github_username: profile.github_username.clone(),
            skills: profile.skills.clone(),
            education: profile.education.clone(),
            career_preferences: profile.career_preferences.clone(),
            api_keys_configured: profile.api_keys.configured(),
            onboarding_completed: profile.onboarding_completed,
            updated_at: profile.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body() -> serde_json::Value {
        json!({
            "full_name": "Ada Lovelace",
            "date_of_birth": "1990-12-10",
            "address": "12 St James's Square, London",
            "skills": ["rust"],
            "career_preferences": {
                "preferred_roles": ["engineer"],
                "preferred_locations": ["London"],
                "work_preference": ["remote"],
                "other_preferences": []
            }
        })
    }

    fn parse(body: serde_json::Value) -> Result<OnboardingRequest, serde_json::Error> {
        serde_json::from_value(body)
    }

    fn request(overrides: serde_json::Value) -> OnboardingRequest {
        let mut body = body();
        if let (Some(base), Some(extra)) = (body.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        parse(body).unwrap()
    }

    #[test]
    fn test_optional_sections_default_to_empty() {
        let command = request(json!({})).try_into_command().unwrap();
        assert_eq!(command.career_preferences.preferred_roles, vec!["engineer"]);
        assert_eq!(command.career_preferences.target_lpa, None);
        assert!(command.education.is_empty());
        assert_eq!(command.api_keys, ApiKeys::default());
    }

    #[test]
    fn test_required_sections_must_be_present() {
        let mut without_skills = body();
        without_skills.as_object_mut().unwrap().remove("skills");
        assert!(parse(without_skills).is_err());

        let mut without_preferences = body();
        without_preferences.as_object_mut().unwrap().remove("career_preferences");
        assert!(parse(without_preferences).is_err());

        let mut without_roles = body();
        without_roles["career_preferences"]
            .as_object_mut()
            .unwrap()
            .remove("preferred_roles");
        assert!(parse(without_roles).is_err());
    }

    #[test]
    fn test_invalid_secondary_email() {
        let result = request(json!({ "secondary_email": "not-an-email" })).try_into_command();
        assert!(matches!(result, Err(ProfileError::InvalidSecondaryEmail(_))));
    }

    #[test]
    fn test_blank_optional_fields_are_dropped() {
        let command = request(json!({ "secondary_email": "  ", "github_username": "" }))
            .try_into_command()
            .unwrap();
        assert!(command.secondary_email.is_none());
        assert!(command.github_username.is_none());
    }

    #[test]
    fn test_linkedin_url_must_be_http() {
        let ok = request(json!({ "linkedin_url": "https://www.linkedin.com/in/ada" }))
            .try_into_command();
        assert!(ok.is_ok());

        for bad in ["linkedin.com/in/ada", "ftp://linkedin.com/in/ada"] {
            let result = request(json!({ "linkedin_url": bad })).try_into_command();
            assert!(matches!(result, Err(ProfileError::InvalidLinkedinUrl(_))), "{bad}");
        }
    }

    #[test]
    fn test_blank_full_name_rejected() {
        let result = request(json!({ "full_name": "   " })).try_into_command();
        assert_eq!(result.unwrap_err(), ProfileError::EmptyField("full_name"));
    }

    #[test]
    fn test_response_withholds_api_key_values() {
        let mut command = request(json!({})).try_into_command().unwrap();
        command.api_keys.gemini_ai_key = Some("sk-secret".to_string());
        let profile = command.into_profile(crate::domain::user::models::UserId::new());

        let data = ProfileResponseData::from(&profile);
        assert_eq!(data.api_keys_configured, vec!["gemini_ai_key"]);
        assert!(!serde_json::to_string(&data).unwrap().contains("sk-secret"));
    }
}
