use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::account::AccountRole;
use crate::services::account_service::Profile;

/// Seekers must also send `name`, `degree` and `skills`; that rule is
/// role-dependent and checked by the account service.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
    #[serde(alias = "userType")]
    pub role: String,
    pub name: Option<String>,
    pub degree: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub role: AccountRole,
    pub name: Option<String>,
    pub degree: Option<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        let Profile { account, skills } = profile;
        Self {
            id: account.id,
            username: account.username,
            role: account.role,
            name: account.display_name,
            degree: account.education,
            skills: skills.into_iter().map(|s| s.name).collect(),
            created_at: account.created_at,
        }
    }
}
