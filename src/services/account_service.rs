use std::sync::Arc;

use tracing::info;
use validator::{ValidationError, ValidationErrors};

use crate::database::JobBoardStore;
use crate::dto::auth_dto::{LoginPayload, RegisterPayload};
use crate::error::{Error, Result};
use crate::models::account::{Account, AccountRole, NewAccount};
use crate::models::skill::Skill;
use crate::services::credential_service::{hash_password, verify_password, CredentialService};

/// An account together with its resolved skill names.
#[derive(Debug, Clone)]
pub struct Profile {
    pub account: Account,
    pub skills: Vec<Skill>,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn JobBoardStore>,
    credentials: CredentialService,
}

fn missing(field: &'static str) -> Error {
    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new("required");
    error.message = Some(format!("{} is required", field).into());
    errors.add(field, error);
    Error::Validation(errors)
}

fn required(value: &Option<String>, field: &'static str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| missing(field))
}

impl AccountService {
    pub fn new(store: Arc<dyn JobBoardStore>, credentials: CredentialService) -> Self {
        Self { store, credentials }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<Profile> {
        let role: AccountRole = payload.role.parse().map_err(Error::BadRequest)?;
        let username = payload.username.trim().to_string();
        if username.is_empty() {
            return Err(missing("username"));
        }
        if payload.password.is_empty() {
            return Err(missing("password"));
        }

        let (display_name, education, skills) = match role {
            AccountRole::Seeker => {
                let display_name = required(&payload.name, "name")?;
                let education = required(&payload.degree, "degree")?;
                let raw_skills = payload.skills.ok_or_else(|| missing("skills"))?;
                let skills = self.store.upsert_skills(&raw_skills).await?;
                (Some(display_name), Some(education), skills)
            }
            AccountRole::Poster => (
                payload.name.filter(|n| !n.trim().is_empty()),
                None,
                Vec::new(),
            ),
        };

        let account = self
            .store
            .create_account(NewAccount {
                username,
                password_hash: hash_password(&payload.password)?,
                role,
                display_name,
                education,
                skill_ids: skills.iter().map(|s| s.id).collect(),
            })
            .await?;

        info!(account_id = %account.id, username = %account.username, role = %account.role, "account registered");
        Ok(Profile { account, skills })
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<String> {
        let account = self
            .store
            .account_by_username(payload.username.trim())
            .await?
            .filter(|a| verify_password(&payload.password, &a.password_hash))
            .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;
        self.credentials.issue(&account)
    }

    pub async fn profile(&self, username: &str) -> Result<Profile> {
        let account = self
            .store
            .account_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound("User not found.".to_string()))?;
        let skills = self.store.skills_by_ids(&account.skill_ids).await?;
        Ok(Profile { account, skills })
    }
}
