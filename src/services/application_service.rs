use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::database::JobBoardStore;
use crate::error::{Error, Result};
use crate::models::account::Account;
use crate::models::application::{Application, ApplicationStatus, NewApplication, StatusChange};
use crate::models::posting::{Posting, PostingRef};

#[derive(Debug, Clone, Serialize)]
pub struct Applicant {
    pub account_id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub education: Option<String>,
    pub skills: Vec<String>,
}

/// An application joined with whatever side of it the caller asked for.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub application: Application,
    pub applicant: Option<Applicant>,
    pub posting: Option<Posting>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationCheck {
    pub has_applied: bool,
    pub status: Option<ApplicationStatus>,
    pub application: Option<Application>,
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn JobBoardStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn JobBoardStore>) -> Self {
        Self { store }
    }

    async fn account(&self, username: &str) -> Result<Account> {
        self.store
            .account_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound("User not found.".to_string()))
    }

    pub async fn apply(&self, username: &str, posting: PostingRef) -> Result<Application> {
        let account = self.account(username).await?;
        if self.store.posting(posting).await?.is_none() {
            return Err(Error::NotFound("Job not found.".to_string()));
        }

        let created = self
            .store
            .insert_application(NewApplication {
                account_id: account.id,
                posting,
                applied_at: Utc::now(),
            })
            .await?
            .ok_or(Error::DuplicateApplication)?;

        info!(
            application_id = %created.id,
            posting_id = %posting.id,
            origin = %posting.origin,
            username,
            "application submitted, new-application count +1"
        );
        Ok(created)
    }

    pub async fn check(&self, username: &str, posting_id: Uuid) -> Result<ApplicationCheck> {
        let Some(account) = self.store.account_by_username(username).await? else {
            return Ok(ApplicationCheck {
                has_applied: false,
                status: None,
                application: None,
            });
        };
        let application = self.store.application_for(account.id, posting_id).await?;
        Ok(ApplicationCheck {
            has_applied: application.is_some(),
            status: application.as_ref().map(|a| a.status),
            application,
        })
    }

    pub async fn count_new(&self, posting_id: Uuid) -> Result<i64> {
        self.store.count_new_applications(posting_id).await
    }

    /// Reviewer-driven status change. Validation order: status name, then
    /// existence, then the transition table.
    pub async fn update_status(&self, id: Uuid, requested: &str) -> Result<Application> {
        let next: ApplicationStatus = requested.parse().map_err(Error::InvalidStatus)?;
        if !next.is_reviewable() {
            return Err(Error::InvalidStatus(requested.to_string()));
        }

        let current = self
            .store
            .application(id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found.".to_string()))?;
        if !current.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }

        let change = StatusChange {
            from: current.status,
            to: next,
            at: Utc::now(),
        };
        match self.store.change_status(id, change).await? {
            Some(updated) => {
                let effect = if change.from == ApplicationStatus::Applied { -1 } else { 0 };
                info!(
                    application_id = %id,
                    posting_id = %updated.posting_id,
                    from = %change.from,
                    to = %change.to,
                    new_count_delta = effect,
                    "application status changed"
                );
                Ok(updated)
            }
            // lost a race with another reviewer
            None => match self.store.application(id).await? {
                Some(latest) => Err(Error::InvalidTransition {
                    from: latest.status.to_string(),
                    to: next.to_string(),
                }),
                None => Err(Error::NotFound("Application not found.".to_string())),
            },
        }
    }

    async fn applicant(&self, account: &Account) -> Result<Applicant> {
        let skills = self
            .store
            .skills_by_ids(&account.skill_ids)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        Ok(Applicant {
            account_id: account.id,
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            education: account.education.clone(),
            skills,
        })
    }

    async fn applicants(&self, applications: &[Application]) -> Result<HashMap<Uuid, Applicant>> {
        let mut applicants = HashMap::new();
        for application in applications {
            if applicants.contains_key(&application.account_id) {
                continue;
            }
            if let Some(account) = self.store.account_by_id(application.account_id).await? {
                applicants.insert(account.id, self.applicant(&account).await?);
            }
        }
        Ok(applicants)
    }

    async fn postings(&self, applications: &[Application]) -> Result<HashMap<PostingRef, Posting>> {
        let mut postings = HashMap::new();
        for application in applications {
            let posting_ref = application.posting_ref();
            if postings.contains_key(&posting_ref) {
                continue;
            }
            if let Some(posting) = self.store.posting(posting_ref).await? {
                postings.insert(posting_ref, posting);
            }
        }
        Ok(postings)
    }

    pub async fn list_for_posting(&self, posting_id: Uuid) -> Result<Vec<ApplicationDetail>> {
        let applications = self.store.applications_for_posting(posting_id).await?;
        let applicants = self.applicants(&applications).await?;
        Ok(applications
            .into_iter()
            .map(|application| ApplicationDetail {
                applicant: applicants.get(&application.account_id).cloned(),
                posting: None,
                application,
            })
            .collect())
    }

    pub async fn list_for_user(&self, username: &str) -> Result<Vec<ApplicationDetail>> {
        let account = self.account(username).await?;
        let applications = self.store.applications_for_account(account.id).await?;
        let postings = self.postings(&applications).await?;
        Ok(applications
            .into_iter()
            .map(|application| ApplicationDetail {
                applicant: None,
                posting: postings.get(&application.posting_ref()).cloned(),
                application,
            })
            .collect())
    }

    pub async fn list_all(&self) -> Result<Vec<ApplicationDetail>> {
        let applications = self.store.all_applications().await?;
        let applicants = self.applicants(&applications).await?;
        let postings = self.postings(&applications).await?;
        Ok(applications
            .into_iter()
            .map(|application| ApplicationDetail {
                applicant: applicants.get(&application.account_id).cloned(),
                posting: postings.get(&application.posting_ref()).cloned(),
                application,
            })
            .collect())
    }
}
