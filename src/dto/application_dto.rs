use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::posting_dto::JobResponse;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::posting::{PostingOrigin, PostingRef};
use crate::services::application_service::{Applicant, ApplicationCheck, ApplicationDetail};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplyPayload {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: String,
    #[serde(alias = "jobId")]
    pub job_id: Uuid,
    /// `created`/`seeded`, or the legacy `CreatedJob`/`Job`. Defaults to seeded.
    #[serde(default, alias = "jobType")]
    pub job_type: Option<String>,
}

impl ApplyPayload {
    pub fn posting_ref(&self) -> Result<PostingRef> {
        let origin = match self.job_type.as_deref() {
            None => PostingOrigin::Seeded,
            Some(tag) => tag.parse().map_err(Error::BadRequest)?,
        };
        Ok(PostingRef::new(origin, self.job_id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub job_id: Uuid,
    pub job_type: PostingOrigin,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub status_updated_at: Option<DateTime<Utc>>,
}

impl From<Application> for ApplicationResponse {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            account_id: a.account_id,
            job_id: a.posting_id,
            job_type: a.posting_origin,
            status: a.status,
            applied_at: a.applied_at,
            viewed_at: a.viewed_at,
            status_updated_at: a.status_updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicantResponse {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub degree: Option<String>,
    pub skills: Vec<String>,
}

impl From<Applicant> for ApplicantResponse {
    fn from(a: Applicant) -> Self {
        Self {
            id: a.account_id,
            username: a.username,
            name: a.display_name,
            degree: a.education,
            skills: a.skills,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationDetailResponse {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<ApplicantResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobResponse>,
}

impl From<ApplicationDetail> for ApplicationDetailResponse {
    fn from(d: ApplicationDetail) -> Self {
        Self {
            application: ApplicationResponse::from(d.application),
            applicant: d.applicant.map(ApplicantResponse::from),
            job: d.posting.map(JobResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationDetailResponse>,
    pub total: usize,
}

impl From<Vec<ApplicationDetail>> for ApplicationListResponse {
    fn from(details: Vec<ApplicationDetail>) -> Self {
        let applications: Vec<ApplicationDetailResponse> = details
            .into_iter()
            .map(ApplicationDetailResponse::from)
            .collect();
        Self {
            total: applications.len(),
            applications,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub has_applied: bool,
    pub status: Option<ApplicationStatus>,
    pub application: Option<ApplicationResponse>,
}

impl From<ApplicationCheck> for CheckResponse {
    fn from(c: ApplicationCheck) -> Self {
        Self {
            has_applied: c.has_applied,
            status: c.status,
            application: c.application.map(ApplicationResponse::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}
