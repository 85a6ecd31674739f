use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::posting::{Posting, PostingOrigin};
use crate::services::feed_service::FeedItem;
use crate::services::recommendation_service::{
    Recommendation, RecommendationList, RecommendationSource,
};

/// Whitespace-only text counts as missing.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[serde(alias = "companyName")]
    #[validate(custom(function = "not_blank", message = "Company name cannot be empty"))]
    pub company_name: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "not_blank"))]
    pub category: String,
    #[serde(alias = "employmentType")]
    #[validate(custom(function = "not_blank"))]
    pub employment_type: String,
    #[validate(custom(function = "not_blank"))]
    pub workplace: String,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    #[validate(custom(function = "not_blank"))]
    pub department: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Catalog entry for bulk seeding; only company and description are required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SeedJobPayload {
    #[serde(alias = "companyName")]
    #[validate(custom(function = "not_blank", message = "Company name cannot be empty"))]
    pub company_name: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    pub category: Option<String>,
    #[serde(alias = "employmentType")]
    pub employment_type: Option<String>,
    pub workplace: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ImportJobsPayload {
    #[validate(length(min = 1), nested)]
    pub jobs: Vec<SeedJobPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub job_type: PostingOrigin,
    pub company_name: String,
    pub description: String,
    pub category: Option<String>,
    pub employment_type: Option<String>,
    pub workplace: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub skills: Vec<String>,
    pub posted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Posting> for JobResponse {
    fn from(p: Posting) -> Self {
        Self {
            id: p.id,
            job_type: p.origin,
            company_name: p.company_name,
            description: p.description,
            category: p.category,
            employment_type: p.employment_type,
            workplace: p.workplace,
            location: p.location,
            department: p.department,
            skills: p.skills.into_iter().map(|s| s.name).collect(),
            posted_by: p.posted_by,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportJobsResponse {
    pub imported: usize,
    pub jobs: Vec<JobResponse>,
}

#[derive(Debug, Serialize)]
pub struct FeedItemResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    pub new_application_count: i64,
    pub latest_new_application_at: Option<DateTime<Utc>>,
    pub has_new_applications: bool,
    pub bucket: u8,
}

impl From<FeedItem> for FeedItemResponse {
    fn from(item: FeedItem) -> Self {
        Self {
            job: JobResponse::from(item.posting),
            new_application_count: item.new_application_count,
            latest_new_application_at: item.latest_new_application_at,
            has_new_applications: item.has_new_applications,
            bucket: item.bucket,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub jobs: Vec<FeedItemResponse>,
    pub total: usize,
}

impl From<Vec<FeedItem>> for FeedResponse {
    fn from(items: Vec<FeedItem>) -> Self {
        let jobs: Vec<FeedItemResponse> = items.into_iter().map(FeedItemResponse::from).collect();
        Self {
            total: jobs.len(),
            jobs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    pub match_count: usize,
    pub score: f64,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(r: Recommendation) -> Self {
        Self {
            job: JobResponse::from(r.posting),
            match_count: r.match_count,
            score: r.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationListResponse {
    pub source: RecommendationSource,
    pub recommendations: Vec<RecommendationResponse>,
}

impl From<RecommendationList> for RecommendationListResponse {
    fn from(list: RecommendationList) -> Self {
        Self {
            source: list.source,
            recommendations: list
                .items
                .into_iter()
                .map(RecommendationResponse::from)
                .collect(),
        }
    }
}
