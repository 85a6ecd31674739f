use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::posting_dto::{
        CreateJobPayload, FeedResponse, ImportJobsPayload, ImportJobsResponse, JobResponse,
        RecommendationListResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::posting::{PostingOrigin, PostingRef},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "Every posting, new applications first", body = Json<FeedResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let feed = state.feed_service.feed().await?;
    Ok(Json(FeedResponse::from(feed)))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job posted", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a job poster")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let posted_by = Uuid::parse_str(&claims.sub)
        .map_err(|_| Error::Unauthorized("token subject is not an account id".to_string()))?;
    let posting = state.posting_service.create(payload, posted_by).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(posting))))
}

#[utoipa::path(
    post,
    path = "/api/jobs/import",
    request_body = ImportJobsPayload,
    responses(
        (status = 201, description = "Seeded postings imported", body = Json<ImportJobsResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not a job poster")
    )
)]
#[axum::debug_handler]
pub async fn import_jobs(
    State(state): State<AppState>,
    Json(payload): Json<ImportJobsPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let imported = state.posting_service.import_seeded(payload.jobs).await?;
    let jobs: Vec<JobResponse> = imported.into_iter().map(JobResponse::from).collect();
    Ok((
        StatusCode::CREATED,
        Json(ImportJobsResponse {
            imported: jobs.len(),
            jobs,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{origin}/{id}",
    params(
        ("origin" = String, Path, description = "created or seeded"),
        ("id" = Uuid, Path, description = "Posting ID")
    ),
    responses(
        (status = 200, description = "Posting found", body = Json<JobResponse>),
        (status = 400, description = "Unknown origin"),
        (status = 404, description = "Posting not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path((origin, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse> {
    let origin: PostingOrigin = origin.parse().map_err(Error::BadRequest)?;
    let posting = state.posting_service.get(PostingRef::new(origin, id)).await?;
    Ok(Json(JobResponse::from(posting)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/recommendations/{username}",
    params(
        ("username" = String, Path, description = "Job seeker username")
    ),
    responses(
        (status = 200, description = "Ranked postings", body = Json<RecommendationListResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    let list = state.recommendation_service.recommend_for(&username).await?;
    Ok(Json(RecommendationListResponse::from(list)))
}
