use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListResponse, ApplicationResponse, ApplyPayload, CheckResponse, CountResponse,
        UpdateStatusPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = ApplyPayload,
    responses(
        (status = 201, description = "Application submitted", body = Json<ApplicationResponse>),
        (status = 400, description = "Invalid payload or job type"),
        (status = 404, description = "User or job not found"),
        (status = 409, description = "Already applied to this job")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let posting = payload.posting_ref()?;
    let application = state
        .application_service
        .apply(payload.username.trim(), posting)
        .await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(application))))
}

#[utoipa::path(
    get,
    path = "/api/applications/check/{username}/{job_id}",
    params(
        ("username" = String, Path, description = "Job seeker username"),
        ("job_id" = Uuid, Path, description = "Posting ID")
    ),
    responses(
        (status = 200, description = "Whether the user already applied", body = Json<CheckResponse>)
    )
)]
#[axum::debug_handler]
pub async fn check_application(
    State(state): State<AppState>,
    Path((username, job_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse> {
    let check = state.application_service.check(&username, job_id).await?;
    Ok(Json(CheckResponse::from(check)))
}

#[utoipa::path(
    get,
    path = "/api/applications/user/{username}",
    params(
        ("username" = String, Path, description = "Job seeker username")
    ),
    responses(
        (status = 200, description = "The user's applications, newest first", body = Json<ApplicationListResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    let details = state.application_service.list_for_user(&username).await?;
    Ok(Json(ApplicationListResponse::from(details)))
}

#[utoipa::path(
    get,
    path = "/api/applications/job/{job_id}",
    params(
        ("job_id" = Uuid, Path, description = "Posting ID")
    ),
    responses(
        (status = 200, description = "Applicants, newest first", body = Json<ApplicationListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let details = state.application_service.list_for_posting(job_id).await?;
    Ok(Json(ApplicationListResponse::from(details)))
}

#[utoipa::path(
    get,
    path = "/api/applications/count/{job_id}",
    params(
        ("job_id" = Uuid, Path, description = "Posting ID")
    ),
    responses(
        (status = 200, description = "Applications not yet reviewed", body = Json<CountResponse>)
    )
)]
#[axum::debug_handler]
pub async fn count_new(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let count = state.application_service.count_new(job_id).await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = Json<ApplicationResponse>),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .update_status(id, payload.status.trim())
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    get,
    path = "/api/applications/employer/all",
    responses(
        (status = 200, description = "Every application with applicant and job", body = Json<ApplicationListResponse>),
        (status = 403, description = "Caller is not a job poster")
    )
)]
#[axum::debug_handler]
pub async fn list_all(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let details = state.application_service.list_all().await?;
    Ok(Json(ApplicationListResponse::from(details)))
}
