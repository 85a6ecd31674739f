use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{LoginPayload, ProfileResponse, RegisterPayload, TokenResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account registered", body = Json<ProfileResponse>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Username already taken")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state.account_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Bearer token issued", body = Json<TokenResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let token = state.account_service.login(payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile/{username}",
    params(
        ("username" = String, Path, description = "Account username")
    ),
    responses(
        (status = 200, description = "Account profile", body = Json<ProfileResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse> {
    let profile = state.account_service.profile(&username).await?;
    Ok(Json(ProfileResponse::from(profile)))
}
