use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::account::AccountRole;
use crate::services::credential_service::CredentialService;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    pub username: String,
    pub role: Option<String>,
    pub exp: usize,
}

impl Claims {
    pub fn role(&self) -> Option<AccountRole> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }
}

fn reject(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

fn bearer_claims(req: &Request) -> Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(StatusCode::UNAUTHORIZED, "missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(StatusCode::UNAUTHORIZED, "bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(reject(StatusCode::UNAUTHORIZED, "unsupported_scheme"));
    };

    let config = crate::config::get_config();
    CredentialService::new(config.jwt_secret.clone(), config.token_ttl_hours)
        .verify(token)
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "invalid_token"))
}

/// Bearer auth restricted to job posters.
pub async fn require_poster(mut req: Request, next: Next) -> Response {
    let claims = match bearer_claims(&req) {
        Ok(claims) => claims,
        Err(rejection) => return rejection,
    };
    if claims.role() != Some(AccountRole::Poster) {
        return reject(StatusCode::FORBIDDEN, "forbidden");
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}
