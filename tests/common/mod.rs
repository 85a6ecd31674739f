#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use job_board_backend::{
    config::{get_config, init_config},
    database::{JobBoardStore, MemoryStore},
    routes::build_router,
    services::ml_service::MlRecommender,
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

pub fn setup_config() {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("PUBLIC_RPS", "10000");
    env::remove_var("DATABASE_URL");
    env::remove_var("ML_SERVICE_URL");
    // several tests in one binary race to initialize; the first one wins
    let _ = init_config();
}

pub fn app() -> Router {
    setup_config();
    let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
    let state = AppState::new(store).expect("app state");
    build_router(state, get_config())
}

pub fn app_with_recommender(ml: Arc<dyn MlRecommender>) -> Router {
    setup_config();
    let store: Arc<dyn JobBoardStore> = Arc::new(MemoryStore::new());
    build_router(AppState::with_recommender(store, Some(ml)), get_config())
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<JsonValue>,
    token: Option<&str>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}

pub async fn register_seeker(app: &Router, username: &str, skills: &[&str]) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "username": username,
            "password": "secret",
            "role": "seeker",
            "name": "Test Seeker",
            "degree": "BSc Computer Science",
            "skills": skills,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register seeker: {}", body);
}

/// Registers a poster and returns a bearer token for it.
pub async fn poster_token(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        Some(json!({
            "username": username,
            "password": "secret",
            "role": "poster",
            "name": "Hiring Manager",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register poster: {}", body);
    login(app, username).await
}

pub async fn login(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        Some(json!({"username": username, "password": "secret"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Creates an employer posting and returns its id.
pub async fn create_job(app: &Router, token: &str, company: &str, skills: &[&str]) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/jobs",
        Some(json!({
            "company_name": company,
            "description": "Engineering role",
            "category": "Engineering",
            "employment_type": "Full-time",
            "workplace": "Remote",
            "location": "Berlin",
            "department": "Platform",
            "skills": skills,
        })),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create job: {}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Imports seeded postings in order and returns their ids.
pub async fn import_jobs(app: &Router, token: &str, jobs: &[(&str, &[&str])]) -> Vec<String> {
    let jobs: Vec<JsonValue> = jobs
        .iter()
        .map(|(company, skills)| {
            json!({"company_name": company, "description": "Seeded role", "skills": skills})
        })
        .collect();
    let (status, body) = send(
        app,
        Method::POST,
        "/api/jobs/import",
        Some(json!({ "jobs": jobs })),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "import: {}", body);
    body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap().to_string())
        .collect()
}

pub fn ids(list: &JsonValue) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap().to_string())
        .collect()
}
