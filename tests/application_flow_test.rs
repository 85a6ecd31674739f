mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value as JsonValue};

use common::{app, create_job, import_jobs, poster_token, register_seeker, send};

async fn count(app: &axum::Router, job_id: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::GET,
        &format!("/api/applications/count/{}", job_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["count"].as_i64().unwrap()
}

async fn set_status(app: &axum::Router, token: &str, id: &str, status: &str) -> (StatusCode, JsonValue) {
    send(
        app,
        Method::PUT,
        &format!("/api/applications/{}/status", id),
        Some(json!({ "status": status })),
        Some(token),
    )
    .await
}

#[tokio::test]
async fn second_apply_is_duplicate_and_leaves_record_alone() {
    let app = app();
    let token = poster_token(&app, "boss").await;
    let job = create_job(&app, &token, "Acme", &["rust"]).await;
    register_seeker(&app, "ana", &["rust"]).await;
    let apply = json!({"username": "ana", "jobId": job, "jobType": "created"});

    let (status, first) = send(&app, Method::POST, "/api/applications", Some(apply.clone()), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "Applied");

    let (status, body) = send(&app, Method::POST, "/api/applications/apply", Some(apply), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_application");
    assert_eq!(count(&app, &job).await, 1);

    let (_, check) = send(
        &app,
        Method::GET,
        &format!("/api/applications/check/ana/{}", job),
        None,
        None,
    )
    .await;
    assert_eq!(check["has_applied"], true);
    assert_eq!(check["status"], "Applied");
    assert_eq!(check["application"]["id"], first["id"]);
}

#[tokio::test]
async fn apply_validates_user_job_and_type() {
    let app = app();
    let token = poster_token(&app, "boss").await;
    let job = create_job(&app, &token, "Acme", &[]).await;
    register_seeker(&app, "ana", &[]).await;

    // job_type defaults to seeded, and this posting is an employer posting
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/applications",
        Some(json!({"username": "ana", "job_id": job})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/applications",
        Some(json!({"username": "ghost", "job_id": job, "job_type": "created"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/applications",
        Some(json!({"username": "ana", "job_id": job, "job_type": "Freelance"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn review_lifecycle_updates_count_and_timestamps() {
    let app = app();
    let token = poster_token(&app, "boss").await;
    let seeded = import_jobs(&app, &token, &[("Seed", &["sql"])]).await;
    let job = seeded[0].clone();
    register_seeker(&app, "ana", &["sql"]).await;
    register_seeker(&app, "ben", &["sql"]).await;

    let mut app_ids = Vec::new();
    for user in ["ana", "ben"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/applications",
            Some(json!({"username": user, "job_id": job, "job_type": "Job"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        app_ids.push(body["id"].as_str().unwrap().to_string());
    }
    assert_eq!(count(&app, &job).await, 2);

    let (status, viewed) = set_status(&app, &token, &app_ids[0], "Viewed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(viewed["status"], "Viewed");
    assert!(viewed["viewed_at"].is_string());
    assert_eq!(count(&app, &job).await, 1);

    let (status, accepted) = set_status(&app, &token, &app_ids[0], "Accepted").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "Accepted");
    assert_eq!(accepted["viewed_at"], viewed["viewed_at"]);
    assert_eq!(count(&app, &job).await, 1);

    let (status, body) = set_status(&app, &token, &app_ids[0], "Rejected").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");

    // skipping Viewed is allowed
    let (status, rejected) = set_status(&app, &token, &app_ids[1], "Rejected").await;
    assert_eq!(status, StatusCode::OK);
    assert!(rejected["viewed_at"].is_null());
    assert_eq!(count(&app, &job).await, 0);
}

#[tokio::test]
async fn status_update_errors() {
    let app = app();
    let token = poster_token(&app, "boss").await;
    let job = create_job(&app, &token, "Acme", &[]).await;
    register_seeker(&app, "ana", &[]).await;
    let (_, applied) = send(
        &app,
        Method::POST,
        "/api/applications",
        Some(json!({"username": "ana", "job_id": job, "job_type": "CreatedJob"})),
        None,
    )
    .await;
    let id = applied["id"].as_str().unwrap();

    let (status, body) = set_status(&app, &token, id, "Hired").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_status");

    let (status, body) = set_status(&app, &token, id, "Applied").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_status");

    let (status, body) = set_status(&app, &token, &uuid::Uuid::new_v4().to_string(), "Viewed").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/applications/{}/status", id),
        Some(json!({"status": "Viewed"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listings_join_applicant_and_job() {
    let app = app();
    let token = poster_token(&app, "boss").await;
    let first = create_job(&app, &token, "First", &[]).await;
    let second = create_job(&app, &token, "Second", &[]).await;
    register_seeker(&app, "ana", &["python"]).await;

    for job in [&first, &second] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/applications",
            Some(json!({"username": "ana", "job_id": job, "job_type": "created"})),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, mine) = send(&app, Method::GET, "/api/applications/user/ana", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["total"], 2);
    let companies: Vec<&str> = mine["applications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["job"]["company_name"].as_str().unwrap())
        .collect();
    assert!(companies.contains(&"First") && companies.contains(&"Second"));

    let (status, _) = send(&app, Method::GET, "/api/applications/user/ghost", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, applicants) = send(
        &app,
        Method::GET,
        &format!("/api/applications/job/{}", first),
        None,
        None,
    )
    .await;
    assert_eq!(applicants["total"], 1);
    assert_eq!(applicants["applications"][0]["applicant"]["username"], "ana");
    assert_eq!(applicants["applications"][0]["applicant"]["skills"], json!(["python"]));

    let (status, all) = send(&app, Method::GET, "/api/applications/employer/all", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 2);
    assert!(all["applications"][0]["applicant"].is_object());
    assert!(all["applications"][0]["job"].is_object());
}
