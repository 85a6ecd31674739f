pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::Config,
    middleware::{
        auth::require_poster,
        cors::permissive_cors,
        rate_limit::{rps_middleware, RateLimiter},
    },
    AppState,
};

pub fn build_router(state: AppState, config: &Config) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/profile/:username", get(auth::profile))
        .route(
            "/api/jobs",
            get(jobs::list_jobs).merge(post(jobs::create_job).route_layer(from_fn(require_poster))),
        )
        .route("/api/jobs/:origin/:id", get(jobs::get_job))
        .route(
            "/api/jobs/recommendations/:username",
            get(jobs::recommendations),
        )
        .route("/api/applications", post(applications::apply))
        .route("/api/applications/apply", post(applications::apply))
        .route(
            "/api/applications/check/:username/:job_id",
            get(applications::check_application),
        )
        .route(
            "/api/applications/user/:username",
            get(applications::list_for_user),
        )
        .route(
            "/api/applications/job/:job_id",
            get(applications::list_for_job),
        )
        .route(
            "/api/applications/count/:job_id",
            get(applications::count_new),
        );

    let poster_api = Router::new()
        .route("/api/jobs/import", post(jobs::import_jobs))
        .route(
            "/api/applications/:id/status",
            put(applications::update_status),
        )
        .route(
            "/api/applications/employer/all",
            get(applications::list_all),
        )
        .route_layer(from_fn(require_poster));

    let api = public_api
        .merge(poster_api)
        .layer(from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    base_routes
        .merge(api)
        .with_state(state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
}
