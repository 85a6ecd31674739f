use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Browser clients are served from arbitrary origins and authenticate with a
/// bearer header, never cookies.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}
