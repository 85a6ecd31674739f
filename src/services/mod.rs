pub mod account_service;
pub mod application_service;
pub mod credential_service;
pub mod feed_service;
pub mod ml_service;
pub mod posting_service;
pub mod recommendation_service;
