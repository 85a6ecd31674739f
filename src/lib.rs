pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use crate::database::JobBoardStore;
use crate::error::{Error, Result};
use crate::services::{
    account_service::AccountService,
    application_service::ApplicationService,
    credential_service::CredentialService,
    feed_service::FeedService,
    ml_service::{HttpMlRecommender, MlRecommender},
    posting_service::PostingService,
    recommendation_service::RecommendationService,
};
use reqwest::Client;

#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub posting_service: PostingService,
    pub application_service: ApplicationService,
    pub feed_service: FeedService,
    pub recommendation_service: RecommendationService,
}

impl AppState {
    pub fn new(store: Arc<dyn JobBoardStore>) -> Result<Self> {
        let config = crate::config::get_config();

        let ml: Option<Arc<dyn MlRecommender>> = match &config.ml_service_url {
            Some(base_url) => {
                let http_client = Client::builder()
                    .timeout(Duration::from_secs(config.ml_timeout_secs))
                    .build()
                    .map_err(|e| Error::Config(format!("http client: {}", e)))?;
                Some(Arc::new(HttpMlRecommender::new(base_url.clone(), http_client)))
            }
            None => None,
        };

        Ok(Self::with_recommender(store, ml))
    }

    /// Builds the state around an explicit recommender instead of the one
    /// configured through `ML_SERVICE_URL`.
    pub fn with_recommender(
        store: Arc<dyn JobBoardStore>,
        ml: Option<Arc<dyn MlRecommender>>,
    ) -> Self {
        let config = crate::config::get_config();
        let credentials = CredentialService::new(config.jwt_secret.clone(), config.token_ttl_hours);

        Self {
            account_service: AccountService::new(store.clone(), credentials),
            posting_service: PostingService::new(store.clone()),
            application_service: ApplicationService::new(store.clone()),
            feed_service: FeedService::new(store.clone()),
            recommendation_service: RecommendationService::new(store, ml),
        }
    }
}
