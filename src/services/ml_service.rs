//! Client for the external ML recommender. It only knows the seeded catalog
//! and answers with posting ids ranked by similarity.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlHit {
    pub job_id: String,
    #[serde(default)]
    pub similarity: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MlRecommender: Send + Sync {
    /// Ranked hits for the given skill names. Any failure is reported as
    /// `Error::UpstreamUnavailable`.
    async fn recommend(&self, skills: &[String]) -> Result<Vec<MlHit>>;
}

#[derive(Clone)]
pub struct HttpMlRecommender {
    client: Client,
    base_url: String,
}

impl HttpMlRecommender {
    pub fn new(base_url: String, client: Client) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl MlRecommender for HttpMlRecommender {
    async fn recommend(&self, skills: &[String]) -> Result<Vec<MlHit>> {
        #[derive(Serialize)]
        struct RecommendReq<'a> {
            skills: &'a [String],
        }
        #[derive(Deserialize)]
        struct RecommendResp {
            recommendations: Vec<MlHit>,
        }

        if skills.is_empty() {
            return Ok(Vec::new());
        }

        let resp = self
            .client
            .post(format!("{}/api/recommend", self.base_url))
            .header("Accept", "application/json")
            .json(&RecommendReq { skills })
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("recommend request failed: {}", e)))?;

        let status = resp.status();
        let txt = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!(
                "recommend status {}: {}",
                status.as_u16(),
                txt
            )));
        }
        let parsed: RecommendResp = serde_json::from_str(&txt)
            .map_err(|e| Error::UpstreamUnavailable(format!("recommend parse failed: {}", e)))?;
        Ok(parsed.recommendations)
    }
}
