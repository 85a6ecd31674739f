//! Skill-overlap ranking of postings for a job seeker.
//!
//! Each origin is ranked on its own by `match_count` (size of the
//! intersection between the posting's required skills and the seeker's
//! skills) and capped at [`PER_ORIGIN_LIMIT`]. Employer-created postings are
//! always emitted before seeded ones; the merged list is capped at
//! [`RECOMMENDATION_LIMIT`].
//!
//! When an ML recommender is configured it replaces the ranking of the seeded
//! section only. If it fails, the overlap ranking is used instead.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::JobBoardStore;
use crate::error::{Error, Result};
use crate::models::posting::{Posting, PostingOrigin};
use crate::services::ml_service::{MlHit, MlRecommender};

pub const PER_ORIGIN_LIMIT: usize = 25;
pub const RECOMMENDATION_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub posting: Posting,
    pub match_count: usize,
    /// Overlap ratio in `[0, 1]`, or the ML similarity when ranked by ML.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Overlap,
    Ml,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationList {
    pub source: RecommendationSource,
    pub items: Vec<Recommendation>,
}

fn distinct_skills(posting: &Posting) -> HashSet<i64> {
    posting.skill_ids().collect()
}

pub fn match_count(posting: &Posting, seeker_skills: &HashSet<i64>) -> usize {
    distinct_skills(posting).intersection(seeker_skills).count()
}

fn overlap_score(posting: &Posting, matched: usize) -> f64 {
    let total = distinct_skills(posting).len();
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

fn tie_break(origin: PostingOrigin, a: &Posting, b: &Posting) -> Ordering {
    match origin {
        PostingOrigin::Created => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| b.seq.cmp(&a.seq)),
        PostingOrigin::Seeded => a.seq.cmp(&b.seq),
    }
}

/// Ranks the postings of one origin, ignoring postings of the other origin.
pub fn rank_origin(
    origin: PostingOrigin,
    postings: &[Posting],
    seeker_skills: &HashSet<i64>,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = postings
        .iter()
        .filter(|p| p.origin == origin)
        .filter_map(|p| {
            let matched = match_count(p, seeker_skills);
            (matched > 0).then(|| Recommendation {
                posting: p.clone(),
                match_count: matched,
                score: overlap_score(p, matched),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.match_count
            .cmp(&a.match_count)
            .then_with(|| tie_break(origin, &a.posting, &b.posting))
    });
    ranked.truncate(PER_ORIGIN_LIMIT);
    ranked
}

fn merge(created: Vec<Recommendation>, seeded: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut merged = created;
    merged.extend(seeded);
    merged.truncate(RECOMMENDATION_LIMIT);
    merged
}

/// Pure overlap ranking over both origins.
pub fn rank_postings(
    created: &[Posting],
    seeded: &[Posting],
    seeker_skills: &[i64],
) -> Vec<Recommendation> {
    if seeker_skills.is_empty() {
        return Vec::new();
    }
    let skills: HashSet<i64> = seeker_skills.iter().copied().collect();
    merge(
        rank_origin(PostingOrigin::Created, created, &skills),
        rank_origin(PostingOrigin::Seeded, seeded, &skills),
    )
}

/// Resolves ML hits against the seeded catalog, keeping the ML order and
/// dropping ids that are unknown, malformed or repeated.
pub fn resolve_ml_hits(
    hits: &[MlHit],
    seeded: &[Posting],
    seeker_skills: &HashSet<i64>,
) -> Vec<Recommendation> {
    let by_id: HashMap<Uuid, &Posting> = seeded
        .iter()
        .filter(|p| p.origin == PostingOrigin::Seeded)
        .map(|p| (p.id, p))
        .collect();
    let mut seen = HashSet::new();

    hits.iter()
        .filter_map(|hit| {
            Uuid::parse_str(&hit.job_id)
                .ok()
                .map(|id| (id, hit.similarity))
        })
        .filter(|(id, _)| seen.insert(*id))
        .filter_map(|(id, similarity)| {
            by_id.get(&id).map(|posting| Recommendation {
                posting: (*posting).clone(),
                match_count: match_count(posting, seeker_skills),
                score: similarity,
            })
        })
        .take(PER_ORIGIN_LIMIT)
        .collect()
}

#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn JobBoardStore>,
    ml: Option<Arc<dyn MlRecommender>>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn JobBoardStore>, ml: Option<Arc<dyn MlRecommender>>) -> Self {
        Self { store, ml }
    }

    pub async fn recommend_for(&self, username: &str) -> Result<RecommendationList> {
        let account = self
            .store
            .account_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound("User not found.".to_string()))?;

        if account.skill_ids.is_empty() {
            return Ok(RecommendationList {
                source: RecommendationSource::Overlap,
                items: Vec::new(),
            });
        }

        let created = self.store.postings(PostingOrigin::Created).await?;
        let seeded = self.store.postings(PostingOrigin::Seeded).await?;
        let skills: HashSet<i64> = account.skill_ids.iter().copied().collect();

        if let Some(ml) = &self.ml {
            match self.ml_ranked_seeded(ml.as_ref(), &account.skill_ids, &seeded, &skills).await {
                Ok(ml_seeded) => {
                    let created_ranked = rank_origin(PostingOrigin::Created, &created, &skills);
                    info!(
                        username,
                        created = created_ranked.len(),
                        seeded = ml_seeded.len(),
                        "recommendations ranked by ml service"
                    );
                    return Ok(RecommendationList {
                        source: RecommendationSource::Ml,
                        items: merge(created_ranked, ml_seeded),
                    });
                }
                Err(err) => {
                    warn!(error = %err, username, "ml recommender unavailable, using overlap ranking");
                }
            }
        }

        let items = rank_postings(&created, &seeded, &account.skill_ids);
        info!(username, count = items.len(), "recommendations ranked by skill overlap");
        Ok(RecommendationList {
            source: RecommendationSource::Overlap,
            items,
        })
    }

    async fn ml_ranked_seeded(
        &self,
        ml: &dyn MlRecommender,
        skill_ids: &[i64],
        seeded: &[Posting],
        skills: &HashSet<i64>,
    ) -> Result<Vec<Recommendation>> {
        let names: Vec<String> = self
            .store
            .skills_by_ids(skill_ids)
            .await?
            .into_iter()
            .map(|s| s.name)
            .collect();
        let hits = ml.recommend(&names).await?;
        Ok(resolve_ml_hits(&hits, seeded, skills))
    }
}
