use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::database::JobBoardStore;
use crate::dto::posting_dto::{CreateJobPayload, SeedJobPayload};
use crate::error::{Error, Result};
use crate::models::posting::{NewPosting, Posting, PostingOrigin, PostingRef};

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct PostingService {
    store: Arc<dyn JobBoardStore>,
}

impl PostingService {
    pub fn new(store: Arc<dyn JobBoardStore>) -> Self {
        Self { store }
    }

    /// Employer-authored posting. Origin is always `created`.
    pub async fn create(&self, payload: CreateJobPayload, posted_by: Uuid) -> Result<Posting> {
        let skills = self.store.upsert_skills(&payload.skills).await?;
        let posting = self
            .store
            .create_posting(NewPosting {
                origin: PostingOrigin::Created,
                company_name: payload.company_name.trim().to_string(),
                description: payload.description.trim().to_string(),
                category: Some(payload.category.trim().to_string()),
                employment_type: Some(payload.employment_type.trim().to_string()),
                workplace: Some(payload.workplace.trim().to_string()),
                location: Some(payload.location.trim().to_string()),
                department: Some(payload.department.trim().to_string()),
                skills,
                posted_by: Some(posted_by),
            })
            .await?;

        info!(posting_id = %posting.id, company = %posting.company_name, %posted_by, "job posting created");
        Ok(posting)
    }

    /// Bulk-loads seeded catalog entries in the given order.
    pub async fn import_seeded(&self, jobs: Vec<SeedJobPayload>) -> Result<Vec<Posting>> {
        let mut imported = Vec::with_capacity(jobs.len());
        for job in jobs {
            let skills = self.store.upsert_skills(&job.skills).await?;
            let posting = self
                .store
                .create_posting(NewPosting {
                    origin: PostingOrigin::Seeded,
                    company_name: job.company_name.trim().to_string(),
                    description: job.description.trim().to_string(),
                    category: non_blank(job.category),
                    employment_type: non_blank(job.employment_type),
                    workplace: non_blank(job.workplace),
                    location: non_blank(job.location),
                    department: non_blank(job.department),
                    skills,
                    posted_by: None,
                })
                .await?;
            imported.push(posting);
        }
        info!(count = imported.len(), "seeded postings imported");
        Ok(imported)
    }

    pub async fn get(&self, posting: PostingRef) -> Result<Posting> {
        self.store
            .posting(posting)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn create_payload() -> CreateJobPayload {
        CreateJobPayload {
            company_name: "Acme".into(),
            description: "Backend engineer".into(),
            category: "Engineering".into(),
            employment_type: "Full-time".into(),
            workplace: "Remote".into(),
            location: "Berlin".into(),
            department: "Platform".into(),
            skills: vec!["Rust".into(), "SQL".into()],
        }
    }

    #[tokio::test]
    async fn created_postings_resolve_by_origin_only() {
        let service = PostingService::new(Arc::new(MemoryStore::new()));
        let poster = Uuid::new_v4();
        let posting = service.create(create_payload(), poster).await.unwrap();
        assert_eq!(posting.origin, PostingOrigin::Created);
        assert_eq!(posting.posted_by, Some(poster));
        assert_eq!(posting.skills.len(), 2);

        assert!(service.get(posting.posting_ref()).await.is_ok());
        let wrong = PostingRef::new(PostingOrigin::Seeded, posting.id);
        assert!(matches!(service.get(wrong).await.unwrap_err(), Error::NotFound(_)));
    }

    #[tokio::test]
    async fn import_keeps_order_and_shares_skills() {
        let store = Arc::new(MemoryStore::new());
        let service = PostingService::new(store.clone());
        let jobs = vec![
            SeedJobPayload {
                company_name: "First".into(),
                description: "a".into(),
                category: None,
                employment_type: None,
                workplace: Some("  ".into()),
                location: None,
                department: None,
                skills: vec!["python".into()],
            },
            SeedJobPayload {
                company_name: "Second".into(),
                description: "b".into(),
                category: None,
                employment_type: None,
                workplace: None,
                location: None,
                department: None,
                skills: vec!["Python".into()],
            },
        ];
        let imported = service.import_seeded(jobs).await.unwrap();
        assert!(imported[0].seq < imported[1].seq);
        assert_eq!(imported[0].workplace, None);
        assert_eq!(imported[0].skills[0].id, imported[1].skills[0].id);
    }
}
