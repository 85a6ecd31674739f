//! Process-local store used for development without Postgres and by the
//! test-suite. A single mutex covers every check-then-write sequence, which
//! gives the same uniqueness guarantees as the database constraints.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::store::JobBoardStore;
use crate::error::{Error, Result};
use crate::models::account::{Account, NewAccount};
use crate::models::application::{
    Application, ApplicationStatus, NewApplication, NewApplicationStats, StatusChange,
};
use crate::models::posting::{NewPosting, Posting, PostingOrigin, PostingRef};
use crate::models::skill::{normalize_skill_names, Skill};

#[derive(Default)]
struct Inner {
    skills: Vec<Skill>,
    accounts: Vec<Account>,
    postings: Vec<Posting>,
    applications: Vec<Application>,
    next_seq: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("memory store mutex poisoned".to_string()))
    }
}

fn newest_first(mut applications: Vec<Application>) -> Vec<Application> {
    applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(a.id.cmp(&b.id)));
    applications
}

#[async_trait]
impl JobBoardStore for MemoryStore {
    async fn upsert_skills(&self, names: &[String]) -> Result<Vec<Skill>> {
        let mut inner = self.lock()?;
        let mut skills = Vec::new();
        for name in normalize_skill_names(names) {
            let existing = inner.skills.iter().find(|s| s.name == name).cloned();
            let skill = match existing {
                Some(skill) => skill,
                None => {
                    let skill = Skill {
                        id: inner.skills.len() as i64 + 1,
                        name,
                    };
                    inner.skills.push(skill.clone());
                    skill
                }
            };
            skills.push(skill);
        }
        Ok(skills)
    }

    async fn skills_by_ids(&self, ids: &[i64]) -> Result<Vec<Skill>> {
        let inner = self.lock()?;
        let mut skills: Vec<Skill> = inner
            .skills
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut inner = self.lock()?;
        if inner.accounts.iter().any(|a| a.username == account.username) {
            return Err(Error::Conflict("User already exists".to_string()));
        }
        let mut skill_ids = account.skill_ids;
        skill_ids.sort_unstable();
        skill_ids.dedup();

        let created = Account {
            id: Uuid::new_v4(),
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            display_name: account.display_name,
            education: account.education,
            skill_ids,
            created_at: Utc::now(),
        };
        inner.accounts.push(created.clone());
        Ok(created)
    }

    async fn account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let inner = self.lock()?;
        Ok(inner.accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let inner = self.lock()?;
        Ok(inner.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn create_posting(&self, posting: NewPosting) -> Result<Posting> {
        let mut inner = self.lock()?;
        inner.next_seq += 1;

        let mut skills = posting.skills;
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        skills.dedup_by_key(|s| s.id);

        let created = Posting {
            id: Uuid::new_v4(),
            origin: posting.origin,
            company_name: posting.company_name,
            description: posting.description,
            category: posting.category,
            employment_type: posting.employment_type,
            workplace: posting.workplace,
            location: posting.location,
            department: posting.department,
            skills,
            posted_by: posting.posted_by,
            seq: inner.next_seq,
            created_at: Utc::now(),
        };
        inner.postings.push(created.clone());
        Ok(created)
    }

    async fn posting(&self, posting: PostingRef) -> Result<Option<Posting>> {
        let inner = self.lock()?;
        Ok(inner
            .postings
            .iter()
            .find(|p| p.id == posting.id && p.origin == posting.origin)
            .cloned())
    }

    async fn postings(&self, origin: PostingOrigin) -> Result<Vec<Posting>> {
        let inner = self.lock()?;
        Ok(inner
            .postings
            .iter()
            .filter(|p| p.origin == origin)
            .cloned()
            .collect())
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Option<Application>> {
        let mut inner = self.lock()?;
        let exists = inner.applications.iter().any(|a| {
            a.account_id == application.account_id && a.posting_id == application.posting.id
        });
        if exists {
            return Ok(None);
        }

        let created = Application {
            id: Uuid::new_v4(),
            account_id: application.account_id,
            posting_id: application.posting.id,
            posting_origin: application.posting.origin,
            status: ApplicationStatus::Applied,
            applied_at: application.applied_at,
            viewed_at: None,
            status_updated_at: None,
        };
        inner.applications.push(created.clone());
        Ok(Some(created))
    }

    async fn application(&self, id: Uuid) -> Result<Option<Application>> {
        let inner = self.lock()?;
        Ok(inner.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn application_for(&self, account_id: Uuid, posting_id: Uuid) -> Result<Option<Application>> {
        let inner = self.lock()?;
        Ok(inner
            .applications
            .iter()
            .find(|a| a.account_id == account_id && a.posting_id == posting_id)
            .cloned())
    }

    async fn applications_for_posting(&self, posting_id: Uuid) -> Result<Vec<Application>> {
        let inner = self.lock()?;
        Ok(newest_first(
            inner
                .applications
                .iter()
                .filter(|a| a.posting_id == posting_id)
                .cloned()
                .collect(),
        ))
    }

    async fn applications_for_account(&self, account_id: Uuid) -> Result<Vec<Application>> {
        let inner = self.lock()?;
        Ok(newest_first(
            inner
                .applications
                .iter()
                .filter(|a| a.account_id == account_id)
                .cloned()
                .collect(),
        ))
    }

    async fn all_applications(&self) -> Result<Vec<Application>> {
        let inner = self.lock()?;
        Ok(newest_first(inner.applications.clone()))
    }

    async fn change_status(&self, id: Uuid, change: StatusChange) -> Result<Option<Application>> {
        let mut inner = self.lock()?;
        let Some(application) = inner
            .applications
            .iter_mut()
            .find(|a| a.id == id && a.status == change.from)
        else {
            return Ok(None);
        };

        application.status = change.to;
        application.status_updated_at = Some(change.at);
        if change.to == ApplicationStatus::Viewed && application.viewed_at.is_none() {
            application.viewed_at = Some(change.at);
        }
        Ok(Some(application.clone()))
    }

    async fn count_new_applications(&self, posting_id: Uuid) -> Result<i64> {
        let inner = self.lock()?;
        Ok(inner
            .applications
            .iter()
            .filter(|a| a.posting_id == posting_id && a.status == ApplicationStatus::Applied)
            .count() as i64)
    }

    async fn new_application_stats(&self) -> Result<HashMap<Uuid, NewApplicationStats>> {
        let inner = self.lock()?;
        let mut stats: HashMap<Uuid, NewApplicationStats> = HashMap::new();
        for application in inner
            .applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Applied)
        {
            let entry = stats.entry(application.posting_id).or_insert(NewApplicationStats {
                count: 0,
                latest_applied_at: None,
            });
            entry.count += 1;
            entry.latest_applied_at = entry.latest_applied_at.max(Some(application.applied_at));
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::AccountRole;

    fn new_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role: AccountRole::Seeker,
            display_name: None,
            education: None,
            skill_ids: vec![],
        }
    }

    fn new_posting() -> NewPosting {
        NewPosting {
            origin: PostingOrigin::Created,
            company_name: "Acme".to_string(),
            description: "Build things".to_string(),
            category: None,
            employment_type: None,
            workplace: None,
            location: None,
            department: None,
            skills: vec![],
            posted_by: None,
        }
    }

    #[test]
    fn skill_upsert_is_idempotent() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let first = store
                .upsert_skills(&[" Python ".to_string(), "SQL".to_string()])
                .await
                .unwrap();
            let second = store
                .upsert_skills(&["python".to_string(), "python".to_string()])
                .await
                .unwrap();
            assert_eq!(first.len(), 2);
            assert_eq!(second.len(), 1);
            assert_eq!(first[0].id, second[0].id);
            assert_eq!(second[0].name, "python");
        });
    }

    #[test]
    fn duplicate_username_conflicts() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            store.create_account(new_account("ana")).await.unwrap();
            let err = store.create_account(new_account("ana")).await.unwrap_err();
            assert!(matches!(err, Error::Conflict(_)));
        });
    }

    #[test]
    fn second_insert_for_same_pair_is_rejected() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let account = store.create_account(new_account("ana")).await.unwrap();
            let posting = store.create_posting(new_posting()).await.unwrap();
            let request = NewApplication {
                account_id: account.id,
                posting: posting.posting_ref(),
                applied_at: Utc::now(),
            };

            let first = store.insert_application(request.clone()).await.unwrap();
            let second = store.insert_application(request).await.unwrap();
            assert!(first.is_some());
            assert!(second.is_none());
            assert_eq!(store.count_new_applications(posting.id).await.unwrap(), 1);
        });
    }

    #[test]
    fn status_change_is_compare_and_set() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let account = store.create_account(new_account("ana")).await.unwrap();
            let posting = store.create_posting(new_posting()).await.unwrap();
            let app = store
                .insert_application(NewApplication {
                    account_id: account.id,
                    posting: posting.posting_ref(),
                    applied_at: Utc::now(),
                })
                .await
                .unwrap()
                .unwrap();

            let stale = StatusChange {
                from: ApplicationStatus::Viewed,
                to: ApplicationStatus::Accepted,
                at: Utc::now(),
            };
            assert!(store.change_status(app.id, stale).await.unwrap().is_none());

            let viewed = StatusChange {
                from: ApplicationStatus::Applied,
                to: ApplicationStatus::Viewed,
                at: Utc::now(),
            };
            let updated = store.change_status(app.id, viewed).await.unwrap().unwrap();
            assert_eq!(updated.status, ApplicationStatus::Viewed);
            assert_eq!(updated.viewed_at, Some(viewed.at));
            assert_eq!(store.count_new_applications(posting.id).await.unwrap(), 0);
        });
    }
}
