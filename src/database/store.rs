//! Storage abstraction shared by the Postgres and in-memory backends.
//!
//! Services hold an `Arc<dyn JobBoardStore>` and never talk to a concrete
//! backend. Both uniqueness rules (skill names, one application per account and
//! posting) are the backend's job and must hold under concurrent callers.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::account::{Account, NewAccount};
use crate::models::application::{Application, NewApplication, NewApplicationStats, StatusChange};
use crate::models::posting::{NewPosting, Posting, PostingOrigin, PostingRef};
use crate::models::skill::Skill;

#[async_trait]
pub trait JobBoardStore: Send + Sync {
    /// Find-or-create every name, returning skills in input order. Names are
    /// normalized first; repeated names map to the same skill.
    async fn upsert_skills(&self, names: &[String]) -> Result<Vec<Skill>>;

    async fn skills_by_ids(&self, ids: &[i64]) -> Result<Vec<Skill>>;

    /// Fails with `Error::Conflict` when the username is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account>;

    async fn account_by_username(&self, username: &str) -> Result<Option<Account>>;

    async fn account_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    async fn create_posting(&self, posting: NewPosting) -> Result<Posting>;

    /// Resolves a reference; a matching id under the other origin is `None`.
    async fn posting(&self, posting: PostingRef) -> Result<Option<Posting>>;

    /// All postings of one origin in insertion order.
    async fn postings(&self, origin: PostingOrigin) -> Result<Vec<Posting>>;

    /// Atomic conditional insert. `None` means the (account, posting) pair
    /// already has an application and nothing was written.
    async fn insert_application(&self, application: NewApplication) -> Result<Option<Application>>;

    async fn application(&self, id: Uuid) -> Result<Option<Application>>;

    async fn application_for(&self, account_id: Uuid, posting_id: Uuid) -> Result<Option<Application>>;

    /// Newest first.
    async fn applications_for_posting(&self, posting_id: Uuid) -> Result<Vec<Application>>;

    /// Newest first.
    async fn applications_for_account(&self, account_id: Uuid) -> Result<Vec<Application>>;

    /// Newest first.
    async fn all_applications(&self) -> Result<Vec<Application>>;

    /// Compare-and-set on the current status. Returns `None` when the
    /// application does not exist or is no longer in `change.from`.
    async fn change_status(&self, id: Uuid, change: StatusChange) -> Result<Option<Application>>;

    /// Live count of applications still in `Applied` for the posting.
    async fn count_new_applications(&self, posting_id: Uuid) -> Result<i64>;

    /// `Applied`-only aggregates keyed by posting id. Postings without new
    /// applications are absent.
    async fn new_application_stats(&self) -> Result<HashMap<Uuid, NewApplicationStats>>;
}
