use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::store::JobBoardStore;
use crate::error::{Error, Result};
use crate::models::account::{Account, NewAccount};
use crate::models::application::{Application, NewApplication, NewApplicationStats, StatusChange};
use crate::models::posting::{NewPosting, Posting, PostingOrigin, PostingRef};
use crate::models::skill::{normalize_skill_names, Skill};

const ACCOUNT_SELECT: &str = r#"
    SELECT a.id, a.username, a.password_hash, a.role, a.display_name, a.education, a.created_at,
           COALESCE(ARRAY_AGG(s.skill_id ORDER BY s.skill_id) FILTER (WHERE s.skill_id IS NOT NULL), '{}'::bigint[]) AS skill_ids
    FROM accounts a
    LEFT JOIN account_skills s ON s.account_id = a.id
"#;

const POSTING_SELECT: &str = r#"
    SELECT p.id, p.origin, p.company_name, p.description, p.category, p.employment_type,
           p.workplace, p.location, p.department, p.posted_by, p.seq, p.created_at,
           COALESCE(
               JSON_AGG(JSON_BUILD_OBJECT('id', s.id, 'name', s.name) ORDER BY s.name)
                   FILTER (WHERE s.id IS NOT NULL),
               '[]'::json
           ) AS skills
    FROM postings p
    LEFT JOIN posting_skills ps ON ps.posting_id = p.id
    LEFT JOIN skills s ON s.id = ps.skill_id
"#;

const APPLICATION_COLUMNS: &str =
    "id, account_id, posting_id, posting_origin, status, applied_at, viewed_at, status_updated_at";

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    display_name: Option<String>,
    education: Option<String>,
    created_at: DateTime<Utc>,
    skill_ids: Vec<i64>,
}

impl TryFrom<AccountRow> for Account {
    type Error = Error;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role.parse().map_err(Error::Internal)?,
            display_name: row.display_name,
            education: row.education,
            skill_ids: row.skill_ids,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct PostingRow {
    id: Uuid,
    origin: String,
    company_name: String,
    description: String,
    category: Option<String>,
    employment_type: Option<String>,
    workplace: Option<String>,
    location: Option<String>,
    department: Option<String>,
    posted_by: Option<Uuid>,
    seq: i64,
    created_at: DateTime<Utc>,
    skills: Json<Vec<Skill>>,
}

impl TryFrom<PostingRow> for Posting {
    type Error = Error;

    fn try_from(row: PostingRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            origin: row.origin.parse().map_err(Error::Internal)?,
            company_name: row.company_name,
            description: row.description,
            category: row.category,
            employment_type: row.employment_type,
            workplace: row.workplace,
            location: row.location,
            department: row.department,
            skills: row.skills.0,
            posted_by: row.posted_by,
            seq: row.seq,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct ApplicationRow {
    id: Uuid,
    account_id: Uuid,
    posting_id: Uuid,
    posting_origin: String,
    status: String,
    applied_at: DateTime<Utc>,
    viewed_at: Option<DateTime<Utc>>,
    status_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            account_id: row.account_id,
            posting_id: row.posting_id,
            posting_origin: row.posting_origin.parse().map_err(Error::Internal)?,
            status: row
                .status
                .parse()
                .map_err(|s| Error::Internal(format!("unknown stored status '{}'", s)))?,
            applied_at: row.applied_at,
            viewed_at: row.viewed_at,
            status_updated_at: row.status_updated_at,
        })
    }
}

#[derive(FromRow)]
struct StatsRow {
    posting_id: Uuid,
    count: i64,
    latest: Option<DateTime<Utc>>,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn applications_where(&self, clause: &str, id: Option<Uuid>) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications {} ORDER BY applied_at DESC, id",
            APPLICATION_COLUMNS, clause
        );
        let mut statement = sqlx::query_as::<_, ApplicationRow>(&query);
        if let Some(id) = id {
            statement = statement.bind(id);
        }
        let rows = statement.fetch_all(&self.pool).await?;
        collect(rows)
    }
}

#[async_trait]
impl JobBoardStore for PgStore {
    async fn upsert_skills(&self, names: &[String]) -> Result<Vec<Skill>> {
        let names = normalize_skill_names(names);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (name)
            SELECT UNNEST($1::text[])
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name -- dummy update to return row
            RETURNING id, name
            "#,
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await?;

        let by_name: HashMap<String, Skill> =
            rows.into_iter().map(|s| (s.name.clone(), s)).collect();
        names
            .iter()
            .map(|name| {
                by_name
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::Internal(format!("skill '{}' was not upserted", name)))
            })
            .collect()
    }

    async fn skills_by_ids(&self, ids: &[i64]) -> Result<Vec<Skill>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT id, name FROM skills WHERE id = ANY($1) ORDER BY name",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO accounts (username, password_hash, role, display_name, education)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(&account.display_name)
        .bind(&account.education)
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(err) if is_unique_violation(&err) => {
                return Err(Error::Conflict("User already exists".to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        if !account.skill_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO account_skills (account_id, skill_id)
                SELECT $1, UNNEST($2::bigint[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&account.skill_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.account_by_id(id)
            .await?
            .ok_or_else(|| Error::Internal("account vanished after insert".to_string()))
    }

    async fn account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let query = format!("{} WHERE a.username = $1 GROUP BY a.id", ACCOUNT_SELECT);
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn account_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let query = format!("{} WHERE a.id = $1 GROUP BY a.id", ACCOUNT_SELECT);
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn create_posting(&self, posting: NewPosting) -> Result<Posting> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO postings (
                origin, company_name, description, category, employment_type,
                workplace, location, department, posted_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(posting.origin.as_str())
        .bind(&posting.company_name)
        .bind(&posting.description)
        .bind(&posting.category)
        .bind(&posting.employment_type)
        .bind(&posting.workplace)
        .bind(&posting.location)
        .bind(&posting.department)
        .bind(posting.posted_by)
        .fetch_one(&mut *tx)
        .await?;

        let skill_ids: Vec<i64> = posting.skills.iter().map(|s| s.id).collect();
        if !skill_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO posting_skills (posting_id, skill_id)
                SELECT $1, UNNEST($2::bigint[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&skill_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.posting(PostingRef::new(posting.origin, id))
            .await?
            .ok_or_else(|| Error::Internal("posting vanished after insert".to_string()))
    }

    async fn posting(&self, posting: PostingRef) -> Result<Option<Posting>> {
        let query = format!(
            "{} WHERE p.id = $1 AND p.origin = $2 GROUP BY p.id",
            POSTING_SELECT
        );
        let row = sqlx::query_as::<_, PostingRow>(&query)
            .bind(posting.id)
            .bind(posting.origin.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Posting::try_from).transpose()
    }

    async fn postings(&self, origin: PostingOrigin) -> Result<Vec<Posting>> {
        let query = format!(
            "{} WHERE p.origin = $1 GROUP BY p.id ORDER BY p.seq",
            POSTING_SELECT
        );
        let rows = sqlx::query_as::<_, PostingRow>(&query)
            .bind(origin.as_str())
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Option<Application>> {
        let query = format!(
            r#"
            INSERT INTO applications (account_id, posting_id, posting_origin, status, applied_at)
            VALUES ($1, $2, $3, 'Applied', $4)
            ON CONFLICT (account_id, posting_id) DO NOTHING
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(application.account_id)
            .bind(application.posting.id)
            .bind(application.posting.origin.as_str())
            .bind(application.applied_at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::try_from).transpose()
    }

    async fn application(&self, id: Uuid) -> Result<Option<Application>> {
        let query = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        let row = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::try_from).transpose()
    }

    async fn application_for(&self, account_id: Uuid, posting_id: Uuid) -> Result<Option<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE account_id = $1 AND posting_id = $2",
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(account_id)
            .bind(posting_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::try_from).transpose()
    }

    async fn applications_for_posting(&self, posting_id: Uuid) -> Result<Vec<Application>> {
        self.applications_where("WHERE posting_id = $1", Some(posting_id))
            .await
    }

    async fn applications_for_account(&self, account_id: Uuid) -> Result<Vec<Application>> {
        self.applications_where("WHERE account_id = $1", Some(account_id))
            .await
    }

    async fn all_applications(&self) -> Result<Vec<Application>> {
        self.applications_where("", None).await
    }

    async fn change_status(&self, id: Uuid, change: StatusChange) -> Result<Option<Application>> {
        let query = format!(
            r#"
            UPDATE applications
            SET status = $3,
                status_updated_at = $4,
                viewed_at = CASE WHEN $3 = 'Viewed' AND viewed_at IS NULL THEN $4 ELSE viewed_at END
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(id)
            .bind(change.from.as_str())
            .bind(change.to.as_str())
            .bind(change.at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::try_from).transpose()
    }

    async fn count_new_applications(&self, posting_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM applications WHERE posting_id = $1 AND status = 'Applied'",
        )
        .bind(posting_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn new_application_stats(&self) -> Result<HashMap<Uuid, NewApplicationStats>> {
        let rows = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT posting_id, COUNT(*) AS count, MAX(applied_at) AS latest
            FROM applications
            WHERE status = 'Applied'
            GROUP BY posting_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    r.posting_id,
                    NewApplicationStats {
                        count: r.count,
                        latest_applied_at: r.latest,
                    },
                )
            })
            .collect())
    }
}
