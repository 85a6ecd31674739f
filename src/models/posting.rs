use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::skill::Skill;

/// Which of the two posting collections a posting lives in. Never changes
/// after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingOrigin {
    /// Authored by an employer through the API.
    Created,
    /// Bulk-seeded catalog entries.
    Seeded,
}

impl PostingOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingOrigin::Created => "created",
            PostingOrigin::Seeded => "seeded",
        }
    }
}

impl fmt::Display for PostingOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostingOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "created" | "CreatedJob" => Ok(PostingOrigin::Created),
            "seeded" | "Job" => Ok(PostingOrigin::Seeded),
            other => Err(format!("unknown job type '{}'", other)),
        }
    }
}

/// A reference into one of the two posting collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingRef {
    pub origin: PostingOrigin,
    pub id: Uuid,
}

impl PostingRef {
    pub fn new(origin: PostingOrigin, id: Uuid) -> Self {
        Self { origin, id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub id: Uuid,
    pub origin: PostingOrigin,
    pub company_name: String,
    pub description: String,
    pub category: Option<String>,
    pub employment_type: Option<String>,
    pub workplace: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub skills: Vec<Skill>,
    pub posted_by: Option<Uuid>,
    /// Insertion order across the whole store.
    pub seq: i64,
    pub created_at: DateTime<Utc>,
}

impl Posting {
    pub fn posting_ref(&self) -> PostingRef {
        PostingRef::new(self.origin, self.id)
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.skills.iter().map(|s| s.id)
    }
}

#[derive(Debug, Clone)]
pub struct NewPosting {
    pub origin: PostingOrigin,
    pub company_name: String,
    pub description: String,
    pub category: Option<String>,
    pub employment_type: Option<String>,
    pub workplace: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub skills: Vec<Skill>,
    pub posted_by: Option<Uuid>,
}
