use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::posting::{PostingOrigin, PostingRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    Viewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Viewed => "Viewed",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Transition table. Accepted and Rejected are terminal.
    pub fn allowed_next(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Applied => &[Viewed, Accepted, Rejected],
            Viewed => &[Accepted, Rejected],
            Accepted | Rejected => &[],
        }
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Statuses a reviewer may request. `Applied` is only ever set on creation.
    pub fn is_reviewable(&self) -> bool {
        !matches!(self, ApplicationStatus::Applied)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Applied" => Ok(ApplicationStatus::Applied),
            "Viewed" => Ok(ApplicationStatus::Viewed),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub account_id: Uuid,
    pub posting_id: Uuid,
    pub posting_origin: PostingOrigin,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub status_updated_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn posting_ref(&self) -> PostingRef {
        PostingRef::new(self.posting_origin, self.posting_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub account_id: Uuid,
    pub posting: PostingRef,
    pub applied_at: DateTime<Utc>,
}

/// A status change the store applies only if the record is still in `from`.
#[derive(Debug, Clone, Copy)]
pub struct StatusChange {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub at: DateTime<Utc>,
}

/// Per-posting aggregate over applications still in `Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewApplicationStats {
    pub count: i64,
    pub latest_applied_at: Option<DateTime<Utc>>,
}
