//! Browse feed. Postings with unviewed applications come first, then the
//! employer-created postings, then the seeded catalog.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::JobBoardStore;
use crate::error::Result;
use crate::models::application::NewApplicationStats;
use crate::models::posting::{Posting, PostingOrigin};

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub posting: Posting,
    pub new_application_count: i64,
    pub latest_new_application_at: Option<DateTime<Utc>>,
    pub has_new_applications: bool,
    /// 1: has new applications, 2: employer-created, 3: seeded.
    pub bucket: u8,
}

fn bucket_of(posting: &Posting, new_count: i64) -> u8 {
    if new_count > 0 {
        1
    } else if posting.origin == PostingOrigin::Created {
        2
    } else {
        3
    }
}

/// Orders every posting for browsing. `seeded` is expected in insertion order;
/// bucket 3 keeps that order.
pub fn compose_feed(
    created: &[Posting],
    seeded: &[Posting],
    stats: &HashMap<Uuid, NewApplicationStats>,
) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = created
        .iter()
        .chain(seeded.iter())
        .map(|posting| {
            let (count, latest) = stats
                .get(&posting.id)
                .map(|s| (s.count, s.latest_applied_at))
                .unwrap_or((0, None));
            FeedItem {
                posting: posting.clone(),
                new_application_count: count,
                latest_new_application_at: latest,
                has_new_applications: count > 0,
                bucket: bucket_of(posting, count),
            }
        })
        .collect();

    // sort_by is stable, so bucket 3 keeps the seeded order
    items.sort_by(|a, b| {
        a.bucket.cmp(&b.bucket).then_with(|| match a.bucket {
            1 => b.latest_new_application_at.cmp(&a.latest_new_application_at),
            2 => b
                .posting
                .created_at
                .cmp(&a.posting.created_at)
                .then_with(|| b.posting.seq.cmp(&a.posting.seq)),
            _ => std::cmp::Ordering::Equal,
        })
    });
    items
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn JobBoardStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn JobBoardStore>) -> Self {
        Self { store }
    }

    pub async fn feed(&self) -> Result<Vec<FeedItem>> {
        let created = self.store.postings(PostingOrigin::Created).await?;
        let seeded = self.store.postings(PostingOrigin::Seeded).await?;
        let stats = self.store.new_application_stats().await?;
        Ok(compose_feed(&created, &seeded, &stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn posting(origin: PostingOrigin, seq: i64) -> Posting {
        Posting {
            id: Uuid::new_v4(),
            origin,
            company_name: format!("Co {}", seq),
            description: "desc".to_string(),
            category: None,
            employment_type: None,
            workplace: None,
            location: None,
            department: None,
            skills: vec![],
            posted_by: None,
            seq,
            created_at: base() + Duration::hours(seq),
        }
    }

    fn stats(count: i64, minutes: i64) -> NewApplicationStats {
        NewApplicationStats {
            count,
            latest_applied_at: Some(base() + Duration::minutes(minutes)),
        }
    }

    #[test]
    fn buckets_new_applications_then_created_then_seeded() {
        let c1 = posting(PostingOrigin::Created, 1);
        let c2 = posting(PostingOrigin::Created, 2);
        let s1 = posting(PostingOrigin::Seeded, 3);
        let s2 = posting(PostingOrigin::Seeded, 4);
        let s3 = posting(PostingOrigin::Seeded, 5);

        let mut by_posting = HashMap::new();
        by_posting.insert(s2.id, stats(1, 10));
        by_posting.insert(c1.id, stats(2, 30));

        let feed = compose_feed(
            &[c1.clone(), c2.clone()],
            &[s1.clone(), s2.clone(), s3.clone()],
            &by_posting,
        );
        let ids: Vec<Uuid> = feed.iter().map(|i| i.posting.id).collect();
        assert_eq!(ids, vec![c1.id, s2.id, c2.id, s1.id, s3.id]);

        let buckets: Vec<u8> = feed.iter().map(|i| i.bucket).collect();
        assert_eq!(buckets, vec![1, 1, 2, 3, 3]);
        assert!(feed[0].has_new_applications);
        assert_eq!(feed[0].new_application_count, 2);
        assert!(!feed[2].has_new_applications);
    }

    #[test]
    fn created_bucket_is_newest_first() {
        let older = posting(PostingOrigin::Created, 1);
        let newer = posting(PostingOrigin::Created, 7);
        let feed = compose_feed(&[older.clone(), newer.clone()], &[], &HashMap::new());
        assert_eq!(feed[0].posting.id, newer.id);
        assert_eq!(feed[1].posting.id, older.id);
    }

    #[test]
    fn seeded_bucket_keeps_insertion_order() {
        let seeded: Vec<Posting> = [9, 3, 5]
            .into_iter()
            .map(|seq| posting(PostingOrigin::Seeded, seq))
            .collect();
        let feed = compose_feed(&[], &seeded, &HashMap::new());
        let seqs: Vec<i64> = feed.iter().map(|i| i.posting.seq).collect();
        assert_eq!(seqs, vec![9, 3, 5]);
    }

    #[test]
    fn empty_catalog_gives_empty_feed() {
        assert!(compose_feed(&[], &[], &HashMap::new()).is_empty());
    }
}
