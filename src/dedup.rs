//! Content-hash deduplication of polled announcements

use crate::feed::Announcement;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Hex SHA-256 digest of the identifying fields of an announcement
pub fn content_hash(date: &str, time: &str, company_name: &str, title: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [date, time, company_name, title] {
        hasher.update(part.trim().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Process-lifetime set of seen announcement hashes
///
/// Filtering takes `&mut self`; callers sharing an index across tasks must
/// wrap it in a mutex so membership check and insert stay atomic.
#[derive(Debug, Default)]
pub struct DeduplicationIndex {
    /// Hash to the time it was first seen
    seen: HashMap<String, DateTime<Utc>>,
}

impl DeduplicationIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only announcements never seen before, marking them seen
    pub fn filter_new(&mut self, records: Vec<Announcement>) -> Vec<Announcement> {
        self.filter_new_at(records, Utc::now())
    }

    /// Same as [`filter_new`](Self::filter_new) with an explicit clock
    pub fn filter_new_at(
        &mut self,
        records: Vec<Announcement>,
        now: DateTime<Utc>,
    ) -> Vec<Announcement> {
        records
            .into_iter()
            .filter(|record| {
                if self.seen.contains_key(&record.hash) {
                    return false;
                }
                self.seen.insert(record.hash.clone(), now);
                true
            })
            .collect()
    }

    /// Whether a hash has been seen
    pub fn contains(&self, hash: &str) -> bool {
        self.seen.contains_key(hash)
    }

    /// Number of hashes held
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Drop hashes first seen before `cutoff`, returning how many were evicted
    ///
    /// An evicted announcement that is still on the feed will be processed again.
    pub fn evict_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.seen.len();
        self.seen.retain(|_, first_seen| *first_seen >= cutoff);
        let evicted = before - self.seen.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.seen.len(), "Evicted dedup hashes");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::RawAnnouncement;
    use chrono::Duration;

    fn announcement(title: &str) -> Announcement {
        Announcement::from_raw(
            RawAnnouncement {
                date: "15-01-2024".to_string(),
                time: "10:30:00".to_string(),
                company_name: "XYZ Limited".to_string(),
                title: title.to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_content_hash_is_stable() {
        let a = content_hash("d", "t", "c", "title");
        let b = content_hash(" d", "t ", "c", "title");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_hash("d", "t", "c", "other"));
    }

    #[test]
    fn test_filter_new_is_idempotent() {
        let mut index = DeduplicationIndex::new();
        let batch = vec![announcement("A"), announcement("B"), announcement("C")];

        let first = index.filter_new(batch.clone());
        let second = index.filter_new(batch);

        assert_eq!(first.len(), 3);
        assert!(second.is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_duplicates_within_batch_kept_once() {
        let mut index = DeduplicationIndex::new();
        let batch = vec![announcement("A"), announcement("A"), announcement("B")];

        let fresh = index.filter_new(batch);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].title, "A");
        assert_eq!(fresh[1].title, "B");
    }

    #[test]
    fn test_partial_overlap() {
        let mut index = DeduplicationIndex::new();
        index.filter_new(vec![announcement("A")]);

        let fresh = index.filter_new(vec![announcement("A"), announcement("B")]);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].title, "B");
        assert!(index.contains(&announcement("A").hash));
    }

    #[test]
    fn test_evict_older_than() {
        let mut index = DeduplicationIndex::new();
        let now = Utc::now();
        index.filter_new_at(vec![announcement("old")], now - Duration::days(10));
        index.filter_new_at(vec![announcement("new")], now);

        let evicted = index.evict_older_than(now - Duration::days(7));

        assert_eq!(evicted, 1);
        assert_eq!(index.len(), 1);
        // An evicted hash is treated as new again
        assert_eq!(index.filter_new(vec![announcement("old")]).len(), 1);
    }
}
