//! Announcement feed types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row as returned by the markup parser, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAnnouncement {
    pub date: String,
    pub time: String,
    pub company_name: String,
    pub title: String,
    pub category: String,
    pub pdf_url: Option<String>,
}

/// A single disclosure record from the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Content digest of date, time, company and title
    pub hash: String,
    pub date: String,
    pub time: String,
    pub company_name: String,
    pub title: String,
    pub category: String,
    pub pdf_url: Option<String>,
    /// Local timestamp when the row was fetched
    pub scrape_time: DateTime<Utc>,
}

impl Announcement {
    /// Build an announcement from a parsed row
    ///
    /// Returns `None` when the title or company name is blank.
    pub fn from_raw(raw: RawAnnouncement, scrape_time: DateTime<Utc>) -> Option<Self> {
        let company_name = clean_text(&raw.company_name);
        let title = clean_text(&raw.title);
        if company_name.is_empty() || title.is_empty() {
            return None;
        }

        let date = clean_text(&raw.date);
        let time = clean_text(&raw.time);
        let hash = crate::dedup::content_hash(&date, &time, &company_name, &title);

        Some(Self {
            hash,
            date,
            time,
            company_name,
            title,
            category: clean_text(&raw.category),
            pdf_url: raw.pdf_url.filter(|u| !u.trim().is_empty()),
            scrape_time,
        })
    }
}

/// Collapse line breaks and surrounding whitespace
fn clean_text(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}

/// Fetch statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct FeedStats {
    pub fetches: u64,
    pub failed_fetches: u64,
    pub records_parsed: u64,
    pub records_dropped: u64,
    pub last_success: Option<DateTime<Utc>>,
}
