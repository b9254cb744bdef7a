//! Announcement feed module
//!
//! Polls the disclosures page and normalizes rows into announcements

mod client;
mod parser;
mod types;

pub use client::FeedClient;
pub use parser::{AnnouncementParser, TableParser};
pub use types::{Announcement, FeedStats, RawAnnouncement};

use async_trait::async_trait;
use thiserror::Error;

/// Feed fetch errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// Transport error or timeout
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status code
    #[error("HTTP status {0}")]
    Status(u16),
}

impl FeedError {
    /// Whether the failure was a request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, FeedError::Http(e) if e.is_timeout())
    }
}

/// Trait for announcement sources
///
/// Implementations never fail: an unreachable source yields an empty batch.
#[async_trait]
pub trait AnnouncementFeed: Send {
    /// Fetch the current announcements page
    async fn fetch(&mut self) -> Vec<Announcement>;
}
