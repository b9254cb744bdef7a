//! HTTP client for the announcements page with retry and backoff

use super::{AnnouncementFeed, AnnouncementParser, FeedStats, TableParser};
use super::{Announcement, FeedError};
use crate::config::FeedConfig;
use crate::telemetry::{self, CounterMetric};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};
use std::time::Duration;
use tokio::time::sleep;

/// Pooled, retrying client for the disclosures feed
pub struct FeedClient {
    config: FeedConfig,
    client: Client,
    parser: Box<dyn AnnouncementParser>,
    stats: FeedStats,
}

impl FeedClient {
    /// Create a client using the built-in table parser
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let parser = Box::new(TableParser::new(&config.url));
        Self::with_parser(config, parser)
    }

    /// Create a client with a custom markup parser
    pub fn with_parser(
        config: FeedConfig,
        parser: Box<dyn AnnouncementParser>,
    ) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(300))
            .build()
            .map_err(FeedError::ClientBuild)?;

        tracing::info!(url = %config.url, "Feed client initialized");

        Ok(Self {
            config,
            client,
            parser,
            stats: FeedStats::default(),
        })
    }

    /// Delay before the retry that follows `attempt` (0-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let secs = self.config.backoff_factor * 2f64.powi(attempt as i32);
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// Fetch statistics
    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Single GET of the feed page
    async fn fetch_page(&self) -> Result<String, FeedError> {
        let response = self.client.get(&self.config.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Fetch the page, retrying with exponential backoff
    ///
    /// Returns `None` once every attempt has failed.
    async fn fetch_with_retry(&self) -> Option<String> {
        let attempts = self.config.max_retries.max(1);

        for attempt in 0..attempts {
            tracing::debug!(attempt = attempt + 1, "Fetching announcements");

            match self.fetch_page().await {
                Ok(page) => return Some(page),
                Err(e) if e.is_timeout() => {
                    tracing::warn!(attempt = attempt + 1, "Timeout fetching announcements");
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt = attempt + 1, "Feed fetch failed");
                }
            }

            if attempt + 1 < attempts {
                let wait = self.backoff_delay(attempt);
                tracing::info!(wait_secs = wait.as_secs_f64(), "Retrying feed fetch");
                sleep(wait).await;
            }
        }

        tracing::error!(attempts, "Failed to fetch announcements after all retries");
        None
    }

    /// Check robots.txt for a disallow covering the feed
    ///
    /// Returns true (allowed) when robots.txt cannot be fetched.
    pub async fn check_robots_txt(&self) -> bool {
        let robots_url = match Url::parse(&self.config.url).and_then(|u| u.join("/robots.txt")) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Could not build robots.txt URL");
                return true;
            }
        };

        let body = match self.client.get(robots_url).send().await {
            Ok(resp) if resp.status().is_success() => resp.text().await.unwrap_or_default(),
            Ok(_) => return true,
            Err(e) => {
                tracing::warn!(error = %e, "Could not check robots.txt");
                return true;
            }
        };

        let allowed = robots_allows(&body);
        if !allowed {
            tracing::warn!("robots.txt disallows scraping");
        }
        allowed
    }
}

#[async_trait]
impl AnnouncementFeed for FeedClient {
    async fn fetch(&mut self) -> Vec<Announcement> {
        self.stats.fetches += 1;

        let Some(page) = self.fetch_with_retry().await else {
            self.stats.failed_fetches += 1;
            telemetry::increment(CounterMetric::FeedFailures, 1);
            return vec![];
        };
        telemetry::increment(CounterMetric::FeedFetches, 1);

        let scrape_time = Utc::now();
        let rows = self.parser.parse(&page);
        self.stats.records_parsed += rows.len() as u64;
        self.stats.last_success = Some(scrape_time);

        let mut announcements = Vec::with_capacity(rows.len());
        for row in rows {
            match Announcement::from_raw(row, scrape_time) {
                Some(announcement) => announcements.push(announcement),
                None => {
                    self.stats.records_dropped += 1;
                    tracing::debug!("Dropped row missing title or company name");
                }
            }
        }

        announcements
    }
}

/// True unless robots.txt disallows the root or the corporates path
fn robots_allows(robots: &str) -> bool {
    let lower = robots.to_lowercase();
    !lower.lines().map(str::trim).any(|line| {
        line == "disallow: /" || line.starts_with("disallow: /corporates")
    })
}
