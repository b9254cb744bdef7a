//! momentum-alpha: Announcement-driven trading pipeline for BSE corporate disclosures
//!
//! This library provides the core components for:
//! - Polling the exchange announcements page with retry and backoff
//! - Content-hash deduplication of polled announcements
//! - Keyword classification, order value extraction and confidence scoring
//! - History-driven trade parametrization and position sizing
//! - Pre-trade risk gating against daily limits
//! - Paper ledger and live broker execution
//! - Persistence of announcements, trades and daily performance
//! - Logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod dedup;
pub mod execution;
pub mod feed;
pub mod pipeline;
pub mod risk;
pub mod signal;
pub mod storage;
pub mod strategy;
pub mod telemetry;
