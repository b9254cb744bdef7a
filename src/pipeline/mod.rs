//! Pipeline orchestration module
//!
//! The polling loop tying feed, extraction, strategy, risk and execution together

mod orchestrator;
mod stop;

pub use orchestrator::Orchestrator;
pub use stop::StopHandle;

use serde::Serialize;

/// Counters for one pipeline iteration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Valid announcements returned by the feed
    pub fetched: usize,
    /// Announcements not seen before
    pub new: usize,
    pub tradeable: usize,
    /// Approved by the strategy analyzer
    pub approved: usize,
    pub risk_rejected: usize,
    /// Completed or placed
    pub executed: usize,
    pub failed: usize,
    /// Skipped by the engine or not executed in development mode
    pub skipped: usize,
}
