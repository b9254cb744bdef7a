//! Extraction types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which keyword list matched the title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMatch {
    /// Strong order-award phrasing
    Primary,
    /// Weaker contract/agreement phrasing
    Secondary,
    /// Nothing relevant
    None,
}

/// Kind of span found by enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Money,
    Date,
    Org,
}

/// A labelled span of the title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    /// Byte offsets into the title
    pub start: usize,
    pub end: usize,
}

/// Metadata appended by the enriched classifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub entities: Vec<Entity>,
    /// Whether an order-award phrase was re-verified at token level
    pub pattern_matches: bool,
    pub token_count: usize,
    pub sentence_count: usize,
}

/// Classification result for one announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSignal {
    pub announcement_hash: String,
    pub is_tradeable: bool,
    /// Human-readable decision reason
    pub reason: String,
    /// Coarse ticker guess derived from the company name
    pub symbol: String,
    pub company_name: String,
    pub keyword_match: KeywordMatch,
    /// Order value in rupees, unset when no amount was found
    pub order_value: Option<Decimal>,
    /// Source text the order value was read from
    pub order_value_text: Option<String>,
    /// Score in [0, 1]; zero when classification stopped before scoring
    pub confidence: Decimal,
    pub enrichment: Option<Enrichment>,
    pub processed_at: DateTime<Utc>,
}
