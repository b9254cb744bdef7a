//! Signal extraction module
//!
//! Classifies announcements for trading relevance and scores confidence

mod enriched;
mod extractor;
mod types;
mod value;

pub use enriched::{extract_entities, EnrichedClassifier};
pub use extractor::{derive_symbol, score_confidence, KeywordClassifier};
pub use types::{Enrichment, Entity, EntityLabel, ExtractedSignal, KeywordMatch};
pub use value::{extract_order_value, OrderValue, CRORE, LAKH};

use crate::config::ExtractorConfig;
use crate::feed::Announcement;

/// Trait for announcement classifiers
pub trait Classifier: Send + Sync {
    /// Classify a single announcement; never fails
    fn classify(&self, announcement: &Announcement) -> ExtractedSignal;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Create the classifier selected by `config.enrichment`
pub fn create_classifier(config: &ExtractorConfig) -> Box<dyn Classifier> {
    if config.enrichment {
        Box::new(EnrichedClassifier::new(config))
    } else {
        Box::new(KeywordClassifier::new(config))
    }
}
