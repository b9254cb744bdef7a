//! Keyword classification, symbol derivation and confidence scoring

use super::value::{extract_order_value, CRORE};
use super::{Classifier, ExtractedSignal, KeywordMatch};
use crate::config::ExtractorConfig;
use crate::feed::Announcement;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

lazy_static! {
    static ref CORPORATE_SUFFIX_RE: Regex =
        Regex::new(r"(?i)\b(limited|ltd|pvt|private|company|corp|corporation)\b").unwrap();
    static ref NON_ALPHA_RE: Regex = Regex::new(r"[^a-zA-Z\s]").unwrap();
}

/// Maximum symbol length
const SYMBOL_LEN: usize = 6;

const POSITIVE_TERMS: [&str; 3] = ["agreement", "contract", "supply"];
const HEDGING_TERMS: [&str; 4] = ["board meeting", "consider", "proposed", "potential"];

/// Keyword-only classifier, always available
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    primary: Vec<String>,
    secondary: Vec<String>,
    min_order_value: Decimal,
    confidence_threshold: Decimal,
}

impl KeywordClassifier {
    /// Create a classifier from configuration
    pub fn new(config: &ExtractorConfig) -> Self {
        let lower = |words: &[String]| words.iter().map(|w| w.to_lowercase()).collect();
        Self {
            primary: lower(&config.primary_keywords),
            secondary: lower(&config.secondary_keywords),
            min_order_value: config.min_order_value,
            confidence_threshold: config.confidence_threshold,
        }
    }

    /// Match the lower-cased title against the keyword lists
    pub fn match_keywords(&self, title_lower: &str) -> KeywordMatch {
        if self.primary.iter().any(|k| title_lower.contains(k.as_str())) {
            KeywordMatch::Primary
        } else if self.secondary.iter().any(|k| title_lower.contains(k.as_str())) {
            KeywordMatch::Secondary
        } else {
            KeywordMatch::None
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, announcement: &Announcement) -> ExtractedSignal {
        let title = announcement.title.trim();
        let company_name = announcement.company_name.trim();

        let mut signal = ExtractedSignal {
            announcement_hash: announcement.hash.clone(),
            is_tradeable: false,
            reason: String::new(),
            symbol: derive_symbol(company_name),
            company_name: company_name.to_string(),
            keyword_match: KeywordMatch::None,
            order_value: None,
            order_value_text: None,
            confidence: Decimal::ZERO,
            enrichment: None,
            processed_at: Utc::now(),
        };

        if title.is_empty() || company_name.is_empty() {
            signal.reason = "missing title or company name".to_string();
            return signal;
        }

        let title_lower = title.to_lowercase();
        signal.keyword_match = self.match_keywords(&title_lower);
        if signal.keyword_match == KeywordMatch::None {
            signal.reason = "no relevant keywords".to_string();
            return signal;
        }

        if let Some(value) = extract_order_value(title) {
            signal.order_value = Some(value.amount);
            signal.order_value_text = Some(value.text);
        }

        if let Some(value) = signal.order_value {
            if value < self.min_order_value {
                signal.reason = format!(
                    "order value {} below threshold {}",
                    value, self.min_order_value
                );
                return signal;
            }
        }

        signal.confidence = score_confidence(title, signal.keyword_match, signal.order_value);
        if signal.confidence < self.confidence_threshold {
            signal.reason = format!(
                "confidence {} below threshold {}",
                signal.confidence, self.confidence_threshold
            );
            return signal;
        }

        signal.is_tradeable = true;
        signal.reason = "valid order announcement".to_string();
        signal
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Coarse ticker guess from a company name
///
/// Strips corporate suffixes and non-letters, then takes the first word
/// truncated to six characters. Falls back to the first six characters of the
/// raw name when no word survives.
pub fn derive_symbol(company_name: &str) -> String {
    let without_suffix = CORPORATE_SUFFIX_RE.replace_all(company_name, "");
    let letters_only = NON_ALPHA_RE.replace_all(&without_suffix, "");

    match letters_only.split_whitespace().next() {
        Some(word) => word.chars().take(SYMBOL_LEN).collect::<String>().to_uppercase(),
        None => company_name
            .chars()
            .take(SYMBOL_LEN)
            .collect::<String>()
            .to_uppercase(),
    }
}

/// Additive confidence score, clamped to [0, 1]
pub fn score_confidence(
    title: &str,
    keyword_match: KeywordMatch,
    order_value: Option<Decimal>,
) -> Decimal {
    let title_lower = title.to_lowercase();
    let mut confidence = Decimal::ZERO;

    confidence += match keyword_match {
        KeywordMatch::Primary => dec!(0.5),
        _ => dec!(0.3),
    };

    if let Some(value) = order_value {
        confidence += dec!(0.2);
        if value > CRORE * dec!(10) {
            confidence += dec!(0.1);
        }
    }

    if POSITIVE_TERMS.iter().any(|t| title_lower.contains(t)) {
        confidence += dec!(0.1);
    }

    if title_lower.contains("year") {
        confidence += dec!(0.05);
    }

    if HEDGING_TERMS.iter().any(|t| title_lower.contains(t)) {
        confidence -= dec!(0.2);
    }

    confidence.clamp(Decimal::ZERO, Decimal::ONE)
}
