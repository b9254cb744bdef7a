//! Entity and pattern enrichment layered over a base classifier

use super::{Classifier, Enrichment, Entity, EntityLabel, ExtractedSignal, KeywordClassifier};
use crate::config::ExtractorConfig;
use crate::feed::Announcement;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MONEY_RE: Regex = Regex::new(
        r"(?i)(?:\b(?:rs\.?|inr|rupees?)|₹)\s*[0-9,]+(?:\.[0-9]+)?(?:\s*(?:crores?|cr|lakhs?)\b)?"
    )
    .unwrap();
    static ref DURATION_RE: Regex =
        Regex::new(r"(?i)\b[0-9]+\s*(?:years?|months?|weeks?|days?)\b").unwrap();
    static ref ORG_NAME_RE: Regex = Regex::new(
        r"\b[A-Z][A-Za-z&]*(?:\s+[A-Z][A-Za-z&]*)*\s+(?:Limited|Ltd|Corporation|Authority|Railways)\b"
    )
    .unwrap();
    static ref ACRONYM_RE: Regex = Regex::new(r"\b[A-Z]{3,}\b").unwrap();
    static ref TOKEN_RE: Regex = Regex::new(r"\w+").unwrap();
    static ref SENTENCE_BREAK_RE: Regex = Regex::new(r"[.!?]\s+[A-Z]").unwrap();
}

/// Classifier that appends entities and token statistics to tradeable signals
///
/// The wrapped classifier's decision is never altered.
pub struct EnrichedClassifier<C: Classifier = KeywordClassifier> {
    inner: C,
    /// Primary keywords as lower-cased token sequences
    phrases: Vec<Vec<String>>,
}

impl EnrichedClassifier<KeywordClassifier> {
    /// Wrap a keyword classifier built from `config`
    pub fn new(config: &ExtractorConfig) -> Self {
        Self::with_inner(KeywordClassifier::new(config), config)
    }
}

impl<C: Classifier> EnrichedClassifier<C> {
    /// Wrap an arbitrary classifier
    pub fn with_inner(inner: C, config: &ExtractorConfig) -> Self {
        let phrases = config
            .primary_keywords
            .iter()
            .map(|k| tokenize(&k.to_lowercase()))
            .filter(|tokens| !tokens.is_empty())
            .collect();
        Self { inner, phrases }
    }

    /// Compute enrichment metadata for a title
    pub fn enrich(&self, title: &str) -> Enrichment {
        let tokens = tokenize(&title.to_lowercase());
        let pattern_matches = self.phrases.iter().any(|phrase| {
            tokens
                .windows(phrase.len())
                .any(|window| window == phrase.as_slice())
        });

        Enrichment {
            entities: extract_entities(title),
            pattern_matches,
            token_count: tokens.len(),
            sentence_count: count_sentences(title),
        }
    }
}

impl<C: Classifier> Classifier for EnrichedClassifier<C> {
    fn classify(&self, announcement: &Announcement) -> ExtractedSignal {
        let mut signal = self.inner.classify(announcement);
        if signal.is_tradeable {
            signal.enrichment = Some(self.enrich(announcement.title.trim()));
        }
        signal
    }

    fn name(&self) -> &'static str {
        "enriched"
    }
}

fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn count_sentences(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    SENTENCE_BREAK_RE.find_iter(text).count() + 1
}

/// Labelled spans ordered by position; later labels never overlap earlier ones
pub fn extract_entities(title: &str) -> Vec<Entity> {
    let mut entities: Vec<Entity> = Vec::new();

    let labelled = [
        (&*MONEY_RE, EntityLabel::Money),
        (&*DURATION_RE, EntityLabel::Date),
        (&*ORG_NAME_RE, EntityLabel::Org),
        (&*ACRONYM_RE, EntityLabel::Org),
    ];

    for (re, label) in labelled {
        for m in re.find_iter(title) {
            let overlaps = entities
                .iter()
                .any(|e| m.start() < e.end && e.start < m.end());
            if overlaps {
                continue;
            }
            entities.push(Entity {
                text: m.as_str().trim().to_string(),
                label,
                start: m.start(),
                end: m.end(),
            });
        }
    }

    entities.sort_by_key(|e| e.start);
    entities
}
