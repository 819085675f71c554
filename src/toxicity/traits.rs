// Classifier trait and the score map it produces.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::FeedbackResult;

/// Categories requested from the classifier for every message.
pub const MONITORED_ATTRIBUTES: [&str; 6] = [
    "TOXICITY",
    "SEVERE_TOXICITY",
    "IDENTITY_ATTACK",
    "INSULT",
    "PROFANITY",
    "THREAT",
];

/// Per-category scores (0.0 benign to 1.0 very likely) for one piece of text.
///
/// Only lives for the duration of a submission; the decision it yields is
/// what gets persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationScores {
    scores: BTreeMap<String, f64>,
}

impl ClassificationScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score for a category label such as "TOXICITY".
    pub fn insert(&mut self, category: impl Into<String>, score: f64) {
        self.scores.insert(category.into(), score);
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.scores.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The highest-scoring category, if any scores are present.
    pub fn max(&self) -> Option<(&str, f64)> {
        self.iter().fold(None, |best, (k, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((k, v)),
        })
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ClassificationScores {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut scores = Self::new();
        for (k, v) in iter {
            scores.insert(k, v);
        }
        scores
    }
}

/// Scores text for abusive content. Implementations are async because the
/// real provider is an HTTP service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a single non-empty text.
    ///
    /// Any provider failure is reported as
    /// `FeedbackError::ClassificationUnavailable`.
    async fn classify(&self, text: &str) -> FeedbackResult<ClassificationScores>;
}
