// ClassifierSet — ranks a text against several classifiers at once.
//
// Each classifier scores the text independently. Scores are raised to a
// power (squared by default) to widen the gap between the leader and the
// rest, then normalized so the confidences sum to 1.
//
// When every classifier scores 0 there is no evidence either way, and the
// set returns a uniform distribution instead of dividing by zero.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::Classifier;
use crate::error::{EngineError, EngineResult};

/// Default exponent applied to each score before normalization.
pub const DEFAULT_SCORE_EXPONENT: f64 = 2.0;

/// One classifier's normalized confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone)]
pub struct ClassifierSet {
    classifiers: Vec<Arc<Classifier>>,
    exponent: f64,
}

impl Default for ClassifierSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierSet {
    pub fn new() -> Self {
        Self {
            classifiers: Vec::new(),
            exponent: DEFAULT_SCORE_EXPONENT,
        }
    }

    /// A set using a different score exponent. Must be finite and positive.
    pub fn with_exponent(exponent: f64) -> EngineResult<Self> {
        if !exponent.is_finite() || exponent <= 0.0 {
            return Err(EngineError::validation(format!(
                "score exponent must be a positive number, got {exponent}"
            )));
        }
        Ok(Self {
            classifiers: Vec::new(),
            exponent,
        })
    }

    /// Build a set from classifiers, rejecting duplicate names.
    pub fn from_classifiers<I, C>(classifiers: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Arc<Classifier>>,
    {
        let mut set = Self::new();
        for classifier in classifiers {
            set.add(classifier)?;
        }
        Ok(set)
    }

    /// Add a classifier. Names are unique within a set.
    pub fn add(&mut self, classifier: impl Into<Arc<Classifier>>) -> EngineResult<()> {
        let classifier = classifier.into();
        if self.classifiers.iter().any(|c| c.name() == classifier.name()) {
            return Err(EngineError::validation(format!(
                "a classifier named '{}' is already in the set",
                classifier.name()
            )));
        }
        self.classifiers.push(classifier);
        Ok(())
    }

    pub fn exponent(&self) -> f64 {
        self.exponent
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    pub fn classifiers(&self) -> &[Arc<Classifier>] {
        &self.classifiers
    }

    /// Confidence per classifier, summing to 1, highest first.
    ///
    /// Ties are ordered by name. Fails with `EmptySet` when the set has no
    /// classifiers, and with any classifier's error (e.g. a text too short
    /// for its multiplicity).
    pub fn classify(&self, text: &str) -> EngineResult<Vec<Score>> {
        if self.classifiers.is_empty() {
            return Err(EngineError::EmptySet);
        }

        let mut raw = Vec::with_capacity(self.classifiers.len());
        for classifier in &self.classifiers {
            let score = classifier.classify(text)?;
            raw.push((classifier.name(), score.powf(self.exponent)));
        }

        let total: f64 = raw.iter().map(|(_, s)| s).sum();
        let mut scores: Vec<Score> = if total > 0.0 {
            raw.into_iter()
                .map(|(name, s)| Score {
                    name: name.to_string(),
                    confidence: s / total,
                })
                .collect()
        } else {
            let uniform = 1.0 / self.classifiers.len() as f64;
            raw.into_iter()
                .map(|(name, _)| Score {
                    name: name.to_string(),
                    confidence: uniform,
                })
                .collect()
        };

        scores.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.name.cmp(&b.name))
        });

        debug!(
            classifiers = scores.len(),
            top = %scores[0].name,
            confidence = scores[0].confidence,
            "Classified text"
        );

        Ok(scores)
    }
}
