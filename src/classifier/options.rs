// Training options for a classifier.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::text::PipelineConfig;

/// Default shingle size: single-token shingles.
pub const DEFAULT_MULTIPLICITY: usize = 1;

/// Default TF-IDF cutoff. Fingerprints scoring at or below it are kept.
pub const DEFAULT_TFIDF_CUTOFF: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOptions {
    /// Shingle size n
    pub multiplicity: usize,
    /// Fingerprints with `tfidf <= tfidf_cutoff` make up the trained model
    pub tfidf_cutoff: f64,
    /// Preprocessing applied to training texts and to every classified text
    pub pipeline: PipelineConfig,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            multiplicity: DEFAULT_MULTIPLICITY,
            tfidf_cutoff: DEFAULT_TFIDF_CUTOFF,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ClassifierOptions {
    pub fn with_multiplicity(mut self, multiplicity: usize) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_tfidf_cutoff(mut self, cutoff: f64) -> Self {
        self.tfidf_cutoff = cutoff;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.multiplicity == 0 {
            return Err(EngineError::validation("multiplicity must be at least 1"));
        }
        if !self.tfidf_cutoff.is_finite() {
            return Err(EngineError::validation(format!(
                "tf-idf cutoff must be a finite number, got {}",
                self.tfidf_cutoff
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ClassifierOptions::default();
        assert_eq!(opts.multiplicity, 1);
        assert!((opts.tfidf_cutoff - 0.1).abs() < f64::EPSILON);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClassifierOptions::default()
            .with_multiplicity(0)
            .validate()
            .is_err());
        assert!(ClassifierOptions::default()
            .with_tfidf_cutoff(f64::NAN)
            .validate()
            .is_err());
    }
}
