// ModelBuilder — TF-IDF compression of a training corpus into a model.
//
// Each training text becomes a Shingling. Across the corpus the builder
// tracks two counters per fingerprint hash:
//
//   - corpus count:   one per text containing it; repeats inside a text
//                     are not counted again
//   - document count: how many texts contained it at least once
//
// Both counters end up equal. From them it scores every fingerprint:
//
//   tf    = 0.5 + 0.5 * count / max_count      (augmented, in [0.5, 1.0])
//   idf   = ln(texts / document_count)
//   tfidf = tf * idf
//
// and keeps the fingerprints with tfidf <= cutoff as the model. Those are
// the ones shared across most of the corpus (idf near zero), i.e. the common
// backbone of the document type rather than the one-off details. A
// fingerprint present in every training text has idf 0 and is always kept.
//
// The builder is consumed by `finish`, so a half-built model is never
// observable as a Classifier.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::Classifier;
use super::options::ClassifierOptions;
use crate::error::{EngineError, EngineResult};
use crate::shingling::{jaccard_similarity, ShingleHash, Shingling};
use crate::text::TextPipeline;

/// Accumulates training shinglings for one classifier.
pub struct ModelBuilder {
    name: String,
    options: ClassifierOptions,
    pipeline: TextPipeline,
    /// One shingling per training text, in order
    documents: Vec<Shingling>,
    /// Every fingerprint seen, counted once per text containing it
    corpus: Shingling,
    document_frequencies: BTreeMap<ShingleHash, u32>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>, options: ClassifierOptions) -> EngineResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EngineError::validation("classifier name must not be empty"));
        }
        options.validate()?;

        let pipeline = TextPipeline::new(options.pipeline.clone())?;
        let corpus = Shingling::empty(options.multiplicity)?;

        Ok(Self {
            name,
            options,
            pipeline,
            documents: Vec::new(),
            corpus,
            document_frequencies: BTreeMap::new(),
        })
    }

    /// Preprocess and shingle one training text, then account for it.
    pub fn add_text(&mut self, text: &str) -> EngineResult<()> {
        let tokens = self.pipeline.tokens(text);
        let shingling = Shingling::from_tokens(&tokens, self.options.multiplicity)?;
        self.add_shingling(shingling)
    }

    /// Account for an already-built shingling.
    pub fn add_shingling(&mut self, shingling: Shingling) -> EngineResult<()> {
        if shingling.multiplicity() != self.options.multiplicity {
            return Err(EngineError::validation(format!(
                "training shingling has multiplicity {}, classifier expects {}",
                shingling.multiplicity(),
                self.options.multiplicity
            )));
        }
        if shingling.is_empty() {
            return Err(EngineError::validation("training shingling is empty"));
        }

        // Term frequency counts documents, not repeats within one document
        for shingle in shingling.shingles() {
            self.corpus.insert(shingle.clone())?;
            *self.document_frequencies.entry(shingle.hash()).or_insert(0) += 1;
        }
        self.documents.push(shingling);
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Distinct fingerprints seen so far.
    pub fn fingerprint_count(&self) -> usize {
        self.corpus.len()
    }

    /// TF-IDF score of every fingerprint seen so far, in first-seen order.
    pub fn tfidf_scores(&self) -> Vec<(ShingleHash, f64)> {
        let max_count = self
            .corpus
            .iter()
            .map(|(_, count)| count)
            .max()
            .unwrap_or(0);
        if max_count == 0 {
            return Vec::new();
        }

        let texts = self.documents.len() as f64;
        self.corpus
            .iter()
            .map(|(shingle, count)| {
                let tf = 0.5 + 0.5 * (f64::from(count) / f64::from(max_count));
                let document_count = self
                    .document_frequencies
                    .get(&shingle.hash())
                    .copied()
                    .unwrap_or(1);
                let idf = (texts / f64::from(document_count)).ln();
                (shingle.hash(), tf * idf)
            })
            .collect()
    }

    /// Compress the corpus into a model and compute the normalization factor.
    pub fn finish(self) -> EngineResult<Classifier> {
        if self.documents.is_empty() {
            return Err(EngineError::validation("training corpus is empty"));
        }

        let cutoff = self.options.tfidf_cutoff;
        let mut model = Shingling::empty(self.options.multiplicity)?;
        for (hash, tfidf) in self.tfidf_scores() {
            if tfidf > cutoff {
                continue;
            }
            if let (Some(shingle), Some(count)) = (self.corpus.get(&hash), self.corpus.count(&hash))
            {
                model.insert_counted(shingle.clone(), count)?;
            }
        }

        debug!(
            name = %self.name,
            fingerprints = self.corpus.len(),
            retained = model.len(),
            cutoff,
            "Compressed training corpus"
        );

        // Score every training text against the fresh model; the best one
        // defines the top of the scale.
        let mut highest = 0.0_f64;
        for document in &self.documents {
            let score = jaccard_similarity(&model, document)?;
            if score > highest {
                highest = score;
            }
        }

        if highest <= 0.0 {
            return Err(EngineError::computation(format!(
                "classifier '{}' scores 0 on every training text ({} of {} fingerprints retained at cutoff {})",
                self.name,
                model.len(),
                self.corpus.len(),
                cutoff
            )));
        }
        let normalization_factor = 1.0 / highest;

        info!(
            name = %self.name,
            texts = self.documents.len(),
            fingerprints = self.corpus.len(),
            model_size = model.len(),
            normalization_factor,
            "Trained classifier"
        );

        Ok(Classifier::from_parts(
            Uuid::new_v4(),
            self.name,
            self.options,
            self.pipeline,
            model,
            self.document_frequencies,
            self.documents.len() as u32,
            normalization_factor,
            Utc::now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::PipelineConfig;

    fn plain_builder(n: usize) -> ModelBuilder {
        let options = ClassifierOptions::default()
            .with_multiplicity(n)
            .with_pipeline(PipelineConfig::plain());
        ModelBuilder::new("test", options).unwrap()
    }

    fn score_of(builder: &ModelBuilder, token: &str) -> f64 {
        let hash = ShingleHash::of(&[token.to_string()]);
        builder
            .tfidf_scores()
            .into_iter()
            .find(|(h, _)| *h == hash)
            .map(|(_, s)| s)
            .unwrap()
    }

    #[test]
    fn test_tfidf_values() {
        let mut b = plain_builder(1);
        b.add_text("total compra valor").unwrap();
        b.add_text("cupom fiscal valor total").unwrap();

        // Every count is 2 or 1; max is 2.
        // "total": count 2, in both texts -> idf 0
        assert!(score_of(&b, "total").abs() < 1e-12);
        // "compra": count 1 -> tf 0.75, idf ln 2
        let expected = 0.75 * 2f64.ln();
        assert!((score_of(&b, "compra") - expected).abs() < 1e-12);
    }

    #[test]
    fn test_repeats_within_a_text_do_not_raise_tf() {
        let mut b = plain_builder(1);
        b.add_text("total total total total compra").unwrap();
        b.add_text("valor").unwrap();
        // Every fingerprint appears in one text: count 1, tf 1.0, idf ln 2
        assert!((score_of(&b, "compra") - 2f64.ln()).abs() < 1e-12);
        assert!((score_of(&b, "total") - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_tf_counts_texts_containing_the_fingerprint() {
        let options = ClassifierOptions::default()
            .with_tfidf_cutoff(0.5)
            .with_pipeline(PipelineConfig::plain());
        let mut b = ModelBuilder::new("repeats", options).unwrap();
        b.add_text("a a a b").unwrap();
        b.add_text("a c").unwrap();
        // a: 2 texts, b and c: 1 each, max 2 -> tf(b) = 0.75, tfidf 0.52 > 0.5
        assert!((score_of(&b, "b") - 0.75 * 2f64.ln()).abs() < 1e-12);

        let classifier = b.finish().unwrap();
        let kept: Vec<String> = classifier
            .model()
            .shingles()
            .iter()
            .map(|s| s.text())
            .collect();
        assert_eq!(kept, vec!["a"]);
        assert_eq!(classifier.classify("b").unwrap(), 0.0);
    }

    #[test]
    fn test_model_keeps_low_tfidf_fingerprints() {
        let mut b = plain_builder(1);
        b.add_text("total compra valor").unwrap();
        b.add_text("cupom fiscal valor total").unwrap();
        let classifier = b.finish().unwrap();

        let kept: Vec<String> = classifier
            .model()
            .shingles()
            .iter()
            .map(|s| s.text())
            .collect();
        assert_eq!(kept, vec!["total", "valor"]);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        // With a single text every idf is 0, so every tfidf equals the cutoff 0.0
        let options = ClassifierOptions::default()
            .with_tfidf_cutoff(0.0)
            .with_pipeline(PipelineConfig::plain());
        let mut b = ModelBuilder::new("inclusive", options).unwrap();
        b.add_text("a b c").unwrap();
        let classifier = b.finish().unwrap();
        assert_eq!(classifier.model_size(), 3);
    }

    #[test]
    fn test_empty_corpus_fails() {
        let b = plain_builder(1);
        assert!(matches!(b.finish(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_zero_maximum_fails() {
        // Two disjoint texts: every fingerprint has idf ln 2 > cutoff, the
        // model is empty, and no training text can be scored.
        let mut b = plain_builder(1);
        b.add_text("alpha beta").unwrap();
        b.add_text("gamma delta").unwrap();
        assert!(matches!(b.finish(), Err(EngineError::Computation(_))));
    }

    #[test]
    fn test_rejects_wrong_multiplicity() {
        let mut b = plain_builder(2);
        let tokens = vec!["a".to_string(), "b".to_string()];
        let s = Shingling::from_tokens(&tokens, 1).unwrap();
        assert!(b.add_shingling(s).is_err());
        assert_eq!(b.document_count(), 0);
    }

    #[test]
    fn test_failed_text_leaves_builder_untouched() {
        let mut b = plain_builder(3);
        b.add_text("a b c").unwrap();
        assert!(b.add_text("a b").is_err());
        assert_eq!(b.document_count(), 1);
        assert_eq!(b.fingerprint_count(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(ModelBuilder::new("  ", ClassifierOptions::default()).is_err());
    }
}
