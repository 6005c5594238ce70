// Classifier — a trained, named document-type model.
//
// A classifier owns the fingerprints that survived TF-IDF compression, the
// per-fingerprint document counts gathered during training, and the text
// pipeline it was trained with. Classifying a text runs the same pipeline,
// shingles the result with the same multiplicity, and scales the Jaccard
// similarity against the model by the normalization factor so the best
// training text lands at 1.0.
//
// A Classifier only exists fully trained: it is produced by ModelBuilder
// (via `train`) or by decoding a stored payload, and is immutable after that.
// It is Send + Sync and can be shared across threads behind an Arc.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::builder::ModelBuilder;
use super::options::ClassifierOptions;
use crate::error::{EngineError, EngineResult};
use crate::shingling::{jaccard_similarity, ShingleHash, Shingling};
use crate::text::TextPipeline;

#[derive(Debug, Clone)]
pub struct Classifier {
    id: Uuid,
    name: String,
    options: ClassifierOptions,
    pipeline: TextPipeline,
    model: Shingling,
    document_frequencies: BTreeMap<ShingleHash, u32>,
    training_texts: u32,
    normalization_factor: f64,
    trained_at: DateTime<Utc>,
}

impl Classifier {
    /// Train a classifier from a corpus of example texts.
    ///
    /// All-or-nothing: if any text is too short for the multiplicity, or the
    /// compressed model cannot score any training text, no classifier is
    /// produced. Errors for a specific text carry its position in `texts`.
    pub fn train<S: AsRef<str>>(
        name: impl Into<String>,
        texts: &[S],
        options: ClassifierOptions,
    ) -> EngineResult<Self> {
        let mut builder = ModelBuilder::new(name, options)?;
        for (i, text) in texts.iter().enumerate() {
            builder.add_text(text.as_ref()).map_err(|e| match e {
                EngineError::Validation(msg) => {
                    EngineError::Validation(format!("training text #{}: {}", i + 1, msg))
                }
                other => other,
            })?;
        }
        builder.finish()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: Uuid,
        name: String,
        options: ClassifierOptions,
        pipeline: TextPipeline,
        model: Shingling,
        document_frequencies: BTreeMap<ShingleHash, u32>,
        training_texts: u32,
        normalization_factor: f64,
        trained_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            options,
            pipeline,
            model,
            document_frequencies,
            training_texts,
            normalization_factor,
            trained_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    pub fn multiplicity(&self) -> usize {
        self.options.multiplicity
    }

    pub fn tfidf_cutoff(&self) -> f64 {
        self.options.tfidf_cutoff
    }

    pub fn pipeline(&self) -> &TextPipeline {
        &self.pipeline
    }

    /// The retained fingerprints.
    pub fn model(&self) -> &Shingling {
        &self.model
    }

    pub fn model_size(&self) -> usize {
        self.model.len()
    }

    /// Distinct fingerprints seen across the whole training corpus.
    pub fn vocabulary_size(&self) -> usize {
        self.document_frequencies.len()
    }

    /// How many training texts contained the fingerprint.
    pub fn document_frequency(&self, hash: &ShingleHash) -> Option<u32> {
        self.document_frequencies.get(hash).copied()
    }

    pub(crate) fn document_frequencies(&self) -> &BTreeMap<ShingleHash, u32> {
        &self.document_frequencies
    }

    pub fn training_texts(&self) -> u32 {
        self.training_texts
    }

    /// 1 / (highest raw similarity over the training texts).
    pub fn normalization_factor(&self) -> f64 {
        self.normalization_factor
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Run the classifier's pipeline over `text` and shingle the tokens.
    pub fn shingle(&self, text: &str) -> EngineResult<Shingling> {
        let tokens = self.pipeline.tokens(text);
        Shingling::from_tokens(&tokens, self.options.multiplicity)
    }

    /// Unscaled Jaccard similarity between the model and `text`.
    pub fn raw_similarity(&self, text: &str) -> EngineResult<f64> {
        let shingling = self.shingle(text)?;
        jaccard_similarity(&self.model, &shingling)
    }

    /// Normalized confidence that `text` is of this classifier's type.
    ///
    /// Nonnegative. Usually in [0, 1], but a text that matches the model
    /// better than any training text did can exceed 1.
    pub fn classify(&self, text: &str) -> EngineResult<f64> {
        Ok(self.raw_similarity(text)? * self.normalization_factor)
    }
}
