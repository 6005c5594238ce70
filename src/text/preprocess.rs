// TextPipeline — the normalize → tokenize → correct chain as one value.
//
// The chain is described by a serializable PipelineConfig so it can travel
// with a trained classifier: a classifier decoded from storage rebuilds the
// exact pipeline it was trained with, independent of the process defaults.

use serde::{Deserialize, Serialize};

use super::normalizer::{LineBreakPolicy, Normalizer, DEFAULT_PUNCTUATION};
use super::tokenizer::{StopWordList, Tokenizer};
use super::vocabulary::{VocabularyCorrector, DEFAULT_THRESHOLD, DEFAULT_VOCABULARY};
use crate::error::EngineResult;

/// Everything needed to rebuild a TextPipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub line_breaks: LineBreakPolicy,
    /// Punctuation characters kept by the normalizer
    pub punctuation: String,
    pub stop_word_list: StopWordList,
    /// Extra stop words on top of the built-in list
    pub extra_stop_words: Vec<String>,
    /// Correct domain words; empty disables correction
    pub vocabulary: Vec<String>,
    /// Maximum Levenshtein distance for a correction
    pub levenshtein_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_breaks: LineBreakPolicy::Isolate,
            punctuation: DEFAULT_PUNCTUATION.to_string(),
            stop_word_list: StopWordList::None,
            extra_stop_words: Vec::new(),
            vocabulary: DEFAULT_VOCABULARY.iter().map(|w| w.to_string()).collect(),
            levenshtein_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// A config with no stop words and no vocabulary — normalization only.
    pub fn plain() -> Self {
        Self {
            vocabulary: Vec::new(),
            ..Self::default()
        }
    }
}

/// The assembled preprocessing chain.
#[derive(Debug, Clone)]
pub struct TextPipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
    tokenizer: Tokenizer,
    corrector: VocabularyCorrector,
}

impl TextPipeline {
    pub fn new(config: PipelineConfig) -> EngineResult<Self> {
        let normalizer = Normalizer::new(config.line_breaks, &config.punctuation)?;

        // Stop words and vocabulary go through the same normalizer as the
        // documents, so "não" in a stop-word list still matches the token "nao".
        let tokenizer = Tokenizer::new(
            config
                .stop_word_list
                .words()
                .iter()
                .chain(config.extra_stop_words.iter())
                .map(|w| normalizer.normalize(w).trim().to_string())
                .filter(|w| !w.is_empty()),
        );
        let corrector = VocabularyCorrector::new(
            config
                .vocabulary
                .iter()
                .map(|w| normalizer.normalize(w).trim().to_string())
                .filter(|w| !w.is_empty()),
            config.levenshtein_threshold,
        );

        Ok(Self {
            config,
            normalizer,
            tokenizer,
            corrector,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn corrector(&self) -> &VocabularyCorrector {
        &self.corrector
    }

    /// Raw text to the final token sequence.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(text);
        let tokens = self.tokenizer.tokenize(&normalized);
        self.corrector.correct_all(tokens)
    }
}
