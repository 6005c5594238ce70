use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::classifier::options::{DEFAULT_MULTIPLICITY, DEFAULT_TFIDF_CUTOFF};
use crate::classifier::{ClassifierOptions, DEFAULT_SCORE_EXPONENT};
use crate::text::normalizer::LineBreakPolicy;
use crate::text::tokenizer::StopWordList;
use crate::text::vocabulary::DEFAULT_THRESHOLD;
use crate::text::PipelineConfig;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default; a variable that is set but malformed is an error
/// rather than silently falling back.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Default shingle size for new classifiers
    pub multiplicity: usize,
    pub tfidf_cutoff: f64,
    pub levenshtein_threshold: usize,
    pub stop_words: StopWordList,
    pub line_breaks: LineBreakPolicy,
    /// Newline-separated domain vocabulary; unset means the built-in list
    pub vocabulary_file: Option<PathBuf>,
    /// Exponent applied to scores before an ensemble normalizes them
    pub score_exponent: f64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            db_path: env::var("INKPRINT_DB_PATH").unwrap_or_else(|_| "./inkprint.db".to_string()),
            multiplicity: parse_var("INKPRINT_MULTIPLICITY", DEFAULT_MULTIPLICITY)?,
            tfidf_cutoff: parse_var("INKPRINT_TFIDF_CUTOFF", DEFAULT_TFIDF_CUTOFF)?,
            levenshtein_threshold: parse_var("INKPRINT_LEVENSHTEIN_THRESHOLD", DEFAULT_THRESHOLD)?,
            stop_words: parse_var("INKPRINT_STOP_WORDS", StopWordList::None)?,
            line_breaks: parse_var("INKPRINT_LINE_BREAKS", LineBreakPolicy::Isolate)?,
            vocabulary_file: env::var("INKPRINT_VOCABULARY_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            score_exponent: parse_var("INKPRINT_SCORE_EXPONENT", DEFAULT_SCORE_EXPONENT)?,
        })
    }

    /// The preprocessing config new classifiers are trained with.
    ///
    /// Reads the vocabulary file when one is configured: one word per line,
    /// blank lines and `#` comments ignored.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig {
            line_breaks: self.line_breaks,
            stop_word_list: self.stop_words,
            levenshtein_threshold: self.levenshtein_threshold,
            ..PipelineConfig::default()
        };

        if let Some(path) = &self.vocabulary_file {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read vocabulary file {}", path.display()))?;
            config.vocabulary = parse_vocabulary(&contents);
        }

        Ok(config)
    }

    /// Training options from the configured defaults, with optional
    /// per-command overrides.
    pub fn classifier_options(
        &self,
        multiplicity: Option<usize>,
        tfidf_cutoff: Option<f64>,
    ) -> Result<ClassifierOptions> {
        let options = ClassifierOptions {
            multiplicity: multiplicity.unwrap_or(self.multiplicity),
            tfidf_cutoff: tfidf_cutoff.unwrap_or(self.tfidf_cutoff),
            pipeline: self.pipeline_config()?,
        };
        options.validate()?;
        Ok(options)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {name} ({raw:?}): {e}")),
        _ => Ok(default),
    }
}

fn parse_vocabulary(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
