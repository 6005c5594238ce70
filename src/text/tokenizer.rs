// Whitespace tokenizer with stop-word removal.
//
// Input is expected to be normalized already, so the only separator left is
// a single space. Under the `Isolate` line break policy the `\n` marker is
// surrounded by spaces and therefore comes out as a token of its own.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

use crate::error::EngineError;

/// Which built-in stop-word list to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWordList {
    #[default]
    None,
    Portuguese,
    English,
    Spanish,
}

impl StopWordList {
    /// The raw words of the list, as shipped by the `stop-words` crate.
    pub fn words(&self) -> Vec<String> {
        match self {
            StopWordList::None => Vec::new(),
            StopWordList::Portuguese => get(LANGUAGE::Portuguese),
            StopWordList::English => get(LANGUAGE::English),
            StopWordList::Spanish => get(LANGUAGE::Spanish),
        }
    }
}

impl fmt::Display for StopWordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StopWordList::None => "none",
            StopWordList::Portuguese => "portuguese",
            StopWordList::English => "english",
            StopWordList::Spanish => "spanish",
        };
        write!(f, "{name}")
    }
}

impl FromStr for StopWordList {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(StopWordList::None),
            "portuguese" | "pt" => Ok(StopWordList::Portuguese),
            "english" | "en" => Ok(StopWordList::English),
            "spanish" | "es" => Ok(StopWordList::Spanish),
            other => Err(EngineError::validation(format!(
                "unknown stop-word list '{other}'"
            ))),
        }
    }
}

/// Splits text into tokens and drops stop words (exact match).
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stop_words: stop_words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    /// Tokenize a normalized document. Empty input gives an empty vector.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(' ')
            .filter(|token| !token.is_empty())
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }
}
