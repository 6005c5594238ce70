// Text normalization — the first stage of the preprocessing chain.
//
// OCR output is noisy: mixed case, accented and unaccented spellings of the
// same word, stray symbols, irregular spacing. The normalizer folds all of
// that into a canonical form so the same receipt scanned twice produces the
// same tokens. The steps run in a fixed order; reordering them changes the
// output (e.g. lower-casing before stripping accents would leave some
// uppercase-only composed characters behind).

use std::fmt;
use std::str::FromStr;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::{EngineError, EngineResult};

/// Punctuation kept by default — the characters that carry meaning on a
/// receipt (prices, dates, document numbers).
pub const DEFAULT_PUNCTUATION: &str = ".,/-$";

/// What to do with line breaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakPolicy {
    /// Keep every line break as a standalone `\n` token, so line structure
    /// becomes part of the fingerprint.
    #[default]
    Isolate,
    /// Fold line breaks into ordinary spaces.
    Collapse,
}

impl fmt::Display for LineBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineBreakPolicy::Isolate => write!(f, "isolate"),
            LineBreakPolicy::Collapse => write!(f, "collapse"),
        }
    }
}

impl FromStr for LineBreakPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "isolate" => Ok(LineBreakPolicy::Isolate),
            "collapse" => Ok(LineBreakPolicy::Collapse),
            other => Err(EngineError::validation(format!(
                "unknown line break policy '{other}' (expected 'isolate' or 'collapse')"
            ))),
        }
    }
}

/// The ordered normalization chain:
///
/// 1. strip diacritics
/// 2. isolate or collapse line breaks
/// 3. lower-case
/// 4. replace runs of characters outside the allow-list with a space
/// 5. collapse runs of horizontal whitespace to one space
#[derive(Debug, Clone)]
pub struct Normalizer {
    line_breaks: LineBreakPolicy,
    disallowed: Regex,
    horizontal_whitespace: Regex,
}

impl Normalizer {
    /// Build a normalizer that keeps letters, digits, whitespace and the
    /// given punctuation characters.
    pub fn new(line_breaks: LineBreakPolicy, punctuation: &str) -> EngineResult<Self> {
        let pattern = format!(r"[^a-z0-9\s{}]+", punctuation_class(punctuation));
        let disallowed = Regex::new(&pattern).map_err(|e| {
            EngineError::validation(format!("invalid punctuation allow-list: {e}"))
        })?;
        let horizontal_whitespace = Regex::new(r"[^\S\n]+")
            .map_err(|e| EngineError::validation(format!("invalid whitespace pattern: {e}")))?;

        Ok(Self {
            line_breaks,
            disallowed,
            horizontal_whitespace,
        })
    }

    pub fn line_breaks(&self) -> LineBreakPolicy {
        self.line_breaks
    }

    /// Run the full chain over a document.
    pub fn normalize(&self, text: &str) -> String {
        let text = strip_diacritics(text);
        let text = self.apply_line_breaks(&text);
        let text = text.to_lowercase();
        let text = self.disallowed.replace_all(&text, " ");
        self.horizontal_whitespace
            .replace_all(&text, " ")
            .into_owned()
    }

    fn apply_line_breaks(&self, text: &str) -> String {
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");
        match self.line_breaks {
            LineBreakPolicy::Isolate => unified.replace('\n', " \n "),
            LineBreakPolicy::Collapse => unified.replace('\n', " "),
        }
    }
}

/// Remove accents: decompose, drop combining marks, recompose.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect()
}

/// Render the punctuation allow-list as the inside of a character class.
///
/// A `-` is moved to the end of the class, where it is always literal.
/// Letters, digits and whitespace are already allowed and are skipped.
fn punctuation_class(punctuation: &str) -> String {
    let mut class = String::new();
    let mut has_dash = false;
    for c in punctuation.chars() {
        if c == '-' {
            has_dash = true;
        } else if !c.is_alphanumeric() && !c.is_whitespace() {
            class.push_str(&regex_lite::escape(&c.to_string()));
        }
    }
    if has_dash {
        class.push('-');
    }
    class
}
