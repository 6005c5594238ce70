// A single shingle: a window of n consecutive tokens plus its content hash.
//
// The hash is SHA-256 over the tokens joined by a single space. Tokens never
// contain spaces (the tokenizer splits on them), so the joined form is
// unambiguous. Hashes are always computed from the tokens, including when a
// shingle is deserialized; a stored hash is never trusted.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EngineError, EngineResult};

/// Identity key of a shingle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShingleHash([u8; 32]);

impl ShingleHash {
    pub fn of(tokens: &[String]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tokens.join(" ").as_bytes());
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ShingleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ShingleHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first 8 bytes are plenty to tell shingles apart in logs
        write!(f, "ShingleHash({})", &self.to_hex()[..16])
    }
}

/// An ordered window of tokens. Its multiplicity is its token count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Shingle {
    tokens: Vec<String>,
    hash: ShingleHash,
}

impl Shingle {
    pub fn new(tokens: Vec<String>) -> EngineResult<Self> {
        if tokens.is_empty() {
            return Err(EngineError::validation("a shingle needs at least one token"));
        }
        let hash = ShingleHash::of(&tokens);
        Ok(Self { tokens, hash })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn hash(&self) -> ShingleHash {
        self.hash
    }

    pub fn multiplicity(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens joined back into text, for display.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

impl TryFrom<Vec<String>> for Shingle {
    type Error = EngineError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Shingle::new(tokens)
    }
}

impl From<Shingle> for Vec<String> {
    fn from(shingle: Shingle) -> Self {
        shingle.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_hash_depends_on_content_and_order() {
        let a = Shingle::new(tokens(&["valor", "total"])).unwrap();
        let b = Shingle::new(tokens(&["valor", "total"])).unwrap();
        let c = Shingle::new(tokens(&["total", "valor"])).unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn test_multiplicity_is_token_count() {
        let s = Shingle::new(tokens(&["a", "b", "c"])).unwrap();
        assert_eq!(s.multiplicity(), 3);
        assert_eq!(s.text(), "a b c");
    }

    #[test]
    fn test_empty_shingle_rejected() {
        assert!(matches!(
            Shingle::new(Vec::new()),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_hex_is_sha256_of_joined_tokens() {
        let s = Shingle::new(tokens(&["abc"])).unwrap();
        assert_eq!(
            s.hash().to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
