// Shingling — the fingerprint of one document.
//
// A w-shingling is the set of unique contiguous n-token windows of a
// document. Alongside the unique shingles (kept in first-seen order) it
// tracks how many times each one occurred. Every shingle in a Shingling has
// the same multiplicity; inserting one that does not is a validation error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::shingle::{Shingle, ShingleHash};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ShinglingRecord", into = "ShinglingRecord")]
pub struct Shingling {
    multiplicity: usize,
    /// Canonical shingle per hash, in order of first insertion
    shingles: Vec<Shingle>,
    /// Occurrence count, parallel to `shingles`
    counts: Vec<u32>,
    /// Hash -> position in `shingles`
    index: HashMap<ShingleHash, usize>,
}

impl Shingling {
    /// An empty shingling that will accept shingles of the given multiplicity.
    pub fn empty(multiplicity: usize) -> EngineResult<Self> {
        if multiplicity == 0 {
            return Err(EngineError::validation("multiplicity must be at least 1"));
        }
        Ok(Self {
            multiplicity,
            shingles: Vec::new(),
            counts: Vec::new(),
            index: HashMap::new(),
        })
    }

    /// Slide an n-token window over `tokens`, producing L - n + 1 shingles.
    pub fn from_tokens(tokens: &[String], multiplicity: usize) -> EngineResult<Self> {
        let mut shingling = Self::empty(multiplicity)?;
        if tokens.len() < multiplicity {
            return Err(EngineError::validation(format!(
                "insufficient tokens for multiplicity: {} token(s), multiplicity {}",
                tokens.len(),
                multiplicity
            )));
        }

        for window in tokens.windows(multiplicity) {
            shingling.insert(Shingle::new(window.to_vec())?)?;
        }
        Ok(shingling)
    }

    /// Build a shingling by inserting the given shingles in order.
    pub fn from_shingles<I>(multiplicity: usize, shingles: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = Shingle>,
    {
        let mut shingling = Self::empty(multiplicity)?;
        for shingle in shingles {
            shingling.insert(shingle)?;
        }
        Ok(shingling)
    }

    /// Insert one occurrence of a shingle.
    pub fn insert(&mut self, shingle: Shingle) -> EngineResult<()> {
        self.insert_counted(shingle, 1)
    }

    /// Insert `count` occurrences of a shingle. The first instance seen for a
    /// hash stays canonical; later ones only bump the counter.
    pub fn insert_counted(&mut self, shingle: Shingle, count: u32) -> EngineResult<()> {
        if shingle.multiplicity() != self.multiplicity {
            return Err(EngineError::validation(format!(
                "shingle multiplicity {} does not match shingling multiplicity {}",
                shingle.multiplicity(),
                self.multiplicity
            )));
        }

        match self.index.get(&shingle.hash()) {
            Some(&pos) => {
                self.counts[pos] = self.counts[pos].saturating_add(count);
            }
            None => {
                self.index.insert(shingle.hash(), self.shingles.len());
                self.shingles.push(shingle);
                self.counts.push(count);
            }
        }
        Ok(())
    }

    pub fn multiplicity(&self) -> usize {
        self.multiplicity
    }

    /// Number of unique shingles.
    pub fn len(&self) -> usize {
        self.shingles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shingles.is_empty()
    }

    pub fn shingles(&self) -> &[Shingle] {
        &self.shingles
    }

    pub fn contains(&self, hash: &ShingleHash) -> bool {
        self.index.contains_key(hash)
    }

    pub fn get(&self, hash: &ShingleHash) -> Option<&Shingle> {
        self.index.get(hash).map(|&pos| &self.shingles[pos])
    }

    /// How many times a shingle was inserted.
    pub fn count(&self, hash: &ShingleHash) -> Option<u32> {
        self.index.get(hash).map(|&pos| self.counts[pos])
    }

    /// Total occurrences across all shingles.
    pub fn total_occurrences(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Unique shingles with their occurrence counts, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Shingle, u32)> {
        self.shingles.iter().zip(self.counts.iter().copied())
    }
}

/// Wire form of a Shingling. The hash index is rebuilt on the way in, which
/// also re-validates every invariant.
#[derive(Serialize, Deserialize)]
struct ShinglingRecord {
    multiplicity: usize,
    shingles: Vec<Shingle>,
    counts: Vec<u32>,
}

impl From<Shingling> for ShinglingRecord {
    fn from(s: Shingling) -> Self {
        Self {
            multiplicity: s.multiplicity,
            shingles: s.shingles,
            counts: s.counts,
        }
    }
}

impl TryFrom<ShinglingRecord> for Shingling {
    type Error = EngineError;

    fn try_from(record: ShinglingRecord) -> Result<Self, Self::Error> {
        if record.shingles.len() != record.counts.len() {
            return Err(EngineError::validation(format!(
                "shingling has {} shingles but {} counts",
                record.shingles.len(),
                record.counts.len()
            )));
        }

        let mut shingling = Shingling::empty(record.multiplicity)?;
        for (shingle, count) in record.shingles.into_iter().zip(record.counts) {
            if shingling.contains(&shingle.hash()) {
                return Err(EngineError::validation("shingling contains a duplicate shingle"));
            }
            shingling.insert_counted(shingle, count)?;
        }
        Ok(shingling)
    }
}
