// Data models — Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::Classifier;

/// Format used for timestamps stored in and read from the database.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A classifier's listing row — everything except the model itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSummary {
    pub id: Uuid,
    pub name: String,
    pub multiplicity: usize,
    /// Fingerprints retained after TF-IDF compression
    pub model_size: usize,
    /// Distinct fingerprints seen across the training corpus
    pub vocabulary_size: usize,
    pub training_texts: u32,
    pub trained_at: String,
}

impl From<&Classifier> for ClassifierSummary {
    fn from(c: &Classifier) -> Self {
        Self {
            id: c.id(),
            name: c.name().to_string(),
            multiplicity: c.multiplicity(),
            model_size: c.model_size(),
            vocabulary_size: c.vocabulary_size(),
            training_texts: c.training_texts(),
            trained_at: c.trained_at().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
