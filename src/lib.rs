// Inkprint: document-type classification by shingle fingerprints
//
// This is the library root. Each module corresponds to a major subsystem:
// text preprocessing, shingling, classification, storage, and the
// application layers (config, pipelines, output) on top of them.

pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod shingling;
pub mod status;
pub mod text;

pub use classifier::{Classifier, ClassifierOptions, ClassifierSet, Score};
pub use error::{EngineError, EngineResult};
