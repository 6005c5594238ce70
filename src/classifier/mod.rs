// Classification — TF-IDF-compressed shingle models and ensembles of them.

pub mod builder;
pub mod codec;
pub mod model;
pub mod options;
pub mod set;

pub use builder::ModelBuilder;
pub use model::Classifier;
pub use options::ClassifierOptions;
pub use set::{ClassifierSet, Score, DEFAULT_SCORE_EXPONENT};
