// Text preprocessing — normalization, tokenization and vocabulary correction.

pub mod normalizer;
pub mod preprocess;
pub mod tokenizer;
pub mod vocabulary;

pub use preprocess::{PipelineConfig, TextPipeline};
