// Shingle fingerprinting — n-gram windows, per-document shinglings and
// Jaccard overlap between them.

pub mod fingerprint;
pub mod overlap;
pub mod shingle;

pub use fingerprint::Shingling;
pub use overlap::jaccard_similarity;
pub use shingle::{Shingle, ShingleHash};
