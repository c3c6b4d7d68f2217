// Candidate scoring engine.
// Normalizer → {lexical, semantic} → experience → aggregate → reasoning → rank.
// Everything here is synchronous; HTTP handlers call it from spawn_blocking.

#[cfg(feature = "pretrained-embeddings")]
pub mod embedding;
pub mod engine;
pub mod experience;
pub mod lexical;
pub mod normalizer;
pub mod reasoning;
pub mod semantic;
pub mod stopwords;
pub mod word_vectors;

pub use engine::{AnalysisEngine, AnalysisError, FallbackPolicy, ScoringPolicy};
pub use normalizer::EnglishNormalizer;
pub use semantic::{SemanticBackend, SemanticSimilarity, WordVectorSimilarity};
pub use word_vectors::WordVectors;
