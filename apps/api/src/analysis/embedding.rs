//! Pretrained sentence embeddings for profile similarity, backed by fastembed.
//!
//! Only compiled with the `pretrained-embeddings` feature. The model files are
//! downloaded on first use into `EMBEDDING_CACHE_DIR` (or fastembed's default).

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use crate::analysis::lexical::cosine_similarity;
use crate::analysis::semantic::{SemanticSimilarity, SimilarityError};

pub struct FastEmbedSimilarity {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedSimilarity {
    /// Loads all-MiniLM-L6-v2, downloading it if the cache is cold.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, SimilarityError> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model =
            TextEmbedding::try_new(options).map_err(|e| SimilarityError::Embedding(e.to_string()))?;
        info!("Loaded sentence-embedding model all-MiniLM-L6-v2");

        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl SemanticSimilarity for FastEmbedSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        if a.trim().is_empty() {
            return Err(SimilarityError::NoVectors("first"));
        }
        if b.trim().is_empty() {
            return Err(SimilarityError::NoVectors("second"));
        }

        let embeddings = {
            let model = self
                .model
                .lock()
                .map_err(|_| SimilarityError::Embedding("model lock poisoned".to_string()))?;
            model
                .embed(vec![a, b], None)
                .map_err(|e| SimilarityError::Embedding(e.to_string()))?
        };

        match embeddings.as_slice() {
            [first, second] => {
                let first: Vec<f64> = first.iter().map(|&x| f64::from(x)).collect();
                let second: Vec<f64> = second.iter().map(|&x| f64::from(x)).collect();
                Ok(cosine_similarity(&first, &second))
            }
            other => Err(SimilarityError::Embedding(format!(
                "expected 2 embeddings, got {}",
                other.len()
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "fastembed/all-MiniLM-L6-v2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Downloads roughly 90 MB of model files.
    #[test]
    #[ignore]
    fn test_related_profiles_score_higher() {
        let similarity = FastEmbedSimilarity::new(None).unwrap();
        let job = "Backend engineer building REST services in Rust";
        let close = similarity
            .similarity("Server-side developer writing Rust web APIs", job)
            .unwrap();
        let far = similarity
            .similarity("Pastry chef specialising in laminated doughs", job)
            .unwrap();
        assert!(close > far, "{close} <= {far}");
    }

    #[test]
    #[ignore]
    fn test_blank_text_has_no_vectors() {
        let similarity = FastEmbedSimilarity::new(None).unwrap();
        assert_eq!(
            similarity.similarity("  ", "rust"),
            Err(SimilarityError::NoVectors("first"))
        );
    }
}
