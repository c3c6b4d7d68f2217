//! Semantic profile scoring: document similarity from averaged word vectors.

use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::analysis::lexical::cosine_similarity;
use crate::analysis::word_vectors::WordVectors;
use crate::models::analysis::PROFILE_CAP;
use crate::models::candidate::Candidate;

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Alphabetic}+").expect("word pattern is a valid regex"));

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimilarityError {
    #[error("{0} document has no in-vocabulary tokens")]
    NoVectors(&'static str),

    #[error("embedding model error: {0}")]
    Embedding(String),
}

/// Which resource backs profile similarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SemanticBackend {
    /// Averaged word vectors from `WORD_VECTORS_PATH`, or hashed sub-word vectors.
    #[default]
    WordVectors,
    /// Pretrained sentence embeddings via fastembed.
    FastEmbed,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown semantic backend '{0}'; expected 'word-vectors' or 'fastembed'")]
pub struct UnknownBackend(String);

impl FromStr for SemanticBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word-vectors" | "word_vectors" | "glove" => Ok(Self::WordVectors),
            "fastembed" => Ok(Self::FastEmbed),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

/// Capability: semantic similarity of two raw texts, in [0, 1].
pub trait SemanticSimilarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError>;

    fn backend(&self) -> &'static str;
}

/// Cosine of mean word vectors. Negative cosines clamp to zero.
#[derive(Debug, Clone)]
pub struct WordVectorSimilarity {
    vectors: Arc<WordVectors>,
}

impl WordVectorSimilarity {
    pub fn new(vectors: Arc<WordVectors>) -> Self {
        Self { vectors }
    }

    fn document_vector(&self, text: &str) -> Option<Vec<f64>> {
        let mut sum = vec![0.0_f64; self.vectors.dim()];
        let mut count = 0usize;

        for word in WORD.find_iter(text) {
            let token = word.as_str().to_lowercase();
            if let Some(vector) = self.vectors.vector(&token) {
                for (acc, v) in sum.iter_mut().zip(vector.iter()) {
                    *acc += f64::from(*v);
                }
                count += 1;
            }
        }

        if count == 0 {
            return None;
        }
        sum.iter_mut().for_each(|v| *v /= count as f64);
        Some(sum)
    }
}

impl SemanticSimilarity for WordVectorSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        let va = self
            .document_vector(a)
            .ok_or(SimilarityError::NoVectors("first"))?;
        let vb = self
            .document_vector(b)
            .ok_or(SimilarityError::NoVectors("second"))?;
        Ok(cosine_similarity(&va, &vb))
    }

    fn backend(&self) -> &'static str {
        if self.vectors.is_hashed() {
            "hashed-word-vectors"
        } else {
            "word-vectors"
        }
    }
}

/// Profile component in [0, 15]. Similarity failures score zero.
pub fn profile_score(
    semantic: &dyn SemanticSimilarity,
    candidate: &Candidate,
    job_description: &str,
) -> f64 {
    let profile = candidate.profile_text();
    if profile.trim().is_empty() {
        return 0.0;
    }

    match semantic.similarity(&profile, job_description) {
        Ok(similarity) if similarity.is_finite() => {
            (similarity.clamp(0.0, 1.0) * PROFILE_CAP).min(PROFILE_CAP)
        }
        Ok(similarity) => {
            tracing::debug!("profile similarity was {similarity}, scoring zero");
            0.0
        }
        Err(e) => {
            tracing::debug!("profile similarity failed, scoring zero: {e}");
            0.0
        }
    }
}
