use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::analysis::experience::ExperienceRules;
use crate::analysis::{
    AnalysisEngine, EnglishNormalizer, FallbackPolicy, ScoringPolicy, SemanticBackend,
    SemanticSimilarity, WordVectorSimilarity, WordVectors,
};
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Read-only scoring engine shared by concurrent requests.
    pub engine: Arc<AnalysisEngine>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        let engine = Arc::new(build_engine(&config)?);
        Ok(Self { config, engine })
    }
}

/// Loads the language resources once and wires them into an engine.
pub fn build_engine(config: &Config) -> Result<AnalysisEngine> {
    let semantic: Arc<dyn SemanticSimilarity> = match config.semantic_backend {
        SemanticBackend::WordVectors => {
            Arc::new(WordVectorSimilarity::new(Arc::new(load_word_vectors(config)?)))
        }
        SemanticBackend::FastEmbed => fastembed_similarity(config)?,
    };

    let policy = ScoringPolicy {
        experience: ExperienceRules {
            default_required_years: config.default_required_years,
            ..Default::default()
        },
        fallback: FallbackPolicy {
            score: config.fallback_score,
            ..Default::default()
        },
    };

    Ok(AnalysisEngine::new(
        Arc::new(EnglishNormalizer),
        semantic,
        policy,
    ))
}

fn load_word_vectors(config: &Config) -> Result<WordVectors> {
    match &config.word_vectors_path {
        Some(path) => WordVectors::load(path)
            .with_context(|| format!("Failed to load word vectors from {}", path.display())),
        None => {
            warn!(
                dims = config.word_vectors_dim,
                "WORD_VECTORS_PATH not set; profile similarity falls back to hashed sub-word \
                 vectors, which match spelling rather than meaning. Point WORD_VECTORS_PATH at \
                 a GloVe text file (e.g. glove.6B.100d.txt) or set SEMANTIC_BACKEND=fastembed"
            );
            WordVectors::hashed(config.word_vectors_dim).context("Invalid WORD_VECTORS_DIM")
        }
    }
}

#[cfg(feature = "pretrained-embeddings")]
fn fastembed_similarity(config: &Config) -> Result<Arc<dyn SemanticSimilarity>> {
    let similarity =
        crate::analysis::embedding::FastEmbedSimilarity::new(config.embedding_cache_dir.clone())
            .context("Failed to load the sentence-embedding model")?;
    Ok(Arc::new(similarity))
}

#[cfg(not(feature = "pretrained-embeddings"))]
fn fastembed_similarity(_config: &Config) -> Result<Arc<dyn SemanticSimilarity>> {
    anyhow::bail!(
        "SEMANTIC_BACKEND=fastembed needs a build with `--features pretrained-embeddings`"
    )
}
