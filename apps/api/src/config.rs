use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::engine::FALLBACK_SCORE;
use crate::analysis::semantic::SemanticBackend;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub semantic_backend: SemanticBackend,
    pub word_vectors_path: Option<PathBuf>,
    pub word_vectors_dim: usize,
    /// Where fastembed caches downloaded model files.
    pub embedding_cache_dir: Option<PathBuf>,
    pub default_required_years: f64,
    pub fallback_score: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let fallback_score: u32 = parse_env("FALLBACK_SCORE", FALLBACK_SCORE)?;
        anyhow::ensure!(fallback_score <= 100, "FALLBACK_SCORE must be between 0 and 100");

        let default_required_years: f64 = parse_env("DEFAULT_REQUIRED_YEARS", 3.0)?;
        anyhow::ensure!(
            default_required_years > 0.0,
            "DEFAULT_REQUIRED_YEARS must be greater than zero"
        );

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 5000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            semantic_backend: parse_env("SEMANTIC_BACKEND", SemanticBackend::default())?,
            word_vectors_path: env_path("WORD_VECTORS_PATH"),
            word_vectors_dim: parse_env(
                "WORD_VECTORS_DIM",
                crate::analysis::word_vectors::DEFAULT_HASHED_DIM,
            )?,
            embedding_cache_dir: env_path("EMBEDDING_CACHE_DIR"),
            default_required_years,
            fallback_score,
        })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("SHORTLIST_TEST_UNSET_PORT", 5000).unwrap();
        assert_eq!(port, 5000);
    }

    #[test]
    fn test_parse_env_reads_value() {
        std::env::set_var("SHORTLIST_TEST_DIM", " 128 ");
        let dim: usize = parse_env("SHORTLIST_TEST_DIM", 96).unwrap();
        assert_eq!(dim, 128);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("SHORTLIST_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("SHORTLIST_TEST_BAD_PORT", 5000).unwrap_err();
        assert!(err.to_string().contains("SHORTLIST_TEST_BAD_PORT"));
    }

    #[test]
    fn test_parse_env_reads_semantic_backend() {
        std::env::set_var("SHORTLIST_TEST_BACKEND", "fastembed");
        let backend = parse_env("SHORTLIST_TEST_BACKEND", SemanticBackend::default()).unwrap();
        assert_eq!(backend, SemanticBackend::FastEmbed);

        std::env::set_var("SHORTLIST_TEST_BAD_BACKEND", "bert");
        let err = parse_env("SHORTLIST_TEST_BAD_BACKEND", SemanticBackend::default()).unwrap_err();
        assert!(err.to_string().contains("SHORTLIST_TEST_BAD_BACKEND"));
    }
}
