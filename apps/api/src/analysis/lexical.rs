//! Lexical skill similarity: a request-scoped TF-IDF model over unigrams and
//! bigrams, compared with cosine similarity.
//!
//! A fresh [`TfidfModel`] is fitted for every comparison so no vocabulary leaks
//! between candidates.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::analysis::normalizer::Normalizer;
use crate::analysis::stopwords::is_stop_word;
use crate::models::analysis::SKILLS_CAP;

/// Vocabulary cap, most frequent features first.
pub const MAX_FEATURES: usize = 1000;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

#[derive(Debug, Error, PartialEq)]
pub enum VectorizeError {
    #[error("empty vocabulary; documents contain only stop words")]
    EmptyVocabulary,

    #[error("document index {0} out of range")]
    MissingDocument(usize),
}

/// TF-IDF weights for a small document set.
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: BTreeMap<String, usize>,
    /// L2-normalized rows, one per fitted document.
    rows: Vec<Vec<f64>>,
}

impl TfidfModel {
    /// Fits vocabulary and idf on `documents` and transforms them in one pass.
    pub fn fit(documents: &[&str]) -> Result<Self, VectorizeError> {
        let counts: Vec<HashMap<String, usize>> =
            documents.iter().map(|doc| count_features(doc)).collect();

        let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for doc in &counts {
            for (feature, count) in doc {
                *corpus_counts.entry(feature.as_str()).or_default() += count;
                *document_frequency.entry(feature.as_str()).or_default() += 1;
            }
        }

        if corpus_counts.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let mut ranked: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(MAX_FEATURES);

        let mut selected: Vec<&str> = ranked.into_iter().map(|(feature, _)| feature).collect();
        selected.sort_unstable();
        let vocabulary: BTreeMap<String, usize> = selected
            .iter()
            .enumerate()
            .map(|(index, feature)| (feature.to_string(), index))
            .collect();

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = selected
            .iter()
            .map(|feature| {
                let df = document_frequency.get(feature).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = counts
            .iter()
            .map(|doc| {
                let mut row = vec![0.0; vocabulary.len()];
                for (feature, count) in doc {
                    if let Some(&index) = vocabulary.get(feature) {
                        row[index] = *count as f64 * idf[index];
                    }
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(Self { vocabulary, rows })
    }

    #[cfg(test)]
    fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Cosine similarity of two fitted documents, in [0, 1].
    pub fn cosine(&self, a: usize, b: usize) -> Result<f64, VectorizeError> {
        let row_a = self.rows.get(a).ok_or(VectorizeError::MissingDocument(a))?;
        let row_b = self.rows.get(b).ok_or(VectorizeError::MissingDocument(b))?;
        Ok(cosine_similarity(row_a, row_b))
    }
}

/// Unigram and bigram counts after stopword removal.
fn count_features(document: &str) -> HashMap<String, usize> {
    let lowered = document.to_lowercase();
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .collect();

    let mut counts = HashMap::new();
    for token in &tokens {
        *counts.entry((*token).to_string()).or_default() += 1;
    }
    for pair in tokens.windows(2) {
        *counts.entry(format!("{} {}", pair[0], pair[1])).or_default() += 1;
    }
    counts
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        row.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Cosine of two vectors, clamped to [0, 1]. Zero when either is all zeros.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Similarity of two already-normalized texts.
pub fn lexical_similarity(skills: &str, job_description: &str) -> Result<f64, VectorizeError> {
    let model = TfidfModel::fit(&[skills, job_description])?;
    model.cosine(0, 1)
}

/// Skills component in [0, 50]. Vectorizer failures score zero.
pub fn skill_match_score(
    normalizer: &dyn Normalizer,
    candidate_skills: &str,
    job_description: &str,
) -> f64 {
    let skills = normalizer.normalize(candidate_skills);
    let job = normalizer.normalize(job_description);
    if skills.is_empty() || job.is_empty() {
        return 0.0;
    }

    match lexical_similarity(&skills, &job) {
        Ok(similarity) => (similarity * SKILLS_CAP).min(SKILLS_CAP),
        Err(e) => {
            tracing::debug!("skills similarity failed, scoring zero: {e}");
            0.0
        }
    }
}
