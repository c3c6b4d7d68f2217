//! Analysis engine: scores every candidate against one job description and
//! ranks the results.
//!
//! Run states: `Pending → PerCandidateScoring → Ranked`. Input validation
//! happens before `Pending`; a candidate that fails to score gets the fallback
//! result and never aborts the run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::experience::{experience_score, ExperienceRules};
use crate::analysis::lexical::skill_match_score;
use crate::analysis::normalizer::Normalizer;
use crate::analysis::reasoning::generate_reasoning;
use crate::analysis::semantic::{profile_score, SemanticSimilarity};
use crate::models::analysis::{AnalysisResult, NonFiniteScore, ScoreBreakdown};
use crate::models::candidate::{Candidate, CandidateError, RecordIdentity};

pub const FALLBACK_SCORE: u32 = 50;
pub const FALLBACK_REASONING: &str =
    "Analysis completed with basic scoring due to processing constraints.";

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("{0}")]
    InvalidInput(String),
}

/// Why a single candidate could not be scored. Never leaves the engine.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Candidate(#[from] CandidateError),

    #[error(transparent)]
    Score(#[from] NonFiniteScore),
}

/// Result given to a candidate whose scoring failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    pub score: u32,
    pub reasoning: String,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            score: FALLBACK_SCORE,
            reasoning: FALLBACK_REASONING.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringPolicy {
    pub experience: ExperienceRules,
    pub fallback: FallbackPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Pending,
    PerCandidateScoring,
    Ranked,
}

/// One analysis run. Results are ranked once `state` is [`RunState::Ranked`].
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub state: RunState,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub results: Vec<AnalysisResult>,
}

impl AnalysisRun {
    fn pending(capacity: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: RunState::Pending,
            analyzed_at: None,
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn fallback_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_fallback()).count()
    }
}

/// Holds the read-only language resources; safe to share across threads.
pub struct AnalysisEngine {
    normalizer: Arc<dyn Normalizer>,
    semantic: Arc<dyn SemanticSimilarity>,
    policy: ScoringPolicy,
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("semantic_backend", &self.semantic.backend())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AnalysisEngine {
    pub fn new(
        normalizer: Arc<dyn Normalizer>,
        semantic: Arc<dyn SemanticSimilarity>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            normalizer,
            semantic,
            policy,
        }
    }

    pub fn semantic_backend(&self) -> &'static str {
        self.semantic.backend()
    }

    /// Ranked results, one per input record.
    pub fn analyze(
        &self,
        records: &[Value],
        job_description: &str,
    ) -> Result<Vec<AnalysisResult>, AnalysisError> {
        Ok(self.run(records, job_description)?.results)
    }

    pub fn run(&self, records: &[Value], job_description: &str) -> Result<AnalysisRun, AnalysisError> {
        if records.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "No candidates found in data".to_string(),
            ));
        }
        if job_description.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "Job description is required for analysis".to_string(),
            ));
        }

        let mut run = AnalysisRun::pending(records.len());
        info!(run_id = %run.run_id, "Starting analysis of {} candidates", records.len());

        run.state = RunState::PerCandidateScoring;
        let job_tokens = self.normalizer.tokens(job_description);

        for (index, record) in records.iter().enumerate() {
            let result = match self.score_candidate(record, job_description, &job_tokens) {
                Ok(result) => {
                    debug!(
                        run_id = %run.run_id,
                        "Analyzed candidate {}/{}: {} ({})",
                        index + 1,
                        records.len(),
                        result.name,
                        result.score
                    );
                    result
                }
                Err(e) => {
                    warn!(
                        run_id = %run.run_id,
                        "Error analyzing candidate {}/{}: {e}",
                        index + 1,
                        records.len()
                    );
                    self.fallback_result(record)
                }
            };
            run.results.push(result);
        }

        // stable: equal scores keep input order
        run.results.sort_by(|a, b| b.score.cmp(&a.score));
        run.state = RunState::Ranked;
        run.analyzed_at = Some(Utc::now());

        info!(
            run_id = %run.run_id,
            fallbacks = run.fallback_count(),
            "Analysis complete"
        );
        for (rank, result) in run.results.iter().take(3).enumerate() {
            info!(run_id = %run.run_id, "{}. {} - Score: {}", rank + 1, result.name, result.score);
        }

        Ok(run)
    }

    /// Scores one raw record. `job_tokens` are the normalized job description.
    pub fn score_candidate(
        &self,
        record: &Value,
        job_description: &str,
        job_tokens: &[String],
    ) -> Result<AnalysisResult, ScoringError> {
        let candidate = Candidate::from_record(record)?;

        let skills = skill_match_score(
            self.normalizer.as_ref(),
            candidate.skills_text(),
            job_description,
        );
        let experience = experience_score(
            candidate.total_experience_text(),
            candidate.relevant_experience_text(),
            job_description,
            &self.policy.experience,
        );
        let profile = profile_score(self.semantic.as_ref(), &candidate, job_description);

        let breakdown = ScoreBreakdown::from_components(skills, experience, profile)?;
        let reasoning = generate_reasoning(&candidate, &breakdown, job_tokens);

        Ok(AnalysisResult {
            candidate_id: candidate.candidate_id.clone().unwrap_or(Value::Null),
            name: candidate.display_name(),
            score: breakdown.total,
            skills: candidate.skills_text().to_string(),
            experience: candidate.total_experience_text().to_string(),
            reasoning,
            candidate: record.clone(),
            breakdown: Some(breakdown),
        })
    }

    fn fallback_result(&self, record: &Value) -> AnalysisResult {
        let identity = RecordIdentity::from_record(record);
        AnalysisResult {
            candidate_id: identity.candidate_id,
            name: identity.name,
            score: self.policy.fallback.score,
            skills: identity.skills,
            experience: identity.experience,
            reasoning: self.policy.fallback.reasoning.clone(),
            candidate: record.clone(),
            breakdown: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::EnglishNormalizer;
    use crate::analysis::semantic::{SimilarityError, WordVectorSimilarity};
    use crate::analysis::word_vectors::WordVectors;
    use serde_json::json;

    const JD: &str = "Senior Python developer with Django and PostgreSQL. 3+ years required.";

    struct FixedSimilarity(f64);

    impl SemanticSimilarity for FixedSimilarity {
        fn similarity(&self, _a: &str, _b: &str) -> Result<f64, SimilarityError> {
            Ok(self.0)
        }

        fn backend(&self) -> &'static str {
            "fixed"
        }
    }

    fn engine_with(similarity: f64) -> AnalysisEngine {
        AnalysisEngine::new(
            Arc::new(EnglishNormalizer),
            Arc::new(FixedSimilarity(similarity)),
            ScoringPolicy::default(),
        )
    }

    fn strong() -> Value {
        json!({
            "candidateId": 1,
            "firstName": "Ana",
            "lastName": "Silva",
            "skills": "Python, Django, PostgreSQL",
            "profile": "Backend developer",
            "totalExperience": "6 years",
            "relevantExperience": "5 years",
            "currentCompany": "Acme"
        })
    }

    fn weak() -> Value {
        json!({
            "candidateId": 2,
            "firstName": "Ben",
            "lastName": "Okafor",
            "skills": "Photoshop, Illustrator",
            "profile": "Graphic designer",
            "totalExperience": "1 year",
            "relevantExperience": "0 years"
        })
    }

    #[test]
    fn test_empty_candidate_list_is_invalid_input() {
        let err = engine_with(0.5).analyze(&[], JD).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_job_description_is_invalid_input() {
        let engine = engine_with(0.5);
        assert!(matches!(
            engine.analyze(&[strong()], ""),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.analyze(&[strong()], "  \n "),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_results_ranked_descending() {
        let results = engine_with(0.5).analyze(&[weak(), strong()], JD).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].candidate_id, json!(1));
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_strong_candidate_breakdown() {
        let results = engine_with(1.0).analyze(&[strong()], JD).unwrap();
        let breakdown = results[0].breakdown.unwrap();
        assert!(breakdown.skills > 15.0, "skills was {}", breakdown.skills);
        assert_eq!(breakdown.experience, 35.0);
        assert_eq!(breakdown.profile, 15.0);
        assert_eq!(
            breakdown.total,
            (breakdown.skills + breakdown.experience + breakdown.profile).round_ties_even() as u32
        );
        assert!(results[0].reasoning.starts_with("Ana Silva scored"));
        assert!(results[0].reasoning.contains("Key matching skills: python, django, postgresql."));
    }

    #[test]
    fn test_result_preserves_original_record() {
        let record = strong();
        let results = engine_with(0.5).analyze(&[record.clone()], JD).unwrap();
        assert_eq!(results[0].candidate, record);
        assert_eq!(results[0].skills, "Python, Django, PostgreSQL");
        assert_eq!(results[0].experience, "6 years");
        assert_eq!(results[0].name, "Ana Silva");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let a = json!({ "candidateId": "a" });
        let b = json!({ "candidateId": "b" });
        let c = json!({ "candidateId": "c" });
        let results = engine_with(0.0).analyze(&[a, b, c], JD).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.candidate_id.clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_record_without_text_fields_scores_zero_not_fallback() {
        let results = engine_with(0.9).analyze(&[json!({ "candidateId": 9 })], JD).unwrap();
        let breakdown = results[0].breakdown.expect("scored, not fallback");
        assert_eq!(breakdown.skills, 0.0);
        assert_eq!(breakdown.profile, 0.0);
        assert_eq!(breakdown.experience, 0.0);
        assert_eq!(results[0].score, 0);
    }

    #[test]
    fn test_malformed_record_gets_fallback_and_run_continues() {
        let malformed = json!("not a candidate");
        let wrong_type = json!({ "candidateId": 5, "firstName": "Eve", "totalExperience": 4 });
        let run = engine_with(0.5)
            .run(&[strong(), malformed.clone(), wrong_type, weak()], JD)
            .unwrap();

        assert_eq!(run.results.len(), 4);
        assert_eq!(run.fallback_count(), 2);
        assert_eq!(run.state, RunState::Ranked);
        assert!(run.analyzed_at.is_some());

        let fallback = run
            .results
            .iter()
            .find(|r| r.candidate_id == json!(5))
            .unwrap();
        assert_eq!(fallback.score, FALLBACK_SCORE);
        assert_eq!(fallback.reasoning, FALLBACK_REASONING);
        assert_eq!(fallback.name, "Eve");

        let not_object = run.results.iter().find(|r| r.candidate == malformed).unwrap();
        assert_eq!(not_object.candidate_id, Value::Null);
        assert!(not_object.is_fallback());
    }

    #[test]
    fn test_half_point_total_rounds_to_even() {
        let record = json!({ "totalExperience": "5 years", "relevantExperience": "1 year" });
        let results = engine_with(0.0).analyze(&[record], "Need 5+ years").unwrap();
        let breakdown = results[0].breakdown.unwrap();
        assert_eq!(breakdown.experience, 22.5);
        assert_eq!(breakdown.total, 22);
        assert_eq!(results[0].score, 22);
    }

    #[test]
    fn test_non_string_profile_fields_are_still_scored() {
        let record = json!({
            "firstName": "Ana",
            "profile": 42,
            "skills": "Python",
            "totalExperience": "6 years"
        });
        let results = engine_with(0.5).analyze(&[record], JD).unwrap();
        assert!(!results[0].is_fallback());
        assert_eq!(results[0].breakdown.unwrap().profile, 7.5);
        assert!(results[0].reasoning.starts_with("Ana scored"));
    }

    #[test]
    fn test_non_string_skills_gets_fallback() {
        let record = json!({ "candidateId": 8, "firstName": "Ana", "skills": 12 });
        let results = engine_with(0.5).analyze(&[record], JD).unwrap();
        assert!(results[0].is_fallback());
        assert_eq!(results[0].score, FALLBACK_SCORE);
        assert_eq!(results[0].name, "Ana");
    }

    #[test]
    fn test_fallback_policy_is_overridable() {
        let engine = AnalysisEngine::new(
            Arc::new(EnglishNormalizer),
            Arc::new(FixedSimilarity(0.5)),
            ScoringPolicy {
                fallback: FallbackPolicy {
                    score: 10,
                    reasoning: "manual review".to_string(),
                },
                ..Default::default()
            },
        );
        let results = engine.analyze(&[json!(null)], JD).unwrap();
        assert_eq!(results[0].score, 10);
        assert_eq!(results[0].reasoning, "manual review");
    }

    #[test]
    fn test_non_finite_similarity_fails_soft_to_zero() {
        let results = engine_with(f64::NAN).analyze(&[strong()], JD).unwrap();
        assert_eq!(results[0].breakdown.unwrap().profile, 0.0);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let engine = AnalysisEngine::new(
            Arc::new(EnglishNormalizer),
            Arc::new(WordVectorSimilarity::new(Arc::new(
                WordVectors::hashed(48).unwrap(),
            ))),
            ScoringPolicy::default(),
        );
        let records = vec![weak(), strong(), json!({ "candidateId": 3 })];
        let first = engine.analyze(&records, JD).unwrap();
        let second = engine.analyze(&records, JD).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scores_always_within_bounds() {
        let engine = engine_with(1.0);
        let records = vec![strong(), weak(), json!({}), json!({ "skills": "the and of" })];
        for result in engine.analyze(&records, JD).unwrap() {
            assert!(result.score <= 100);
            if let Some(b) = result.breakdown {
                assert!((0.0..=50.0).contains(&b.skills));
                assert!((0.0..=35.0).contains(&b.experience));
                assert!((0.0..=15.0).contains(&b.profile));
            }
        }
    }
}
