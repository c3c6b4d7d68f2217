use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const SKILLS_CAP: f64 = 50.0;
pub const EXPERIENCE_CAP: f64 = 35.0;
pub const PROFILE_CAP: f64 = 15.0;

#[derive(Debug, Error, PartialEq)]
#[error("{component} score is not a finite number")]
pub struct NonFiniteScore {
    pub component: &'static str,
}

/// Per-candidate score components. Each is clamped to its cap; `total` is the
/// sum rounded half to even and therefore lies in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub experience: f64,
    pub profile: f64,
    pub total: u32,
}

impl ScoreBreakdown {
    pub fn from_components(
        skills: f64,
        experience: f64,
        profile: f64,
    ) -> Result<Self, NonFiniteScore> {
        let skills = bounded("skills", skills, SKILLS_CAP)?;
        let experience = bounded("experience", experience, EXPERIENCE_CAP)?;
        let profile = bounded("profile", profile, PROFILE_CAP)?;
        let total = (skills + experience + profile).round_ties_even() as u32;
        Ok(Self {
            skills,
            experience,
            profile,
            total,
        })
    }
}

fn bounded(component: &'static str, value: f64, cap: f64) -> Result<f64, NonFiniteScore> {
    if !value.is_finite() {
        return Err(NonFiniteScore { component });
    }
    Ok(value.clamp(0.0, cap))
}

/// One ranked entry of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub candidate_id: Value,
    pub name: String,
    pub score: u32,
    pub skills: String,
    pub experience: String,
    pub reasoning: String,
    pub candidate: Value,
    /// Absent for fallback results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        self.breakdown.is_none()
    }
}
