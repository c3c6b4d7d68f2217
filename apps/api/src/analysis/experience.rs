//! Experience extraction and tiered scoring against the job's required years.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:years?|yrs?)").expect("years pattern is a valid regex")
});

static REQUIRED_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\+?\s*(?:years?|yrs?)").expect("required pattern is a valid regex")
});

/// Point values and thresholds for experience scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceRules {
    /// Used when the job description names no year count.
    pub default_required_years: f64,
    /// Awarded when total experience meets the requirement.
    pub meets_requirement_points: f64,
    /// Total above `required × exceeds_multiplier` earns the bonus.
    pub exceeds_multiplier: f64,
    pub exceeds_bonus_points: f64,
    /// Scaled by `total / required` when the requirement is not met.
    pub shortfall_points: f64,
    /// Relevant experience at or above `required × relevant_ratio` earns full points.
    pub relevant_ratio: f64,
    pub relevant_points: f64,
    pub relevant_shortfall_points: f64,
    pub cap: f64,
}

impl Default for ExperienceRules {
    fn default() -> Self {
        Self {
            default_required_years: 3.0,
            meets_requirement_points: 20.0,
            exceeds_multiplier: 1.5,
            exceeds_bonus_points: 10.0,
            shortfall_points: 15.0,
            relevant_ratio: 0.8,
            relevant_points: 15.0,
            relevant_shortfall_points: 10.0,
            cap: 35.0,
        }
    }
}

/// First "N years" / "N.N yrs" figure in `text`, or 0.
pub fn extract_years_experience(text: &str) -> f64 {
    find_years_experience(text).unwrap_or(0.0)
}

/// First "N years" mention, or `None` when the text states no figure.
pub fn find_years_experience(text: &str) -> Option<f64> {
    YEARS
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Whole-year requirement stated in the job description ("3+ years").
pub fn required_years(job_description: &str, rules: &ExperienceRules) -> f64 {
    REQUIRED_YEARS
        .captures(job_description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(rules.default_required_years)
}

/// Experience component in [0, cap].
///
/// A zero requirement never divides: both `>=` branches are taken for any
/// non-negative experience.
pub fn score_experience(total: f64, relevant: f64, required: f64, rules: &ExperienceRules) -> f64 {
    let mut score = 0.0;

    if total >= required {
        score += rules.meets_requirement_points;
        if total > required * rules.exceeds_multiplier {
            score += rules.exceeds_bonus_points;
        }
    } else {
        score += (total / required) * rules.shortfall_points;
    }

    let relevant_threshold = required * rules.relevant_ratio;
    if relevant >= relevant_threshold {
        score += rules.relevant_points;
    } else {
        score += (relevant / relevant_threshold) * rules.relevant_shortfall_points;
    }

    score.min(rules.cap)
}

/// Convenience over the raw experience strings of a candidate.
pub fn experience_score(
    total_experience: &str,
    relevant_experience: &str,
    job_description: &str,
    rules: &ExperienceRules,
) -> f64 {
    let total = extract_years_experience(total_experience);
    let relevant = extract_years_experience(relevant_experience);
    let required = required_years(job_description, rules);
    score_experience(total, relevant, required, rules)
}
