//! Human-readable rationale for a candidate's score.

use crate::analysis::experience::find_years_experience;
use crate::models::analysis::ScoreBreakdown;
use crate::models::candidate::Candidate;

const MAX_MATCHING_SKILLS: usize = 3;

/// Candidate skills (comma-separated, lower-cased) that contain any normalized
/// job-description token, in the candidate's own order.
pub fn matching_skills(skills: &str, job_tokens: &[String]) -> Vec<String> {
    skills
        .split(',')
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| job_tokens.iter().any(|token| skill.contains(token.as_str())))
        .take(MAX_MATCHING_SKILLS)
        .collect()
}

/// Builds the explanation from the breakdown. `job_tokens` are the normalized
/// job-description tokens, computed once per run.
pub fn generate_reasoning(
    candidate: &Candidate,
    breakdown: &ScoreBreakdown,
    job_tokens: &[String],
) -> String {
    let matches = matching_skills(candidate.skills_text(), job_tokens);

    let name = candidate.display_name();
    let mut reasoning = format!("{name} scored {}/100. ", breakdown.total);

    let skills = breakdown.skills;
    if skills > 30.0 {
        reasoning.push_str(&format!("Excellent skill alignment ({skills:.1}/50). "));
    } else if skills > 15.0 {
        reasoning.push_str(&format!("Good skill match ({skills:.1}/50). "));
    } else {
        reasoning.push_str(&format!("Limited skill overlap ({skills:.1}/50). "));
    }

    if !matches.is_empty() {
        reasoning.push_str(&format!("Key matching skills: {}. ", matches.join(", ")));
    }

    let years = match find_years_experience(candidate.total_experience_text()) {
        Some(years) => format_years(years),
        None => "0".to_string(),
    };
    if breakdown.experience > 25.0 {
        reasoning.push_str(&format!("Strong experience profile ({years} years total). "));
    } else if breakdown.experience > 15.0 {
        reasoning.push_str(&format!("Adequate experience level ({years} years total). "));
    } else {
        reasoning.push_str(&format!("Developing experience ({years} years total). "));
    }

    if breakdown.profile > 10.0 {
        reasoning.push_str("Profile shows excellent alignment with role requirements.");
    } else if breakdown.profile > 5.0 {
        reasoning.push_str("Profile demonstrates good fit for the position.");
    } else {
        reasoning.push_str("Profile shows potential for growth in this role.");
    }

    reasoning
}

/// "6.0", "3.5"; whole numbers keep one decimal place.
fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{years:.1}")
    } else {
        years.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn candidate() -> Candidate {
        Candidate {
            first_name: Some("Priya".to_string()),
            last_name: Some("Nair".to_string()),
            skills: Some("Python, Machine Learning, Excel, SQL, PyTorch".to_string()),
            total_experience: Some("6 years".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_matching_skills_are_substring_matches_in_candidate_order() {
        let matches = matching_skills(
            "Python, Machine Learning, Excel, SQL, PyTorch",
            &tokens(&["learning", "py", "sql"]),
        );
        assert_eq!(matches, vec!["python", "machine learning", "sql"]);
    }

    #[test]
    fn test_matching_skills_empty_when_no_job_tokens() {
        assert!(matching_skills("Python", &[]).is_empty());
        assert!(matching_skills("", &tokens(&["python"])).is_empty());
    }

    #[test]
    fn test_high_scores_use_strong_bands() {
        let breakdown = ScoreBreakdown::from_components(40.0, 30.0, 12.0).unwrap();
        let text = generate_reasoning(&candidate(), &breakdown, &tokens(&["python"]));
        assert_eq!(
            text,
            "Priya Nair scored 82/100. Excellent skill alignment (40.0/50). \
             Key matching skills: python. Strong experience profile (6.0 years total). \
             Profile shows excellent alignment with role requirements."
        );
    }

    #[test]
    fn test_middle_bands() {
        let breakdown = ScoreBreakdown::from_components(20.34, 20.0, 6.0).unwrap();
        let text = generate_reasoning(&candidate(), &breakdown, &[]);
        assert!(text.contains("Good skill match (20.3/50)"));
        assert!(text.contains("Adequate experience level (6.0 years total)"));
        assert!(text.contains("Profile demonstrates good fit for the position."));
        assert!(!text.contains("Key matching skills"));
    }

    #[test]
    fn test_low_bands() {
        let breakdown = ScoreBreakdown::from_components(0.0, 5.0, 0.0).unwrap();
        let c = Candidate {
            total_experience: Some("1.5 yrs".to_string()),
            ..Default::default()
        };
        let text = generate_reasoning(&c, &breakdown, &[]);
        assert!(text.starts_with(" scored 5/100."));
        assert!(text.contains("Limited skill overlap (0.0/50)"));
        assert!(text.contains("Developing experience (1.5 years total)"));
        assert!(text.ends_with("Profile shows potential for growth in this role."));
    }

    #[test]
    fn test_band_thresholds_are_strict() {
        let breakdown = ScoreBreakdown::from_components(30.0, 25.0, 10.0).unwrap();
        let text = generate_reasoning(&candidate(), &breakdown, &[]);
        assert!(text.contains("Good skill match"));
        assert!(text.contains("Adequate experience level"));
        assert!(text.contains("Profile demonstrates good fit"));
    }

    #[test]
    fn test_missing_experience_figure_reads_as_zero() {
        let breakdown = ScoreBreakdown::from_components(0.0, 0.0, 0.0).unwrap();
        let c = Candidate {
            first_name: Some("Ravi".to_string()),
            total_experience: Some("fresher".to_string()),
            ..Default::default()
        };
        let text = generate_reasoning(&c, &breakdown, &[]);
        assert!(text.starts_with("Ravi scored 0/100."));
        assert!(text.contains("Developing experience (0 years total)"));

        let c = Candidate {
            total_experience: Some("0 years".to_string()),
            ..Default::default()
        };
        let text = generate_reasoning(&c, &breakdown, &[]);
        assert!(text.contains("Developing experience (0.0 years total)"));
    }

    #[test]
    fn test_format_years() {
        assert_eq!(format_years(6.0), "6.0");
        assert_eq!(format_years(0.0), "0.0");
        assert_eq!(format_years(3.5), "3.5");
    }
}
