use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("candidate record is not a JSON object")]
    NotAnObject,

    #[error("malformed candidate record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A candidate profile as submitted. Text fields the engine reads are typed;
/// everything else is carried through untouched in `extra`.
///
/// Name and profile fields only feed display text, so any JSON value is read
/// as its text form. `skills` and the experience fields are parsed and must be
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub candidate_id: Option<Value>,
    #[serde(default, deserialize_with = "display_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "display_text")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default, deserialize_with = "display_text")]
    pub profile: Option<String>,
    #[serde(default, deserialize_with = "display_text")]
    pub current_designation: Option<String>,
    #[serde(default, deserialize_with = "display_text")]
    pub interested_role: Option<String>,
    #[serde(default)]
    pub total_experience: Option<String>,
    #[serde(default)]
    pub relevant_experience: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Candidate {
    /// Reads the typed view of a raw record. `skills`, `totalExperience` and
    /// `relevantExperience` holding a non-string value are rejected.
    pub fn from_record(record: &Value) -> Result<Self, CandidateError> {
        if !record.is_object() {
            return Err(CandidateError::NotAnObject);
        }
        Ok(Candidate::deserialize(record)?)
    }

    pub fn display_name(&self) -> String {
        join_name(self.first_name.as_deref(), self.last_name.as_deref())
    }

    pub fn skills_text(&self) -> &str {
        self.skills.as_deref().unwrap_or_default()
    }

    pub fn total_experience_text(&self) -> &str {
        self.total_experience.as_deref().unwrap_or_default()
    }

    pub fn relevant_experience_text(&self) -> &str {
        self.relevant_experience.as_deref().unwrap_or_default()
    }

    /// `profile`, `currentDesignation` and `interestedRole`, space-joined.
    pub fn profile_text(&self) -> String {
        format!(
            "{} {} {}",
            self.profile.as_deref().unwrap_or_default(),
            self.current_designation.as_deref().unwrap_or_default(),
            self.interested_role.as_deref().unwrap_or_default()
        )
    }
}

/// Best-effort identity for records that could not be read as a [`Candidate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordIdentity {
    pub candidate_id: Value,
    pub name: String,
    pub skills: String,
    pub experience: String,
}

impl RecordIdentity {
    pub fn from_record(record: &Value) -> Self {
        let text = |key: &str| record.get(key).and_then(Value::as_str);
        Self {
            candidate_id: record.get("candidateId").cloned().unwrap_or(Value::Null),
            name: join_name(text("firstName"), text("lastName")),
            skills: text("skills").unwrap_or_default().to_string(),
            experience: text("totalExperience").unwrap_or_default().to_string(),
        }
    }
}

/// Strings as-is, `null` as absent, any other value as its JSON text.
fn display_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

fn join_name(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
        .trim()
        .to_string()
}
