//! Axum handlers for the analysis API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::analysis::AnalysisEngine;
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A validated `{"resumes": [...], "job_description": "..."}` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzePayload {
    pub resumes: Vec<Value>,
    pub job_description: String,
}

impl AnalyzePayload {
    /// Validates a request body. An empty body is reported as missing data.
    pub fn from_value(data: Value) -> Result<Self, AppError> {
        if is_empty_body(&data) {
            return Err(AppError::Validation("No data provided".to_string()));
        }
        Self::from_document(data)
    }

    /// Validates a decoded file, which is checked for shape only.
    pub fn from_document(mut data: Value) -> Result<Self, AppError> {
        let resumes = match data.get_mut("resumes").map(Value::take) {
            Some(Value::Array(resumes)) => resumes,
            _ => {
                return Err(AppError::Validation(
                    "Invalid data structure. Expected 'resumes' array.".to_string(),
                ))
            }
        };
        if resumes.is_empty() {
            return Err(AppError::Validation(
                "No resumes provided for analysis".to_string(),
            ));
        }

        let job_description = data
            .get("job_description")
            .and_then(Value::as_str)
            .filter(|jd| !jd.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?
            .to_string();

        Ok(Self {
            resumes,
            job_description,
        })
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` all count as no data.
fn is_empty_body(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub run_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub candidates_analyzed: usize,
    pub results: Vec<AnalysisResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Scores and ranks the resumes in a JSON body against its job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Json(data) = payload?;
    let payload = AnalyzePayload::from_value(data)?;
    run_analysis(state.engine.clone(), payload).await.map(Json)
}

/// POST /analyze-file
///
/// Same as `/analyze`, reading the payload from an uploaded `.json` file in
/// the multipart field `file`.
pub async fn handle_analyze_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((file_name, bytes));
            break;
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let payload = parse_upload(&file_name, &bytes)?;
    run_analysis(state.engine.clone(), payload).await.map(Json)
}

/// Validates an uploaded file's name and decodes its JSON payload.
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<AnalyzePayload, AppError> {
    if file_name.is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }
    if !file_name.ends_with(".json") {
        return Err(AppError::Validation("File must be a JSON file".to_string()));
    }

    let data: Value = serde_json::from_slice(bytes)
        .map_err(|_| AppError::Validation("Invalid JSON format".to_string()))?;
    AnalyzePayload::from_document(data)
}

/// Runs the CPU-bound engine off the async runtime.
async fn run_analysis(
    engine: Arc<AnalysisEngine>,
    payload: AnalyzePayload,
) -> Result<AnalyzeResponse, AppError> {
    let run = tokio::task::spawn_blocking(move || {
        engine.run(&payload.resumes, &payload.job_description)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("analysis task failed: {e}")))??;

    Ok(AnalyzeResponse {
        success: true,
        run_id: run.run_id,
        analyzed_at: run.analyzed_at.unwrap_or_else(Utc::now),
        candidates_analyzed: run.results.len(),
        results: run.results,
    })
}
