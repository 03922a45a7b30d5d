//! Axum route handlers for the matching API and the HTML front end.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::{extract_text, supported_extension};
use crate::matching::matcher::MatchResult;
use crate::matching::preprocess::advanced_text_preprocessing;
use crate::matching::similarity::{
    batch_similarity, compute_semantic_similarity_detailed, DetailedSimilarity,
};
use crate::render::{render_index, render_result_page};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub request_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub result: MatchResult,
}

#[derive(Debug, Deserialize)]
pub struct SimilarityRequest {
    pub text_a: String,
    pub text_b: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchSimilarityRequest {
    pub reference: String,
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchSimilarityResponse {
    pub scores: Vec<f64>,
}

/// Fields of the upload form.
#[derive(Debug)]
struct UploadForm {
    file_name: String,
    bytes: Bytes,
    job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_index() -> Html<String> {
    Html(render_index(None))
}

/// POST /
/// Validation and processing failures re-render the form with the message.
pub async fn handle_index_submit(State(state): State<AppState>, multipart: Multipart) -> Response {
    match analyze_upload(&state, multipart).await {
        Ok(result) => Html(render_result_page(&result)).into_response(),
        Err(e) => (e.status(), Html(render_index(Some(&e.public_message())))).into_response(),
    }
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let result = analyze_upload(&state, multipart).await?;
    Ok(Json(envelope(result)))
}

/// POST /api/v1/match
/// Text-only variant of `/api/v1/analyze`.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate_job_description(&req.job_description, state.config.min_jd_chars)?;
    let result = run_match(&state, req.resume_text, req.job_description).await?;
    Ok(Json(envelope(result)))
}

/// POST /api/v1/similarity
pub async fn handle_similarity(
    State(state): State<AppState>,
    Json(req): Json<SimilarityRequest>,
) -> Result<Json<DetailedSimilarity>, AppError> {
    let matcher = state.matcher.clone();
    let detailed = tokio::task::spawn_blocking(move || {
        compute_semantic_similarity_detailed(&req.text_a, &req.text_b, matcher.embedder())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(detailed))
}

/// POST /api/v1/similarity/batch
pub async fn handle_batch_similarity(
    State(state): State<AppState>,
    Json(req): Json<BatchSimilarityRequest>,
) -> Result<Json<BatchSimilarityResponse>, AppError> {
    let matcher = state.matcher.clone();
    let scores = tokio::task::spawn_blocking(move || {
        batch_similarity(&req.texts, &req.reference, matcher.embedder())
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(BatchSimilarityResponse { scores }))
}

// ────────────────────────────────────────────────────────────────────────────
// Shared steps
// ────────────────────────────────────────────────────────────────────────────

fn envelope(result: MatchResult) -> AnalyzeResponse {
    AnalyzeResponse {
        request_id: Uuid::new_v4(),
        analyzed_at: Utc::now(),
        result,
    }
}

async fn analyze_upload(state: &AppState, multipart: Multipart) -> Result<MatchResult, AppError> {
    let form = read_upload_form(multipart).await?;
    validate_job_description(&form.job_description, state.config.min_jd_chars)?;

    info!(file = %form.file_name, bytes = form.bytes.len(), "Processing resume upload");

    let UploadForm {
        file_name,
        bytes,
        job_description,
    } = form;
    let resume_text = tokio::task::spawn_blocking(move || extract_text(&file_name, &bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    run_match(state, resume_text, job_description).await
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().trim().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, bytes));
            }
            "job_description" => {
                job_description = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("No resume file uploaded".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("No job description provided".to_string()))?;

    if file_name.is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }
    supported_extension(&file_name)?;

    Ok(UploadForm {
        file_name,
        bytes,
        job_description,
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(e.body_text())
    }
}

fn validate_job_description(text: &str, min_chars: usize) -> Result<(), AppError> {
    if text.trim().chars().count() < min_chars {
        return Err(AppError::Validation(
            "Job description is too short. Please provide more details.".to_string(),
        ));
    }
    Ok(())
}

/// Preprocesses both texts and runs the matcher off the async runtime.
async fn run_match(
    state: &AppState,
    resume_text: String,
    jd_text: String,
) -> Result<MatchResult, AppError> {
    let matcher = state.matcher.clone();

    let result = tokio::task::spawn_blocking(move || {
        let resume = advanced_text_preprocessing(&resume_text, matcher.analyzer(), false);
        let jd = advanced_text_preprocessing(&jd_text, matcher.analyzer(), false);
        matcher.run(&resume, &jd)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_job_description_counts_trimmed_chars() {
        assert!(validate_job_description("   short   ", 10).is_err());
        assert!(validate_job_description(&"é".repeat(50), 50).is_ok());
        assert!(validate_job_description(&"x".repeat(49), 50).is_err());
    }
}
