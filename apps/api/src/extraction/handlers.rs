use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::extraction::pipeline::{analyze_resume, ExtractedResume, ResumeAnalysis};
use crate::state::AppState;

/// POST /api/v1/resume/analyze
pub async fn handle_resume_analyze(
    State(state): State<AppState>,
    Json(extracted): Json<ExtractedResume>,
) -> Result<Json<ResumeAnalysis>, AppError> {
    if extracted.is_empty() {
        return Err(AppError::Validation(
            "Resume payload contains no skills, roles or experience".to_string(),
        ));
    }

    let engine = state.engine.clone();
    let catalog = state.catalog.clone();
    let today = chrono::Utc::now().date_naive();

    // Scoring every catalog job is CPU-bound; keep it off the async executor.
    let analysis =
        tokio::task::spawn_blocking(move || analyze_resume(&extracted, &engine, &catalog, today))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "spawn_blocking failed in resume analysis: {e}"
                ))
            })?;

    Ok(Json(analysis))
}
