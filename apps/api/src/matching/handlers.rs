use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::matching::engine::{CandidateProfile, MatchResultSet};
use crate::state::AppState;

/// POST /api/v1/skills/analyze
/// Scores a candidate profile against every catalog job.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(profile): Json<CandidateProfile>,
) -> Result<Json<MatchResultSet>, AppError> {
    let engine = state.engine.clone();
    let catalog = state.catalog.clone();

    let results = tokio::task::spawn_blocking(move || engine.run(&profile, catalog.jobs()))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in matching run: {e}"))
        })?;

    Ok(Json(results))
}
