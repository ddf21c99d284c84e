use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::catalog::demand::{effective_limit, suggestions, top_terms, TermDemand};
use crate::errors::AppError;
use crate::state::AppState;
use crate::taxonomy::Category;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

fn demand_for(state: &AppState, category: Category, query: &LimitQuery) -> Vec<TermDemand> {
    top_terms(&state.catalog, category, effective_limit(query.limit))
}

/// GET /api/v1/skills/top/:category
pub async fn handle_top_terms(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TermDemand>>, AppError> {
    let category = Category::from_key(&category)
        .filter(|c| Category::SCORED.contains(c))
        .ok_or_else(|| AppError::Validation(format!("Unknown skill category '{category}'")))?;

    Ok(Json(demand_for(&state, category, &query)))
}

/// GET /api/v1/skills/top-certifications
pub async fn handle_top_certifications(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<TermDemand>> {
    Json(demand_for(&state, Category::Certifications, &query))
}

/// GET /api/v1/skills/top-tools
pub async fn handle_top_tools(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<TermDemand>> {
    Json(demand_for(&state, Category::Tools, &query))
}

/// GET /api/v1/skills/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
) -> Json<BTreeMap<Category, Vec<String>>> {
    Json(suggestions(&state.catalog))
}
