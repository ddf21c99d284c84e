pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::catalog::handlers as catalog;
use crate::extraction::handlers as extraction;
use crate::matching::handlers as matching;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching
        .route("/api/v1/skills/analyze", post(matching::handle_analyze))
        .route(
            "/api/v1/resume/analyze",
            post(extraction::handle_resume_analyze),
        )
        // Catalog statistics
        .route("/api/v1/skills/top/:category", get(catalog::handle_top_terms))
        .route(
            "/api/v1/skills/top-certifications",
            get(catalog::handle_top_certifications),
        )
        .route("/api/v1/skills/top-tools", get(catalog::handle_top_tools))
        .route(
            "/api/v1/skills/suggestions",
            get(catalog::handle_suggestions),
        )
        .with_state(state)
}
