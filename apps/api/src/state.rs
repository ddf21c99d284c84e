use std::sync::Arc;

use crate::catalog::JobCatalog;
use crate::config::Config;
use crate::matching::engine::MatchingEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub catalog: Arc<JobCatalog>,
    pub config: Config,
}
