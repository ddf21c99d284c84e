mod catalog;
mod config;
mod embeddings;
mod errors;
mod extraction;
mod matching;
mod routes;
mod state;
mod taxonomy;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::JobCatalog;
use crate::config::Config;
use crate::embeddings::EmbeddingStore;
use crate::matching::engine::{MatchSettings, MatchingEngine};
use crate::routes::build_router;
use crate::state::AppState;
use crate::taxonomy::Taxonomy;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Reference data. A missing or broken file leaves that store empty so the
    // service still starts; matching degrades to exact terms / no jobs.
    let taxonomy = Taxonomy::load(&config.taxonomy_path).unwrap_or_else(|e| {
        error!("Taxonomy unavailable, normalizing by lowercase only: {e:#}");
        Taxonomy::default()
    });

    let embeddings = EmbeddingStore::load(&config.embeddings_path).unwrap_or_else(|e| {
        error!("Embeddings unavailable, fuzzy matching disabled: {e:#}");
        EmbeddingStore::default()
    });

    let catalog = JobCatalog::load(&config.jobs_path, &taxonomy).unwrap_or_else(|e| {
        error!("Job catalog unavailable, no jobs will match: {e:#}");
        JobCatalog::default()
    });

    if taxonomy.is_empty() {
        warn!("Taxonomy has no entries; terms are compared as written");
    }
    if embeddings.is_empty() {
        warn!("No embedding vectors loaded; scoring uses exact matches only");
    }
    if catalog.is_empty() {
        warn!("Job catalog is empty; every analysis will return no roles");
    }

    let settings = MatchSettings {
        strict_experience_filter: config.strict_experience_filter,
    };
    info!(
        "Matching engine ready (strict experience filter: {})",
        settings.strict_experience_filter
    );

    // Build app state
    let state = AppState {
        engine: Arc::new(MatchingEngine::new(
            Arc::new(taxonomy),
            Arc::new(embeddings),
            settings,
        )),
        catalog: Arc::new(catalog),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
