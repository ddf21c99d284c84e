use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub jobs_path: PathBuf,
    pub taxonomy_path: PathBuf,
    pub embeddings_path: PathBuf,
    /// Drop jobs that require more years than the candidate states.
    pub strict_experience_filter: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "3001")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            jobs_path: env_or("JOBS_PATH", "data/parsed_jobs.json").into(),
            taxonomy_path: env_or("TAXONOMY_PATH", "data/skill_taxonomy.json").into(),
            embeddings_path: env_or("EMBEDDINGS_PATH", "data/skill_embeddings.json").into(),
            strict_experience_filter: parse_bool(&env_or("STRICT_EXPERIENCE_FILTER", "true"))
                .context("STRICT_EXPERIENCE_FILTER must be true or false")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("invalid boolean '{other}'"),
    }
}
