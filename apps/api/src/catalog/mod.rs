//! Job Catalog — the static set of job postings matched against candidates.
//!
//! Loaded once at startup. Each job's terms are normalized against the taxonomy
//! at load time, since neither the jobs nor the taxonomy change afterwards.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::extraction::flatten::{lenient_string, lenient_strings};
use crate::matching::experience::YearsOfExperience;
use crate::taxonomy::normalizer::NormalizedTerms;
use crate::taxonomy::{term_key, Category, Taxonomy, TermNormalizer};

pub mod demand;
pub mod handlers;

/// Job identifiers arrive as either JSON numbers or strings; both are echoed back as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Int(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Int(n) => write!(f, "{n}"),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

/// A job record as stored in the catalog file. Term lists keep their raw spelling.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub databases: Vec<String>,
    #[serde(default, alias = "operatingSystems", deserialize_with = "lenient_strings")]
    pub operating_systems: Vec<String>,
    #[serde(default, alias = "codingLanguages", deserialize_with = "lenient_strings")]
    pub coding_languages: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub degree: Vec<String>,
    #[serde(default, alias = "yearsOfExperience")]
    pub years_of_experience: YearsOfExperience,
}

impl Default for JobId {
    fn default() -> Self {
        JobId::Text(String::new())
    }
}

impl JobPosting {
    pub fn raw_terms(&self, category: Category) -> &[String] {
        match category {
            Category::Skills => &self.skills,
            Category::Certifications => &self.certifications,
            Category::Tools => &self.tools,
            Category::Databases => &self.databases,
            Category::OperatingSystems => &self.operating_systems,
            Category::CodingLanguages => &self.coding_languages,
            Category::Degree => &self.degree,
        }
    }
}

/// A posting together with its precomputed canonical terms and required years.
#[derive(Debug, Clone)]
pub struct CatalogJob {
    pub posting: JobPosting,
    pub terms: NormalizedTerms,
    pub required_years: f64,
}

impl CatalogJob {
    pub fn new(posting: JobPosting, normalizer: &TermNormalizer<'_>) -> Self {
        let terms = NormalizedTerms::build(normalizer, |c| posting.raw_terms(c));
        let required_years = posting.years_of_experience.years();
        Self {
            posting,
            terms,
            required_years,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    jobs: Vec<CatalogJob>,
    /// Lowercased raw terms per scored category, across every job.
    known_terms: HashMap<Category, HashSet<String>>,
}

impl JobCatalog {
    pub fn new(postings: Vec<JobPosting>, taxonomy: &Taxonomy) -> Self {
        let normalizer = TermNormalizer::new(taxonomy);

        let mut known_terms: HashMap<Category, HashSet<String>> = HashMap::new();
        for posting in &postings {
            for category in Category::SCORED {
                let known = known_terms.entry(category).or_default();
                known.extend(
                    posting
                        .raw_terms(category)
                        .iter()
                        .map(|term| term_key(term))
                        .filter(|key| !key.is_empty()),
                );
            }
        }

        let jobs = postings
            .into_iter()
            .map(|posting| CatalogJob::new(posting, &normalizer))
            .collect();
        Self { jobs, known_terms }
    }

    /// Whether any job lists `term` (case-insensitively) in `category`.
    pub fn mentions(&self, category: Category, term: &str) -> bool {
        self.known_terms
            .get(&category)
            .is_some_and(|known| known.contains(&term_key(term)))
    }

    /// Decodes an array of job records. A record that fails to decode is
    /// skipped with a warning; the remaining records still load.
    pub fn from_value(document: Value, taxonomy: &Taxonomy) -> Self {
        let Value::Array(records) = document else {
            warn!("Job catalog is not an array — no jobs loaded");
            return Self::default();
        };

        let postings = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<JobPosting>(record) {
                Ok(posting) => Some(posting),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed job record");
                    None
                }
            })
            .collect();

        Self::new(postings, taxonomy)
    }

    pub fn load(path: &Path, taxonomy: &Taxonomy) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read job catalog {}", path.display()))?;
        let document: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Job catalog {} is not valid JSON", path.display()))?;

        let catalog = Self::from_value(document, taxonomy);
        info!(path = %path.display(), jobs = catalog.len(), "Job catalog loaded");
        Ok(catalog)
    }

    pub fn jobs(&self) -> &[CatalogJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
