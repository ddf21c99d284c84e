//! Market-demand statistics and autocomplete suggestions derived from the catalog.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::JobCatalog;
use crate::taxonomy::Category;

pub const DEFAULT_TOP_LIMIT: usize = 10;
pub const MAX_TOP_LIMIT: usize = 50;

/// Share of catalog jobs that ask for a canonical term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermDemand {
    pub term: String,
    pub jobs: usize,
    /// 0 – 100, rounded
    pub percentage: u32,
}

/// Clamps a requested limit: absent or zero → default, capped at the maximum.
pub fn effective_limit(requested: Option<usize>) -> usize {
    match requested {
        None | Some(0) => DEFAULT_TOP_LIMIT,
        Some(n) => n.min(MAX_TOP_LIMIT),
    }
}

/// Most requested canonical terms in `category`, most frequent first.
///
/// Each job counts a term at most once. Ties keep the order in which terms
/// were first seen in the catalog.
pub fn top_terms(catalog: &JobCatalog, category: Category, limit: usize) -> Vec<TermDemand> {
    let total = catalog.len();
    if total == 0 {
        return Vec::new();
    }

    let mut first_seen: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for job in catalog.jobs() {
        let mut in_this_job = HashSet::new();
        for term in job.terms.get(category) {
            if !in_this_job.insert(term.as_str()) {
                continue;
            }
            let count = counts.entry(term.clone()).or_insert_with(|| {
                first_seen.push(term.clone());
                0
            });
            *count += 1;
        }
    }

    let mut demand: Vec<TermDemand> = first_seen
        .into_iter()
        .map(|term| {
            let jobs = counts.get(&term).copied().unwrap_or(0);
            let percentage = ((jobs as f64 / total as f64) * 100.0).round() as u32;
            TermDemand {
                term,
                jobs,
                percentage,
            }
        })
        .collect();

    demand.sort_by(|a, b| b.jobs.cmp(&a.jobs));
    demand.truncate(limit);
    demand
}

/// Distinct raw values per category across the catalog, sorted case-insensitively.
pub fn suggestions(catalog: &JobCatalog) -> BTreeMap<Category, Vec<String>> {
    Category::ALL
        .iter()
        .map(|&category| {
            let distinct: BTreeSet<&str> = catalog
                .jobs()
                .iter()
                .flat_map(|job| job.posting.raw_terms(category))
                .map(|term| term.trim())
                .filter(|term| !term.is_empty())
                .collect();

            let mut values: Vec<String> = distinct.into_iter().map(str::to_string).collect();
            values.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));
            (category, values)
        })
        .collect()
}
