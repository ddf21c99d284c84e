//! Term Normalizer — resolves raw strings to canonical taxonomy terms.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::taxonomy::{term_key, Category, Taxonomy};

/// Resolves raw terms against a borrowed taxonomy. Total over any input:
/// unknown terms pass through lowercased and trimmed.
#[derive(Debug, Clone, Copy)]
pub struct TermNormalizer<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> TermNormalizer<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Canonical form of `raw` within `category`.
    ///
    /// Order: exact canonical, then alias/subskill, then the keyed input itself.
    /// Empty input yields an empty string.
    pub fn normalize(&self, category: Category, raw: &str) -> String {
        let key = term_key(raw);
        if key.is_empty() {
            return key;
        }
        match self.taxonomy.lookup(category, &key) {
            Some(canonical) => canonical.to_string(),
            None => key,
        }
    }

    /// The taxonomy hit only; `None` for empty or unknown terms.
    pub fn resolve(&self, category: Category, raw: &str) -> Option<String> {
        self.taxonomy
            .lookup(category, &term_key(raw))
            .map(str::to_string)
    }

    /// Normalizes every element, drops empties, and deduplicates.
    /// The first occurrence is kept; order carries no meaning to scoring.
    pub fn normalize_all<S: AsRef<str>>(&self, category: Category, raw: &[S]) -> Vec<String> {
        dedup(
            raw.iter()
                .map(|term| self.normalize(category, term.as_ref()))
                .filter(|term| !term.is_empty()),
        )
    }
}

/// Order-preserving deduplication.
pub fn dedup<I: IntoIterator<Item = String>>(terms: I) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Canonical terms per category for one candidate or job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedTerms(BTreeMap<Category, Vec<String>>);

impl NormalizedTerms {
    /// Normalizes `raw(category)` for every scored category.
    pub fn build<'r, F>(normalizer: &TermNormalizer<'_>, raw: F) -> Self
    where
        F: Fn(Category) -> &'r [String],
    {
        let terms = Category::SCORED
            .iter()
            .map(|&category| (category, normalizer.normalize_all(category, raw(category))))
            .collect();
        Self(terms)
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when no category holds a single term.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}
