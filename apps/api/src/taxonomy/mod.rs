//! Taxonomy Store — per-category canonical terms with their aliases and subskills.
//!
//! Built once at startup and shared read-only. Every lookup is scoped to a single
//! `Category`, so the same alias may resolve differently in two categories.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

pub mod normalizer;

pub use normalizer::TermNormalizer;

// ────────────────────────────────────────────────────────────────────────────
// Categories
// ────────────────────────────────────────────────────────────────────────────

/// One attribute dimension shared by candidates, jobs, and the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Skills,
    Certifications,
    Tools,
    Databases,
    #[serde(alias = "operatingSystems")]
    OperatingSystems,
    #[serde(alias = "codingLanguages")]
    CodingLanguages,
    Degree,
}

impl Category {
    /// Categories that take part in job scoring, in scoring order. `Degree` is
    /// carried by the taxonomy and suggestions only.
    pub const SCORED: [Category; 6] = [
        Category::Skills,
        Category::Certifications,
        Category::Tools,
        Category::Databases,
        Category::OperatingSystems,
        Category::CodingLanguages,
    ];

    pub const ALL: [Category; 7] = [
        Category::Skills,
        Category::Certifications,
        Category::Tools,
        Category::Databases,
        Category::OperatingSystems,
        Category::CodingLanguages,
        Category::Degree,
    ];

    /// Parses a document or URL key. Accepts camelCase, snake_case and kebab-case.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "skills" => Some(Category::Skills),
            "certifications" => Some(Category::Certifications),
            "tools" => Some(Category::Tools),
            "databases" => Some(Category::Databases),
            "operatingSystems" | "operating_systems" | "operating-systems" => {
                Some(Category::OperatingSystems)
            }
            "codingLanguages" | "coding_languages" | "coding-languages" => {
                Some(Category::CodingLanguages)
            }
            "degree" => Some(Category::Degree),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Skills => "skills",
            Category::Certifications => "certifications",
            Category::Tools => "tools",
            Category::Databases => "databases",
            Category::OperatingSystems => "operating_systems",
            Category::CodingLanguages => "coding_languages",
            Category::Degree => "degree",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entries and lookup tables
// ────────────────────────────────────────────────────────────────────────────

/// A canonical term and every spelling that should resolve to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyEntry {
    pub canonical: String,
    pub aliases: Vec<String>,
    pub subskills: Vec<String>,
}

impl TaxonomyEntry {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            ..Self::default()
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_subskills<I, S>(mut self, subskills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subskills.extend(subskills.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Default)]
struct CategoryTable {
    canonical: HashSet<String>,
    /// alias or subskill -> canonical
    variants: HashMap<String, String>,
}

/// Lowercase + trim — the comparison key used for every taxonomy lookup.
pub fn term_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Immutable lookup tables, one per category.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    tables: HashMap<Category, CategoryTable>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Canonical terms are unique per category; when two entries
    /// claim the same alias or subskill the earlier entry keeps it.
    pub fn insert(&mut self, category: Category, entry: TaxonomyEntry) {
        let canonical = term_key(&entry.canonical);
        if canonical.is_empty() {
            return;
        }

        let table = self.tables.entry(category).or_default();
        table.canonical.insert(canonical.clone());

        for variant in entry.aliases.iter().chain(entry.subskills.iter()) {
            let key = term_key(variant);
            if key.is_empty() || key == canonical {
                continue;
            }
            table
                .variants
                .entry(key)
                .or_insert_with(|| canonical.clone());
        }
    }

    /// Builds a taxonomy from `{ <category>: { <canonical>: { aliases, subskills } } }`.
    ///
    /// Unknown categories are skipped with a warning; non-string aliases and
    /// subskills are ignored rather than failing the whole document.
    pub fn from_value(document: &Value) -> Self {
        let mut taxonomy = Taxonomy::new();

        let Some(categories) = document.as_object() else {
            warn!("Taxonomy document is not an object — using an empty taxonomy");
            return taxonomy;
        };

        for (key, entries) in categories {
            let Some(category) = Category::from_key(key) else {
                warn!(category = %key, "Skipping unknown taxonomy category");
                continue;
            };
            let Some(entries) = entries.as_object() else {
                warn!(category = %key, "Taxonomy category is not an object — skipped");
                continue;
            };

            for (canonical, body) in entries {
                let entry = TaxonomyEntry::new(canonical.as_str())
                    .with_aliases(string_list(body.get("aliases")))
                    .with_subskills(string_list(body.get("subskills")));
                taxonomy.insert(category, entry);
            }
        }

        taxonomy
    }

    /// Reads and builds a taxonomy from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read taxonomy file {}", path.display()))?;
        let document: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Taxonomy file {} is not valid JSON", path.display()))?;

        let taxonomy = Self::from_value(&document);
        info!(
            path = %path.display(),
            canonical_terms = taxonomy.canonical_count(),
            "Taxonomy loaded"
        );
        Ok(taxonomy)
    }

    /// Resolves an already-keyed term (see `term_key`) to its canonical form.
    pub(crate) fn lookup(&self, category: Category, key: &str) -> Option<&str> {
        let table = self.tables.get(&category)?;
        if let Some(canonical) = table.canonical.get(key) {
            return Some(canonical.as_str());
        }
        table.variants.get(key).map(String::as_str)
    }

    pub fn canonical_count(&self) -> usize {
        self.tables.values().map(|t| t.canonical.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
