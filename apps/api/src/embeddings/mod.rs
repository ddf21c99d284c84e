//! Embedding Store — precomputed vectors for canonical terms, per category.
//!
//! Vectors are produced offline by an external embedding service. The store is
//! optional at every level: a missing file, category, or term simply means the
//! scorer falls back to exact matching.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::taxonomy::{term_key, Category};

pub mod similarity;

pub use similarity::cosine_similarity;

#[derive(Debug, Clone, Default)]
struct CategoryVectors {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingStore {
    categories: HashMap<Category, CategoryVectors>,
}

impl EmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `vector` under the lowercase form of `term`.
    ///
    /// The first vector in a category fixes its dimension; later vectors of a
    /// different length, empty vectors, and vectors with non-finite components
    /// are rejected. Returns whether the vector was stored.
    pub fn insert(&mut self, category: Category, term: &str, vector: Vec<f32>) -> bool {
        let key = term_key(term);
        if key.is_empty() || vector.is_empty() || vector.iter().any(|x| !x.is_finite()) {
            return false;
        }

        let slot = self.categories.entry(category).or_default();
        if slot.dimension == 0 {
            slot.dimension = vector.len();
        } else if slot.dimension != vector.len() {
            warn!(
                category = category.as_str(),
                term = %key,
                expected = slot.dimension,
                actual = vector.len(),
                "Embedding dimension mismatch — vector dropped"
            );
            return false;
        }

        slot.vectors.insert(key, vector);
        true
    }

    pub fn vector(&self, category: Category, term: &str) -> Option<&[f32]> {
        self.categories
            .get(&category)?
            .vectors
            .get(term)
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(|c| c.vectors.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a store from `{ <category>: { <term>: [f32, ...] } }`.
    pub fn from_value(document: &Value) -> Self {
        let mut store = EmbeddingStore::new();

        let Some(categories) = document.as_object() else {
            warn!("Embedding document is not an object — exact matching only");
            return store;
        };

        for (key, terms) in categories {
            let Some(category) = Category::from_key(key) else {
                warn!(category = %key, "Skipping embeddings for unknown category");
                continue;
            };
            let Some(terms) = terms.as_object() else {
                continue;
            };

            let mut rejected = 0usize;
            for (term, raw_vector) in terms {
                let stored = parse_vector(raw_vector)
                    .map(|vector| store.insert(category, term, vector))
                    .unwrap_or(false);
                if !stored {
                    rejected += 1;
                }
            }
            if rejected > 0 {
                warn!(
                    category = category.as_str(),
                    rejected, "Some embedding vectors were malformed and skipped"
                );
            }
        }

        store
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read embeddings file {}", path.display()))?;
        let document: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Embeddings file {} is not valid JSON", path.display()))?;

        let store = Self::from_value(&document);
        info!(path = %path.display(), vectors = store.len(), "Embeddings loaded");
        Ok(store)
    }
}

fn parse_vector(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|x| x.as_f64().map(|x| x as f32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_lookup_lowercases_term() {
        let mut store = EmbeddingStore::new();
        assert!(store.insert(Category::Tools, "Burp Suite", vec![1.0, 0.0]));
        assert_eq!(store.vector(Category::Tools, "burp suite"), Some(&[1.0, 0.0][..]));
        assert_eq!(store.vector(Category::Skills, "burp suite"), None);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut store = EmbeddingStore::new();
        assert!(store.insert(Category::Tools, "nmap", vec![1.0, 0.0, 0.0]));
        assert!(!store.insert(Category::Tools, "zap", vec![1.0, 0.0]));
        assert!(store.vector(Category::Tools, "zap").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_non_finite_and_empty_vectors_are_rejected() {
        let mut store = EmbeddingStore::new();
        assert!(!store.insert(Category::Tools, "nmap", vec![f32::NAN, 1.0]));
        assert!(!store.insert(Category::Tools, "zap", vec![]));
        assert!(store.is_empty());
    }

    #[test]
    fn test_from_value_skips_malformed_entries() {
        let doc = json!({
            "tools": {
                "nmap": [0.1, 0.2],
                "zap": "not a vector",
                "nikto": [0.3, "x"]
            },
            "unknownCategory": { "a": [1.0] },
            "operatingSystems": { "kali linux": [1.0, 0.0, 0.5] }
        });
        let store = EmbeddingStore::from_value(&doc);

        assert_eq!(store.len(), 2);
        assert!(store.vector(Category::Tools, "nmap").is_some());
        assert!(store.vector(Category::Tools, "zap").is_none());
        assert!(store.vector(Category::OperatingSystems, "kali linux").is_some());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(EmbeddingStore::load(Path::new("/no/such/embeddings.json")).is_err());
    }
}
