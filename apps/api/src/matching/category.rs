//! Category Scorer — required terms vs candidate terms for one category.
//!
//! Exact canonical match first; when that fails, an embedding cosine similarity
//! above `SIMILARITY_THRESHOLD` against any candidate term counts as a match.

use std::collections::HashSet;

use serde::Serialize;

use crate::embeddings::{cosine_similarity, EmbeddingStore};
use crate::matching::CategoryContribution;
use crate::taxonomy::Category;

/// Minimum cosine similarity (exclusive) for a fuzzy match.
pub const SIMILARITY_THRESHOLD: f64 = 0.85;

/// Score and term partitions for one category of one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryScore {
    /// 0 – 10
    pub score: f64,
    /// Required and possessed (exact or fuzzy).
    pub green: Vec<String>,
    /// Required but missing.
    pub red: Vec<String>,
    /// Possessed but not required.
    pub yellow: Vec<String>,
    pub contributes: bool,
}

impl CategoryScore {
    pub fn contribution(&self) -> CategoryContribution {
        CategoryContribution {
            score: self.score,
            contributes: self.contributes,
        }
    }
}

/// Scores `required` (a job's canonical terms) against `candidate` (the
/// candidate's canonical terms) within `category`.
///
/// `yellow` is computed against exact required-term membership only, so a
/// candidate term that fuzzily satisfied a required term is still reported
/// as yellow.
pub fn score_category(
    category: Category,
    required: &[String],
    candidate: &[String],
    embeddings: &EmbeddingStore,
) -> CategoryScore {
    if required.is_empty() {
        return CategoryScore {
            score: 0.0,
            green: vec![],
            red: vec![],
            yellow: candidate.to_vec(),
            contributes: false,
        };
    }

    let candidate_set: HashSet<&str> = candidate.iter().map(String::as_str).collect();
    let mut green = Vec::new();
    let mut red = Vec::new();

    for term in required {
        let matched = candidate_set.contains(term.as_str())
            || best_similarity(category, term, candidate, embeddings)
                .is_some_and(|sim| sim > SIMILARITY_THRESHOLD);

        if matched {
            green.push(term.clone());
        } else {
            red.push(term.clone());
        }
    }

    let required_set: HashSet<&str> = required.iter().map(String::as_str).collect();
    let yellow = candidate
        .iter()
        .filter(|term| !required_set.contains(term.as_str()))
        .cloned()
        .collect();

    let score = (green.len() as f64 / required.len() as f64) * 10.0;

    CategoryScore {
        score,
        green,
        red,
        yellow,
        contributes: true,
    }
}

/// Highest similarity between `term` and any candidate term with a vector.
/// `None` when `term` has no vector or no candidate term does.
fn best_similarity(
    category: Category,
    term: &str,
    candidate: &[String],
    embeddings: &EmbeddingStore,
) -> Option<f64> {
    let required_vector = embeddings.vector(category, term)?;

    candidate
        .iter()
        .filter_map(|c| embeddings.vector(category, c))
        .map(|v| cosine_similarity(required_vector, v))
        .reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn make_embeddings() -> EmbeddingStore {
        let mut store = EmbeddingStore::new();
        // cos(burp suite, burp suite pro) = 0.9
        store.insert(Category::Tools, "burp suite", vec![1.0, 0.0]);
        store.insert(Category::Tools, "burp suite pro", vec![0.9, 0.435_889_9]);
        // cos(burp suite, nessus) = 0.8
        store.insert(Category::Tools, "nessus", vec![0.8, 0.6]);
        store
    }

    #[test]
    fn test_empty_requirement_does_not_contribute() {
        let candidate = strings(&["nmap", "zap"]);
        let result = score_category(Category::Tools, &[], &candidate, &EmbeddingStore::new());

        assert!(!result.contributes);
        assert_eq!(result.score, 0.0);
        assert!(result.green.is_empty());
        assert!(result.red.is_empty());
        assert_eq!(result.yellow, candidate);
    }

    #[test]
    fn test_exact_partial_match_without_embeddings() {
        let required = strings(&["python", "sql"]);
        let candidate = strings(&["python"]);
        let result = score_category(
            Category::Skills,
            &required,
            &candidate,
            &EmbeddingStore::new(),
        );

        assert_eq!(result.green, vec!["python"]);
        assert_eq!(result.red, vec!["sql"]);
        assert!(result.yellow.is_empty());
        assert!((result.score - 5.0).abs() < 1e-9);
        assert!(result.contributes);
    }

    #[test]
    fn test_full_containment_scores_ten() {
        let required = strings(&["linux", "windows"]);
        let candidate = strings(&["windows", "macos", "linux"]);
        let result = score_category(
            Category::OperatingSystems,
            &required,
            &candidate,
            &EmbeddingStore::new(),
        );

        assert_eq!(result.score, 10.0);
        assert!(result.red.is_empty());
        assert_eq!(result.yellow, vec!["macos"]);
    }

    #[test]
    fn test_fuzzy_match_above_threshold_is_green() {
        let required = strings(&["burp suite"]);
        let candidate = strings(&["burp suite pro"]);
        let result = score_category(Category::Tools, &required, &candidate, &make_embeddings());

        assert_eq!(result.green, vec!["burp suite"]);
        assert!(result.red.is_empty());
        assert_eq!(result.score, 10.0);
    }

    #[test]
    fn test_fuzzy_matched_candidate_term_stays_yellow() {
        let required = strings(&["burp suite"]);
        let candidate = strings(&["burp suite pro"]);
        let result = score_category(Category::Tools, &required, &candidate, &make_embeddings());

        assert_eq!(result.yellow, vec!["burp suite pro"]);
    }

    #[test]
    fn test_similarity_below_threshold_is_red() {
        let required = strings(&["burp suite"]);
        let candidate = strings(&["nessus"]);
        let result = score_category(Category::Tools, &required, &candidate, &make_embeddings());

        assert_eq!(result.red, vec!["burp suite"]);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_embeddings_are_scoped_to_category() {
        let required = strings(&["burp suite"]);
        let candidate = strings(&["burp suite pro"]);
        let result = score_category(Category::Skills, &required, &candidate, &make_embeddings());

        assert_eq!(result.red, vec!["burp suite"]);
    }

    #[test]
    fn test_similarity_exactly_at_threshold_is_red() {
        // cos = 17 / 20 = 0.85, which does not exceed the threshold
        let mut store = EmbeddingStore::new();
        store.insert(Category::Skills, "threat hunting", vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        store.insert(Category::Skills, "threat detection", vec![17.0, 9.0, 5.0, 2.0, 1.0]);
        let required = strings(&["threat hunting"]);
        let candidate = strings(&["threat detection"]);

        let sim = best_similarity(Category::Skills, "threat hunting", &candidate, &store);
        assert_eq!(sim, Some(0.85));

        let result = score_category(Category::Skills, &required, &candidate, &store);
        assert_eq!(result.red, vec!["threat hunting"]);
    }

    #[test]
    fn test_similarity_just_above_threshold_is_green() {
        // cos ≈ 0.850000008: above 0.85 in f64, indistinguishable from it in f32
        let mut store = EmbeddingStore::new();
        store.insert(Category::Skills, "threat hunting", vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        store.insert(Category::Skills, "threat detection", vec![17.0, 9.0, 5.0, 2.0, 0.999_996]);
        let required = strings(&["threat hunting"]);
        let candidate = strings(&["threat detection"]);

        let result = score_category(Category::Skills, &required, &candidate, &store);
        assert_eq!(result.green, vec!["threat hunting"]);
        assert_eq!(result.score, 10.0);
    }

    #[test]
    fn test_missing_candidate_vectors_fall_back_to_exact() {
        let required = strings(&["burp suite"]);
        let candidate = strings(&["ghidra"]);
        let result = score_category(Category::Tools, &required, &candidate, &make_embeddings());

        assert_eq!(result.red, vec!["burp suite"]);
        assert!(result.contributes);
    }

    #[test]
    fn test_best_similarity_takes_maximum() {
        let candidate = strings(&["nessus", "burp suite pro", "ghidra"]);
        let sim = best_similarity(Category::Tools, "burp suite", &candidate, &make_embeddings())
            .unwrap();
        assert!((sim - 0.9).abs() < 1e-4, "got {sim}");
    }
}
