//! Matching Engine — scores a candidate against every catalog job and ranks the results.
//!
//! Algorithm:
//! 1. Normalize each candidate category through the taxonomy; parse candidate years
//! 2. Bail out with an empty result when the candidate supplied nothing usable
//! 3. Drop jobs that require more years than the candidate has (strict mode)
//! 4. Score the six term categories + experience for each remaining job
//! 5. Aggregate contributing categories into an integer percentage and classify
//! 6. Stable sort, highest percentage first

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogJob, JobId};
use crate::embeddings::EmbeddingStore;
use crate::extraction::flatten::lenient_strings;
use crate::matching::category::score_category;
use crate::matching::experience::{score_experience, YearsOfExperience};
use crate::matching::{aggregate_percentage, CategoryContribution};
use crate::taxonomy::normalizer::NormalizedTerms;
use crate::taxonomy::{Category, Taxonomy, TermNormalizer};

pub const QUALIFIED_THRESHOLD: u32 = 70;
pub const UPSKILL_THRESHOLD: u32 = 30;

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

/// Raw candidate attributes as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandidateProfile {
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
    #[serde(default, alias = "yearsOfExperience")]
    pub years_of_experience: YearsOfExperience,
}

impl CandidateProfile {
    pub fn raw_terms(&self, category: Category) -> &[String] {
        match category {
            Category::Skills => &self.skills,
            Category::Certifications => &self.certifications,
            Category::Tools => &self.tools,
            Category::Databases => &self.databases,
            Category::OperatingSystems => &self.operating_systems,
            Category::CodingLanguages => &self.coding_languages,
            Category::Degree => &[],
        }
    }
}

/// Candidate after normalization: canonical terms per category plus a single years value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCandidate {
    pub terms: NormalizedTerms,
    pub years: f64,
}

impl NormalizedCandidate {
    pub fn has_input(&self) -> bool {
        !self.terms.is_empty() || self.years > 0.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Qualified,
    NeedsUpskilling,
    NotReady,
}

impl MatchStatus {
    pub fn classify(percentage: u32) -> Self {
        match percentage {
            p if p >= QUALIFIED_THRESHOLD => MatchStatus::Qualified,
            p if p >= UPSKILL_THRESHOLD => MatchStatus::NeedsUpskilling,
            _ => MatchStatus::NotReady,
        }
    }
}

/// Green / red / yellow terms for one category of one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermPartition {
    pub green: Vec<String>,
    pub red: Vec<String>,
    pub yellow: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub job_id: JobId,
    pub role: String,
    /// 0 – 100
    pub percentage: u32,
    pub required_years_of_experience: f64,
    pub status: MatchStatus,
    pub categories: BTreeMap<Category, TermPartition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchResultSet {
    pub qualified_roles: Vec<MatchResult>,
    pub upskill_roles: Vec<MatchResult>,
    /// Every scored job in ranked order, `not_ready` included.
    pub all_roles: Vec<MatchResult>,
}

impl MatchResultSet {
    /// Splits already-ranked results into tiers, keeping rank order within each.
    pub fn from_ranked(ranked: Vec<MatchResult>) -> Self {
        let by_status = |status: MatchStatus| {
            ranked
                .iter()
                .filter(|r| r.status == status)
                .cloned()
                .collect::<Vec<_>>()
        };
        let qualified_roles = by_status(MatchStatus::Qualified);
        let upskill_roles = by_status(MatchStatus::NeedsUpskilling);
        Self {
            qualified_roles,
            upskill_roles,
            all_roles: ranked,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    /// Exclude jobs requiring more years than the candidate has (when the
    /// candidate stated any). When off, such jobs are scored normally and the
    /// shortfall only lowers the experience score.
    pub strict_experience_filter: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            strict_experience_filter: true,
        }
    }
}

/// Holds the read-only lookups every run shares. Cheap to clone; safe to use
/// from concurrent requests.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    taxonomy: Arc<Taxonomy>,
    embeddings: Arc<EmbeddingStore>,
    settings: MatchSettings,
}

impl MatchingEngine {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        embeddings: Arc<EmbeddingStore>,
        settings: MatchSettings,
    ) -> Self {
        Self {
            taxonomy,
            embeddings,
            settings,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn normalize_candidate(&self, profile: &CandidateProfile) -> NormalizedCandidate {
        let normalizer = TermNormalizer::new(&self.taxonomy);
        NormalizedCandidate {
            terms: NormalizedTerms::build(&normalizer, |c| profile.raw_terms(c)),
            years: profile.years_of_experience.years(),
        }
    }

    /// Scores `profile` against `jobs` and returns the ranked, tiered result set.
    pub fn run(&self, profile: &CandidateProfile, jobs: &[CatalogJob]) -> MatchResultSet {
        let candidate = self.normalize_candidate(profile);
        if !candidate.has_input() {
            debug!("Candidate supplied no usable input, skipping matching");
            return MatchResultSet::default();
        }

        let mut ranked: Vec<MatchResult> = jobs
            .iter()
            .filter(|job| self.is_eligible(job, candidate.years))
            .map(|job| self.score_job(&candidate, job))
            .collect();

        // Vec::sort_by is stable: equal percentages keep catalog order.
        ranked.sort_by(|a, b| b.percentage.cmp(&a.percentage));

        let results = MatchResultSet::from_ranked(ranked);
        debug!(
            catalog = jobs.len(),
            scored = results.all_roles.len(),
            qualified = results.qualified_roles.len(),
            upskill = results.upskill_roles.len(),
            "Matching run complete"
        );
        results
    }

    fn is_eligible(&self, job: &CatalogJob, candidate_years: f64) -> bool {
        !self.settings.strict_experience_filter
            || candidate_years <= 0.0
            || job.required_years <= candidate_years
    }

    /// Scores one job. Total over any input: never fails, never panics.
    pub fn score_job(&self, candidate: &NormalizedCandidate, job: &CatalogJob) -> MatchResult {
        let mut contributions: Vec<CategoryContribution> = Vec::with_capacity(7);
        let mut categories = BTreeMap::new();

        for category in Category::SCORED {
            let scored = score_category(
                category,
                job.terms.get(category),
                candidate.terms.get(category),
                &self.embeddings,
            );
            contributions.push(scored.contribution());
            categories.insert(
                category,
                TermPartition {
                    green: scored.green,
                    red: scored.red,
                    yellow: scored.yellow,
                },
            );
        }

        let experience = score_experience(job.required_years, candidate.years);
        contributions.push(experience.contribution());

        let percentage = aggregate_percentage(&contributions);

        MatchResult {
            job_id: job.posting.id.clone(),
            role: job.posting.title.clone(),
            percentage,
            required_years_of_experience: experience.job_years,
            status: MatchStatus::classify(percentage),
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{JobCatalog, JobPosting};
    use crate::taxonomy::TaxonomyEntry;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn make_taxonomy() -> Taxonomy {
        let mut taxonomy = Taxonomy::new();
        taxonomy.insert(
            Category::CodingLanguages,
            TaxonomyEntry::new("javascript").with_aliases(["js"]),
        );
        taxonomy.insert(
            Category::Skills,
            TaxonomyEntry::new("penetration testing").with_aliases(["pentest"]),
        );
        taxonomy
    }

    fn make_engine(embeddings: EmbeddingStore, settings: MatchSettings) -> MatchingEngine {
        MatchingEngine::new(Arc::new(make_taxonomy()), Arc::new(embeddings), settings)
    }

    fn make_job(id: i64, title: &str, years: &str) -> JobPosting {
        JobPosting {
            id: JobId::Int(id),
            title: title.to_string(),
            years_of_experience: years.into(),
            ..JobPosting::default()
        }
    }

    fn catalog(postings: Vec<JobPosting>) -> JobCatalog {
        JobCatalog::new(postings, &make_taxonomy())
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(MatchStatus::classify(100), MatchStatus::Qualified);
        assert_eq!(MatchStatus::classify(70), MatchStatus::Qualified);
        assert_eq!(MatchStatus::classify(69), MatchStatus::NeedsUpskilling);
        assert_eq!(MatchStatus::classify(30), MatchStatus::NeedsUpskilling);
        assert_eq!(MatchStatus::classify(29), MatchStatus::NotReady);
        assert_eq!(MatchStatus::classify(0), MatchStatus::NotReady);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&MatchStatus::NeedsUpskilling).unwrap();
        assert_eq!(json, r#""needs_upskilling""#);
    }

    #[test]
    fn test_empty_profile_returns_empty_results() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let jobs = catalog(vec![make_job(1, "Analyst", "2")]);
        let profile = CandidateProfile {
            years_of_experience: "".into(),
            ..CandidateProfile::default()
        };

        let results = engine.run(&profile, jobs.jobs());
        assert!(results.qualified_roles.is_empty());
        assert!(results.upskill_roles.is_empty());
        assert!(results.all_roles.is_empty());
    }

    #[test]
    fn test_alias_resolves_before_scoring() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let mut job = make_job(1, "Frontend Engineer", "");
        job.coding_languages = strings(&["javascript"]);
        let jobs = catalog(vec![job]);
        let profile = CandidateProfile {
            coding_languages: strings(&["JS"]),
            ..CandidateProfile::default()
        };

        let results = engine.run(&profile, jobs.jobs());
        let result = &results.all_roles[0];
        let langs = &result.categories[&Category::CodingLanguages];
        assert_eq!(langs.green, vec!["javascript"]);
        assert!(langs.red.is_empty());
        assert_eq!(result.percentage, 100);
        assert_eq!(result.status, MatchStatus::Qualified);
    }

    #[test]
    fn test_percentage_averages_only_contributing_categories() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let mut job = make_job(1, "Pentester", "5+");
        job.skills = strings(&["python", "sql"]);
        job.tools = strings(&["nmap"]);
        let jobs = catalog(vec![job]);
        let profile = CandidateProfile {
            skills: strings(&["python"]),
            tools: strings(&["nmap"]),
            years_of_experience: 5.0.into(),
            ..CandidateProfile::default()
        };

        let result = &engine.run(&profile, jobs.jobs()).all_roles[0];
        // skills 0.5, tools 1.0, experience 1.0 → 83.3
        assert_eq!(result.percentage, 83);
        assert_eq!(result.required_years_of_experience, 5.0);
    }

    #[test]
    fn test_no_contributing_category_scores_zero() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let jobs = catalog(vec![make_job(1, "Generalist", "")]);
        let profile = CandidateProfile {
            tools: strings(&["nmap"]),
            ..CandidateProfile::default()
        };

        let result = &engine.run(&profile, jobs.jobs()).all_roles[0];
        assert_eq!(result.percentage, 0);
        assert_eq!(result.status, MatchStatus::NotReady);
        assert_eq!(result.categories[&Category::Tools].yellow, vec!["nmap"]);
    }

    #[test]
    fn test_strict_filter_excludes_jobs_above_candidate_years() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let jobs = catalog(vec![
            make_job(1, "Junior", "1"),
            make_job(2, "Senior", "8+"),
            make_job(3, "Unspecified", ""),
        ]);
        let profile = CandidateProfile {
            years_of_experience: "3".into(),
            ..CandidateProfile::default()
        };

        let results = engine.run(&profile, jobs.jobs());
        let ids: Vec<String> = results.all_roles.iter().map(|r| r.job_id.to_string()).collect();
        assert!(!ids.contains(&"2".to_string()));
        assert_eq!(results.all_roles.len(), 2);
        for result in &results.all_roles {
            assert!(result.required_years_of_experience <= 3.0);
        }
    }

    #[test]
    fn test_relaxed_filter_scores_jobs_above_candidate_years() {
        let engine = make_engine(
            EmbeddingStore::new(),
            MatchSettings {
                strict_experience_filter: false,
            },
        );
        let jobs = catalog(vec![make_job(2, "Senior", "6")]);
        let profile = CandidateProfile {
            years_of_experience: "3".into(),
            ..CandidateProfile::default()
        };

        let results = engine.run(&profile, jobs.jobs());
        assert_eq!(results.all_roles.len(), 1);
        assert_eq!(results.all_roles[0].percentage, 50);
        assert_eq!(results.upskill_roles.len(), 1);
    }

    #[test]
    fn test_zero_candidate_years_disables_filter() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let mut job = make_job(1, "Senior", "10");
        job.tools = strings(&["nmap"]);
        let jobs = catalog(vec![job]);
        let profile = CandidateProfile {
            tools: strings(&["nmap"]),
            ..CandidateProfile::default()
        };

        let results = engine.run(&profile, jobs.jobs());
        assert_eq!(results.all_roles.len(), 1);
        assert_eq!(results.all_roles[0].percentage, 100);
    }

    #[test]
    fn test_sort_is_stable_descending() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let mut postings = Vec::new();
        for (id, tools) in [
            (1, vec!["nmap", "zap"]),
            (2, vec!["nmap"]),
            (3, vec!["zap", "nessus"]),
            (4, vec!["nmap", "wireshark"]),
            (5, vec!["ghidra"]),
        ] {
            let mut job = make_job(id, &format!("Job {id}"), "");
            job.tools = strings(&tools);
            postings.push(job);
        }
        let jobs = catalog(postings);
        let profile = CandidateProfile {
            tools: strings(&["nmap"]),
            ..CandidateProfile::default()
        };

        let results = engine.run(&profile, jobs.jobs());
        let order: Vec<String> = results.all_roles.iter().map(|r| r.job_id.to_string()).collect();
        // 2 → 100; 1 and 4 → 50 (catalog order kept); 3 and 5 → 0
        assert_eq!(order, vec!["2", "1", "4", "3", "5"]);

        assert_eq!(results.qualified_roles.len(), 1);
        assert_eq!(results.upskill_roles.len(), 2);
        assert_eq!(results.upskill_roles[0].job_id, JobId::Int(1));
    }

    #[test]
    fn test_fuzzy_match_through_engine() {
        let mut embeddings = EmbeddingStore::new();
        embeddings.insert(Category::Tools, "burp suite", vec![1.0, 0.0]);
        embeddings.insert(Category::Tools, "burp suite pro", vec![0.9, 0.435_889_9]);
        let engine = make_engine(embeddings, MatchSettings::default());

        let mut job = make_job(1, "AppSec Engineer", "");
        job.tools = strings(&["Burp Suite"]);
        let jobs = catalog(vec![job]);
        let profile = CandidateProfile {
            tools: strings(&["burp suite pro"]),
            ..CandidateProfile::default()
        };

        let result = &engine.run(&profile, jobs.jobs()).all_roles[0];
        let tools = &result.categories[&Category::Tools];
        assert_eq!(tools.green, vec!["burp suite"]);
        assert_eq!(tools.yellow, vec!["burp suite pro"]);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn test_percentage_always_within_bounds() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let mut job = make_job(1, "Mixed", "2");
        job.skills = strings(&["pentest", "osint", "reporting"]);
        job.databases = strings(&["postgres"]);
        let jobs = catalog(vec![job]);
        let profile = CandidateProfile {
            skills: strings(&["penetration testing"]),
            years_of_experience: "1".into(),
            ..CandidateProfile::default()
        };

        let result = &engine.run(&profile, jobs.jobs()).all_roles;
        assert!(result.is_empty(), "job requiring 2 years filtered for a 1-year candidate");

        let relaxed = make_engine(
            EmbeddingStore::new(),
            MatchSettings {
                strict_experience_filter: false,
            },
        );
        let result = &relaxed.run(&profile, jobs.jobs()).all_roles[0];
        // skills 1/3, databases 0, experience 0.5 → 27.8
        assert_eq!(result.percentage, 28);
        assert!(result.percentage <= 100);
    }

    #[test]
    fn test_result_serializes_category_keys() {
        let engine = make_engine(EmbeddingStore::new(), MatchSettings::default());
        let mut job = make_job(7, "Admin", "");
        job.operating_systems = strings(&["linux"]);
        let jobs = catalog(vec![job]);
        let profile = CandidateProfile {
            operating_systems: strings(&["Linux"]),
            ..CandidateProfile::default()
        };

        let results = engine.run(&profile, jobs.jobs());
        let json = serde_json::to_value(&results).unwrap();
        let first = &json["all_roles"][0];
        assert_eq!(first["job_id"], 7);
        assert_eq!(first["status"], "qualified");
        assert_eq!(first["categories"]["operating_systems"]["green"][0], "linux");
    }

    #[test]
    fn test_profile_deserializes_camel_case_payload() {
        let profile: CandidateProfile = serde_json::from_value(serde_json::json!({
            "skills": ["Pentest"],
            "operatingSystems": ["Kali Linux"],
            "codingLanguages": ["Python", 3],
            "yearsOfExperience": "3-5"
        }))
        .unwrap();

        assert_eq!(profile.operating_systems, vec!["Kali Linux"]);
        assert_eq!(profile.coding_languages, vec!["Python", "3"]);
        assert_eq!(profile.years_of_experience.years(), 3.0);
    }
}
