//! Resume pipeline — extracted payload → categorized canonical skills → matches.
//!
//! Steps:
//! 1. Flatten every raw list to lowercase strings (certifications get their labels cleaned)
//! 2. Move operating systems filed under skills/tools into their own category
//! 3. Normalize each category through the taxonomy; a term neither the taxonomy nor
//!    any catalog job knows in that category is reported as unmapped
//! 4. Derive years of experience from role dates, falling back to the stated total
//! 5. Run the matching engine on the resulting candidate profile

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::JobCatalog;
use crate::extraction::flatten::{
    clean_certification_label, flatten_preserving_case, flatten_terms, lenient_string,
    lenient_terms, rebalance_operating_systems, RawTerm,
};
use crate::matching::engine::{CandidateProfile, MatchResultSet, MatchingEngine};
use crate::matching::experience::{total_years_from_roles, YearsOfExperience};
use crate::taxonomy::normalizer::dedup;
use crate::taxonomy::{Category, Taxonomy, TermNormalizer};

/// Domain reported when no role title is available.
pub const DEFAULT_DOMAIN: &str = "General";

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedRole {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, alias = "startDate", deserialize_with = "lenient_date")]
    pub start_date: Option<String>,
    #[serde(default, alias = "endDate", deserialize_with = "lenient_date")]
    pub end_date: Option<String>,
}

/// Structured fields pulled out of a resume by an upstream extractor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedResume {
    #[serde(default, deserialize_with = "lenient_terms")]
    pub skills: Vec<RawTerm>,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub tools: Vec<RawTerm>,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub certifications: Vec<RawTerm>,
    #[serde(default, alias = "programmingLanguages", deserialize_with = "lenient_terms")]
    pub programming_languages: Vec<RawTerm>,
    #[serde(default, deserialize_with = "lenient_terms")]
    pub databases: Vec<RawTerm>,
    #[serde(default, alias = "operatingSystems", deserialize_with = "lenient_terms")]
    pub operating_systems: Vec<RawTerm>,
    #[serde(default, deserialize_with = "lenient_roles")]
    pub roles: Vec<ExtractedRole>,
    #[serde(default, alias = "totalYearsExperience")]
    pub total_years_experience: YearsOfExperience,
}

impl ExtractedResume {
    /// True when the payload carries nothing to match on.
    pub fn is_empty(&self) -> bool {
        let no_terms = [
            &self.skills,
            &self.tools,
            &self.certifications,
            &self.programming_languages,
            &self.databases,
            &self.operating_systems,
        ]
        .iter()
        .all(|list| flatten_preserving_case(list).is_empty());

        no_terms && self.roles.is_empty() && self.total_years_experience.years() == 0.0
    }
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<ExtractedRole>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let date = lenient_string(deserializer)?;
    Ok((!date.is_empty()).then_some(date))
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorizedSkills {
    pub programming_languages: Vec<String>,
    pub tools: Vec<String>,
    pub certifications: Vec<String>,
    pub databases: Vec<String>,
    pub operating_systems: Vec<String>,
    pub general_skills: Vec<String>,
}

impl CategorizedSkills {
    pub fn into_profile(self, years: f64) -> CandidateProfile {
        CandidateProfile {
            skills: self.general_skills,
            certifications: self.certifications,
            tools: self.tools,
            databases: self.databases,
            operating_systems: self.operating_systems,
            coding_languages: self.programming_languages,
            years_of_experience: YearsOfExperience::Number(years),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub categorized_skills: CategorizedSkills,
    /// Terms neither the taxonomy nor any catalog job knows in their category.
    pub unmapped_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub total_experience: f64,
    pub inferred_domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeAnalysis {
    pub profile_summary: ProfileSummary,
    pub categorized_skills: CategorizedSkills,
    pub unmapped_skills: Vec<String>,
    #[serde(flatten)]
    pub matches: MatchResultSet,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Flattens, rebalances and normalizes an extracted resume.
pub fn run_resume_pipeline(
    extracted: &ExtractedResume,
    taxonomy: &Taxonomy,
    catalog: &JobCatalog,
) -> PipelineOutput {
    let mut skills = flatten_terms(&extracted.skills);
    let mut tools = flatten_terms(&extracted.tools);
    let mut operating_systems = flatten_terms(&extracted.operating_systems);
    let certifications: Vec<String> = flatten_preserving_case(&extracted.certifications)
        .iter()
        .map(|label| clean_certification_label(label))
        .filter(|label| !label.is_empty())
        .collect();
    let programming_languages = flatten_terms(&extracted.programming_languages);
    let databases = flatten_terms(&extracted.databases);

    rebalance_operating_systems(&mut skills, &mut tools, &mut operating_systems);

    let cleaned = [
        (Category::Skills, skills),
        (Category::Tools, tools),
        (Category::Certifications, certifications),
        (Category::CodingLanguages, programming_languages),
        (Category::Databases, databases),
        (Category::OperatingSystems, operating_systems),
    ];

    let normalizer = TermNormalizer::new(taxonomy);

    let unmapped = dedup(cleaned.iter().flat_map(|(category, terms)| {
        terms
            .iter()
            .filter(|term| {
                normalizer.resolve(*category, term).is_none() && !catalog.mentions(*category, term)
            })
            .cloned()
            .collect::<Vec<_>>()
    }));

    let mut categorized = CategorizedSkills::default();
    for (category, terms) in &cleaned {
        let normalized = normalizer.normalize_all(*category, terms);
        match category {
            Category::Skills => categorized.general_skills = normalized,
            Category::Tools => categorized.tools = normalized,
            Category::Certifications => categorized.certifications = normalized,
            Category::CodingLanguages => categorized.programming_languages = normalized,
            Category::Databases => categorized.databases = normalized,
            Category::OperatingSystems => categorized.operating_systems = normalized,
            Category::Degree => {}
        }
    }

    debug!(unmapped = unmapped.len(), "Resume pipeline normalized terms");

    PipelineOutput {
        categorized_skills: categorized,
        unmapped_skills: unmapped,
    }
}

/// Role-derived years when any role has usable dates, else the stated total.
pub fn resolve_years(extracted: &ExtractedResume, today: NaiveDate) -> f64 {
    let roles = extracted
        .roles
        .iter()
        .map(|role| (role.start_date.as_deref(), role.end_date.as_deref()));
    total_years_from_roles(roles, today).unwrap_or_else(|| extracted.total_years_experience.years())
}

pub fn infer_domain(extracted: &ExtractedResume) -> String {
    extracted
        .roles
        .first()
        .map(|role| role.title.trim())
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_DOMAIN)
        .to_string()
}

/// Full resume analysis: pipeline, profile summary and ranked matches.
pub fn analyze_resume(
    extracted: &ExtractedResume,
    engine: &MatchingEngine,
    catalog: &JobCatalog,
    today: NaiveDate,
) -> ResumeAnalysis {
    let PipelineOutput {
        categorized_skills,
        unmapped_skills,
    } = run_resume_pipeline(extracted, engine.taxonomy(), catalog);

    let years = resolve_years(extracted, today);
    let profile = categorized_skills.clone().into_profile(years);
    let matches = engine.run(&profile, catalog.jobs());

    ResumeAnalysis {
        profile_summary: ProfileSummary {
            total_experience: years,
            inferred_domain: infer_domain(extracted),
        },
        categorized_skills,
        unmapped_skills,
        matches,
    }
}
