//! Experience Scorer — years-of-experience parsing and partial-credit scoring.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::matching::CategoryContribution;

/// A stated years-of-experience value as it arrives from a job file or client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum YearsOfExperience {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl YearsOfExperience {
    /// Single non-negative number of years. Unparseable values are 0.
    pub fn years(&self) -> f64 {
        match self {
            YearsOfExperience::Number(n) => sanitize(*n),
            YearsOfExperience::Text(s) => parse_years(s),
            YearsOfExperience::Missing => 0.0,
        }
    }
}

impl From<&str> for YearsOfExperience {
    fn from(s: &str) -> Self {
        YearsOfExperience::Text(s.to_string())
    }
}

impl From<f64> for YearsOfExperience {
    fn from(n: f64) -> Self {
        YearsOfExperience::Number(n)
    }
}

impl<'de> Deserialize<'de> for YearsOfExperience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Anything that is not a number or string is treated as "not stated".
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n
                .as_f64()
                .map(YearsOfExperience::Number)
                .unwrap_or_default(),
            Some(Value::String(s)) => YearsOfExperience::Text(s),
            _ => YearsOfExperience::Missing,
        })
    }
}

fn sanitize(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}

/// Parses free-form years: `"4"`, `"2.5"`, `"3-5"` → 3, `"5+"` → 5, `"10 years"` → 10.
///
/// A plain decimal is taken as-is; otherwise the first run of digits is used.
/// Anything else, including negatives and non-finite values, is 0.
pub fn parse_years(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let is_plain_decimal = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.');
    if is_plain_decimal {
        if let Ok(n) = trimmed.parse::<f64>() {
            return sanitize(n);
        }
    }

    let digits: String = trimmed
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().map(f64::from).unwrap_or(0.0)
}

/// Result of comparing a job's requirement with the candidate's years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExperienceScore {
    /// 0 – 10
    pub score: f64,
    pub contributes: bool,
    pub job_years: f64,
}

impl ExperienceScore {
    pub fn contribution(&self) -> CategoryContribution {
        CategoryContribution {
            score: self.score,
            contributes: self.contributes,
        }
    }
}

/// Full credit when the candidate meets the requirement, proportional credit otherwise.
/// When either side is 0 the category is excluded from the aggregate.
pub fn score_experience(job_years: f64, candidate_years: f64) -> ExperienceScore {
    let job_years = sanitize(job_years);
    let candidate_years = sanitize(candidate_years);

    if job_years == 0.0 || candidate_years == 0.0 {
        return ExperienceScore {
            score: 0.0,
            contributes: false,
            job_years,
        };
    }

    let score = if candidate_years >= job_years {
        10.0
    } else {
        (candidate_years / job_years) * 10.0
    };

    ExperienceScore {
        score,
        contributes: true,
        job_years,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Role-date totals
// ────────────────────────────────────────────────────────────────────────────

/// `YYYY-MM` or `YYYY` → (year, month). A bare year counts as mid-year.
fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let raw = raw.trim();
    let (year, month) = match raw.split_once('-') {
        Some((y, m)) if (1..=2).contains(&m.len()) => (y, m.parse::<u32>().ok()?),
        Some(_) => return None,
        None => (raw, 6),
    };
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year.parse().ok()?, month))
}

fn month_index((year, month): (i32, u32)) -> i64 {
    year as i64 * 12 + month as i64
}

/// Total years across roles, rounded to one decimal.
///
/// Each role is `(start_date, end_date)`. Roles without a parseable start are
/// ignored; a missing or unparseable end means `today`. Both endpoints count as
/// worked months. Returns `None` when no role contributes any months.
pub fn total_years_from_roles<'a, I>(roles: I, today: NaiveDate) -> Option<f64>
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let current = (today.year(), today.month());

    let total_months: i64 = roles
        .into_iter()
        .filter_map(|(start, end)| {
            let start = parse_year_month(start?)?;
            let end = end.and_then(parse_year_month).unwrap_or(current);
            Some((month_index(end) - month_index(start) + 1).max(0))
        })
        .sum();

    if total_months == 0 {
        return None;
    }
    Some(((total_months as f64 / 12.0) * 10.0).round() / 10.0)
}
