//! Boundary adapter: loosely-typed extraction values → clean string arrays.
//!
//! Upstream producers (the resume extractor, hand-edited job files) emit strings,
//! numbers, `{ "name": ... }` objects, or nested lists where a plain string is
//! expected. Everything is resolved here, once, so the matching core only ever
//! sees `Vec<String>`.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

use crate::taxonomy::term_key;

/// String form produced by naive object stringification upstream.
const OBJECT_PLACEHOLDER: &str = "[object object]";

/// Object fields consulted, in order, when a term arrives as an object.
const NAME_FIELDS: &[&str] = &["name", "title", "value", "label", "code", "id"];

/// Operating systems that extractors commonly file under skills or tools.
pub const KNOWN_OPERATING_SYSTEMS: &[&str] = &[
    "kali",
    "kali linux",
    "kali linux rolling",
    "linux",
    "windows",
    "ubuntu",
    "macos",
    "unix",
    "debian",
    "centos",
    "red hat",
    "redhat",
    "fedora",
    "parrot os",
    "parrot",
    "freebsd",
];

/// A single raw value where a term is expected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTerm {
    Text(String),
    Number(Number),
    Flag(bool),
    Named(Map<String, Value>),
    Nested(Vec<RawTerm>),
    Null,
}

impl RawTerm {
    /// Trimmed string form; empty when nothing usable is present.
    pub fn flatten(&self) -> String {
        let text = match self {
            RawTerm::Text(s) => s.trim().to_string(),
            RawTerm::Number(n) => n.to_string(),
            RawTerm::Flag(b) => b.to_string(),
            RawTerm::Named(fields) => NAME_FIELDS
                .iter()
                .filter_map(|field| fields.get(*field))
                .find_map(|value| match value {
                    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .unwrap_or_default(),
            RawTerm::Nested(items) => items.first().map(RawTerm::flatten).unwrap_or_default(),
            RawTerm::Null => String::new(),
        };

        if text.eq_ignore_ascii_case(OBJECT_PLACEHOLDER) {
            String::new()
        } else {
            text
        }
    }
}

/// Flattens each item (case preserved), dropping empties.
pub fn flatten_preserving_case(items: &[RawTerm]) -> Vec<String> {
    items
        .iter()
        .map(RawTerm::flatten)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Flattens each item to lowercase trimmed text, dropping empties.
pub fn flatten_terms(items: &[RawTerm]) -> Vec<String> {
    items
        .iter()
        .map(|item| term_key(&item.flatten()))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Accepts any JSON where a list of terms is expected. Non-arrays and `null`
/// become an empty list; elements are kept as `RawTerm`.
pub fn lenient_terms<'de, D>(deserializer: D) -> Result<Vec<RawTerm>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Like `lenient_terms`, flattened straight to trimmed strings (case preserved).
pub fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_terms(deserializer).map(|items| flatten_preserving_case(&items))
}

/// Accepts a string, number, named object or `null` where a single string is expected.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value::<RawTerm>(v).ok())
        .map(|term| term.flatten())
        .unwrap_or_default())
}

/// Reduces a certification label to the short form jobs use.
///
/// `"INE – eJPT (Junior Penetration Tester)"` → `"ejpt"`: parenthetical qualifiers
/// are removed, then a leading `"<issuer> – "` or `"<issuer> - "` prefix.
pub fn clean_certification_label(raw: &str) -> String {
    let lowered = term_key(raw);
    if lowered.is_empty() || lowered == OBJECT_PLACEHOLDER {
        return String::new();
    }

    let without_parens = strip_parentheticals(&lowered);

    let cleaned = match without_parens.find(['–', '-']) {
        // An issuer prefix needs text on both sides of the dash.
        Some(idx) if idx > 0 => {
            let dash_len = without_parens[idx..].chars().next().map_or(1, char::len_utf8);
            let rest = without_parens[idx + dash_len..].trim();
            if rest.is_empty() {
                without_parens.clone()
            } else {
                rest.to_string()
            }
        }
        _ => without_parens.clone(),
    };

    cleaned.trim().to_string()
}

fn strip_parentheticals(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Moves known operating-system terms out of `skills` and `tools` into `operating_systems`.
///
/// Inputs are expected lowercased (see `flatten_terms`). The OS list is deduplicated.
pub fn rebalance_operating_systems(
    skills: &mut Vec<String>,
    tools: &mut Vec<String>,
    operating_systems: &mut Vec<String>,
) {
    let mut moved = Vec::new();
    for list in [&mut *tools, &mut *skills] {
        list.retain(|term| {
            if KNOWN_OPERATING_SYSTEMS.contains(&term.as_str()) {
                moved.push(term.clone());
                false
            } else {
                true
            }
        });
    }

    operating_systems.extend(moved);
    let merged = crate::taxonomy::normalizer::dedup(operating_systems.drain(..));
    *operating_systems = merged;
}
