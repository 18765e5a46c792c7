//! Keyword fallback used when the query-parsing service is unavailable.
//!
//! Cruder than the service: substring skill matching against the taxonomy,
//! one "N years" pattern, a fixed city list and two availability keywords.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::skill::TaxonomySkill;
use crate::search::parsed_query::{
    ExperienceBasis, ExperienceContext, ExperienceOperator, ParsedQuery,
};

static YEARS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)").expect("valid regex")
});

const KNOWN_LOCATIONS: [&str; 6] = ["bangalore", "chennai", "mumbai", "hyderabad", "delhi", "pune"];

const AVAILABILITY_KEYWORDS: [&str; 2] = ["available", "full time"];

/// Builds a best-effort `ParsedQuery` from raw text.
pub fn fallback_parse(text: &str, taxonomy: &[TaxonomySkill]) -> ParsedQuery {
    let lowered = text.to_lowercase();

    let skills = detect_skills(&lowered, taxonomy);
    let min_years = detect_years(text);

    let experience_context = min_years.map(|_| {
        if skills.is_empty() {
            ExperienceContext {
                kind: ExperienceBasis::Total,
                skill: None,
                reason: Some("no skill mentioned alongside the years".to_string()),
            }
        } else {
            ExperienceContext {
                kind: ExperienceBasis::SkillSpecific,
                skill: None,
                reason: Some("years mentioned together with skills".to_string()),
            }
        }
    });

    let location = KNOWN_LOCATIONS
        .iter()
        .find(|city| lowered.contains(*city))
        .map(|city| capitalize(city));

    let availability_status = AVAILABILITY_KEYWORDS
        .iter()
        .any(|k| lowered.contains(k))
        .then(|| "Available".to_string());

    ParsedQuery {
        skills,
        min_years_experience: min_years,
        experience_operator: ExperienceOperator::Gte,
        experience_context,
        location,
        availability_status,
        ..Default::default()
    }
}

/// Canonical names of taxonomy skills whose name or alias occurs in `lowered`.
fn detect_skills(lowered: &str, taxonomy: &[TaxonomySkill]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for skill in taxonomy {
        let hit = std::iter::once(&skill.skill_name)
            .chain(skill.aliases.iter())
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .any(|n| lowered.contains(n.as_str()));
        if hit && !found.iter().any(|f| f.eq_ignore_ascii_case(&skill.skill_name)) {
            found.push(skill.skill_name.clone());
        }
    }
    found
}

fn detect_years(text: &str) -> Option<f64> {
    YEARS_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
