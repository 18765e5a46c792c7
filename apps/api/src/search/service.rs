//! Search orchestration: parse (or fall back), fetch candidates, rank, and
//! keep the user's search history.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::policy::ScoringPolicy;
use crate::models::application::{NewSearchHistory, SearchHistoryRow};
use crate::nlp_client::{NlpError, QueryParser};
use crate::search::fallback::fallback_parse;
use crate::search::interpreter::{infer_combination, rank_candidates, Combination, ScoredCandidate};
use crate::search::parsed_query::{ExperienceBasis, ExperienceOperator, ParsedQuery};
use crate::search::structured::{rank_structured, CandidatePage, StructuredCriteria};
use crate::store::{EmployeeFilter, TalentStore};

pub const FALLBACK_NOTICE: &str = "Fallback search used (query parser unavailable)";
pub const ANY_SKILL_NOTICE: &str = "Match any of the listed skills";
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;
pub const MAX_QUERY_LENGTH: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaturalLanguageRequest {
    pub query: String,
    /// When set, the search is recorded in this employee's history.
    #[serde(default)]
    pub searched_by_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub original_query: String,
    pub parsed_query: ParsedQuery,
    pub applied_filters: Vec<String>,
    pub combination: Combination,
    pub candidates: Vec<ScoredCandidate>,
    pub total_count: usize,
    /// True when the keyword fallback stood in for the parsing service.
    pub degraded: bool,
    pub insufficient_criteria: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSearchRequest {
    pub searched_by_id: i32,
    pub saved_search_name: String,
    pub search_query: String,
    #[serde(default)]
    pub filters: Value,
    #[serde(default)]
    pub result_count: i32,
}

/// Runs a free-text search end to end.
///
/// Parser trouble of any kind (unhealthy, transport error, timeout, or an
/// error in its payload) degrades to the keyword fallback instead of failing.
#[tracing::instrument(skip(store, parser, policy))]
pub async fn natural_language_search(
    store: &dyn TalentStore,
    parser: &dyn QueryParser,
    policy: &ScoringPolicy,
    parse_timeout: Duration,
    text: &str,
) -> Result<SearchOutcome, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Search query must not be empty".into()));
    }
    if text.chars().count() > MAX_QUERY_LENGTH {
        return Err(AppError::Validation(format!(
            "Search query must be at most {MAX_QUERY_LENGTH} characters"
        )));
    }

    let (parsed, degraded) = match parse_with_parser(parser, parse_timeout, text).await {
        Ok(parsed) => (parsed, false),
        Err(e) => {
            warn!("Query parser unavailable, using keyword fallback: {e}");
            let taxonomy = store.fetch_skill_taxonomy().await?;
            (fallback_parse(text, &taxonomy), true)
        }
    };

    let targets = parsed.target_skills();
    let combination = infer_combination(text, &targets);

    let filter = EmployeeFilter {
        location: parsed.location_filter().map(str::to_string),
        availability_status: parsed.availability_filter().map(str::to_string),
        any_skills: targets.clone(),
        ..Default::default()
    };
    let nothing_to_search =
        targets.is_empty() && filter.location.is_none() && filter.availability_status.is_none();
    let candidates = if nothing_to_search {
        vec![]
    } else {
        store.fetch_candidates(&filter).await?
    };

    let ranked = rank_candidates(&parsed, combination, &candidates, policy);
    let applied_filters = build_applied_filters(&parsed, combination, degraded);

    info!(
        degraded,
        ?combination,
        results = ranked.candidates.len(),
        "Natural-language search complete"
    );

    Ok(SearchOutcome {
        original_query: text.to_string(),
        parsed_query: parsed,
        applied_filters,
        combination,
        total_count: ranked.candidates.len(),
        candidates: ranked.candidates,
        degraded,
        insufficient_criteria: ranked.insufficient_criteria,
        message: ranked.message,
    })
}

async fn parse_with_parser(
    parser: &dyn QueryParser,
    parse_timeout: Duration,
    text: &str,
) -> Result<ParsedQuery, NlpError> {
    if !parser.health_check().await {
        return Err(NlpError::Unhealthy);
    }
    match tokio::time::timeout(parse_timeout, parser.parse(text)).await {
        Ok(result) => result.map(|r| r.parsed),
        Err(_) => Err(NlpError::Timeout(parse_timeout)),
    }
}

/// Searches with form-style criteria.
#[tracing::instrument(skip(store, policy))]
pub async fn structured_search(
    store: &dyn TalentStore,
    policy: &ScoringPolicy,
    criteria: &StructuredCriteria,
) -> Result<CandidatePage, AppError> {
    criteria.validate()?;

    let skills = if criteria.skill_ids.is_empty() {
        criteria.resolved_skills(&[])
    } else {
        let taxonomy = store.fetch_skill_taxonomy().await?;
        criteria.resolved_skills(&taxonomy)
    };

    let candidates = if skills.is_empty() && criteria.requests_skills() {
        warn!(skill_ids = ?criteria.skill_ids, "No requested skill resolved through the taxonomy");
        vec![]
    } else {
        store.fetch_candidates(&criteria.to_filter(&skills)).await?
    };
    let page = rank_structured(criteria, skills, &candidates, policy);

    info!(
        total = page.total_count,
        page = page.page_number,
        "Structured search complete"
    );
    Ok(page)
}

/// Human-readable description of what the search actually filtered on.
pub fn build_applied_filters(
    parsed: &ParsedQuery,
    combination: Combination,
    degraded: bool,
) -> Vec<String> {
    let mut filters = Vec::new();

    let explicit = parsed.explicit_skills();
    if !explicit.is_empty() {
        filters.push(format!("Skills: {}", explicit.join(", ")));
    }
    if !parsed.categories.is_empty() {
        filters.push(format!("Categories: {}", parsed.categories.join(", ")));
    }
    if let Some(experience) = describe_experience(parsed) {
        filters.push(format!("Experience: {experience}"));
    }
    if let Some(location) = parsed.location_filter() {
        filters.push(format!("Location: {location}"));
    }
    if let Some(availability) = parsed.availability_filter() {
        filters.push(format!("Availability: {availability}"));
    }
    if !parsed.skill_levels.is_empty() {
        filters.push(format!("Level: {}", parsed.skill_levels.join(", ")));
    }
    if !parsed.roles.is_empty() {
        filters.push(format!("Roles: {}", parsed.roles.join(", ")));
    }
    if combination == Combination::Or && parsed.target_skills().len() > 1 {
        filters.push(ANY_SKILL_NOTICE.to_string());
    }
    if degraded {
        filters.push(FALLBACK_NOTICE.to_string());
    }
    filters
}

fn describe_experience(parsed: &ParsedQuery) -> Option<String> {
    let bound = match (parsed.min_years(), parsed.max_years()) {
        (Some(min), Some(max)) => format!("{}-{} years", years(min), years(max)),
        (Some(min), None) => match parsed.experience_operator {
            ExperienceOperator::Gte => format!("{}+ years", years(min)),
            ExperienceOperator::Gt => format!("more than {} years", years(min)),
            ExperienceOperator::Lt => format!("less than {} years", years(min)),
            ExperienceOperator::Lte => format!("up to {} years", years(min)),
            ExperienceOperator::Eq => format!("exactly {} years", years(min)),
        },
        (None, Some(max)) => format!("up to {} years", years(max)),
        (None, None) => return None,
    };

    let scope = match parsed.experience_basis() {
        ExperienceBasis::SkillSpecific => {
            let skills = match parsed.context_skill() {
                Some(skill) => skill.to_string(),
                None => parsed.explicit_skills().join(", "),
            };
            if skills.is_empty() {
                "total experience".to_string()
            } else {
                format!("in {skills}")
            }
        }
        ExperienceBasis::Total => "total experience".to_string(),
    };

    Some(format!("{bound} {scope}"))
}

fn years(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

// ── Search history ──────────────────────────────────────────────────────────

/// Records a completed free-text search. Failures are logged, never surfaced.
pub async fn record_search(store: &dyn TalentStore, searched_by_id: i32, outcome: &SearchOutcome) {
    let filters = serde_json::to_value(&outcome.parsed_query).unwrap_or(Value::Null);
    let entry = NewSearchHistory {
        searched_by_id,
        search_query: outcome.original_query.clone(),
        filters,
        result_count: outcome.total_count as i32,
        is_saved: false,
        saved_search_name: None,
    };
    if let Err(e) = store.insert_search_history(entry).await {
        warn!("Failed to record search history for {searched_by_id}: {e}");
    }
}

pub async fn search_history(
    store: &dyn TalentStore,
    searched_by_id: i32,
    limit: Option<i64>,
) -> Result<Vec<SearchHistoryRow>, AppError> {
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=100).contains(&limit) {
        return Err(AppError::Validation("limit must be between 1 and 100".into()));
    }
    store.fetch_search_history(searched_by_id, limit).await
}

pub async fn saved_searches(
    store: &dyn TalentStore,
    searched_by_id: i32,
) -> Result<Vec<SearchHistoryRow>, AppError> {
    store.fetch_saved_searches(searched_by_id).await
}

pub async fn save_search(
    store: &dyn TalentStore,
    request: SaveSearchRequest,
) -> Result<SearchHistoryRow, AppError> {
    let name = request.saved_search_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("saved_search_name must not be empty".into()));
    }
    let row = store
        .insert_search_history(NewSearchHistory {
            searched_by_id: request.searched_by_id,
            search_query: request.search_query.trim().to_string(),
            filters: request.filters,
            result_count: request.result_count.max(0),
            is_saved: true,
            saved_search_name: Some(name.to_string()),
        })
        .await?;
    info!("Saved search {} for employee {}", row.search_id, row.searched_by_id);
    Ok(row)
}

pub async fn delete_saved_search(store: &dyn TalentStore, search_id: i32) -> Result<(), AppError> {
    if store.delete_saved_search(search_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Saved search {search_id} not found")))
    }
}
