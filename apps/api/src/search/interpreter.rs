//! Query Interpreter & Candidate Scorer.
//!
//! Turns a `ParsedQuery` plus an in-memory candidate population into a ranked,
//! explainable list. Pure: no I/O, no shared state.
//!
//! Pipeline:
//! 1. target skills = explicit ∪ category skills; nothing to search on → empty result + guidance
//! 2. pre-filter: owns ≥ 1 target skill, location, availability
//! 3. per-skill points (full / banded partial / 0) against the experience basis
//! 4. combine: AND sums dimensions, OR keeps the best one
//! 5. drop 0 % candidates, rank by percentage (or by name when no skills were asked for)

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::policy::{clamp_percentage, BandTable, ScoringPolicy};
use crate::models::employee::{EmployeeProfile, EmployeeSkill};
use crate::search::parsed_query::{ExperienceBasis, ParsedQuery};

pub const INSUFFICIENT_CRITERIA_MESSAGE: &str = "No skills, location or availability could be detected in the query. \
     Try naming a skill, e.g. \"Python developers with 3+ years\".";

static DISJUNCTION_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(or|either)\b").expect("valid regex"));
static SLASH_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*/\s*").expect("valid regex"));

/// How per-skill scores combine into one candidate score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combination {
    /// Every skill contributes (sum).
    #[default]
    And,
    /// Only the best skill counts (max).
    Or,
}

/// Infers AND/OR semantics from the raw query wording.
///
/// "or", "either", or a slash between two target skills ("React/Angular")
/// switch to OR; everything else is AND.
pub fn infer_combination(query_text: &str, target_skills: &[String]) -> Combination {
    if DISJUNCTION_WORDS.is_match(query_text) {
        return Combination::Or;
    }

    let compact = SLASH_SPACING.replace_all(&query_text.to_lowercase(), "/").into_owned();
    let lowered: Vec<String> = target_skills.iter().map(|s| s.to_lowercase()).collect();
    for a in &lowered {
        for b in &lowered {
            if a != b && compact.contains(&format!("{a}/{b}")) {
                return Combination::Or;
            }
        }
    }

    Combination::And
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagStatus {
    Match,
    Partial,
    Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTag {
    pub skill_name: String,
    pub years_of_experience: f64,
    pub proficiency_level: String,
    pub match_status: TagStatus,
    pub last_used_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub employee_id: i32,
    pub full_name: String,
    pub email: String,
    pub designation: Option<String>,
    pub location: Option<String>,
    pub team_name: Option<String>,
    pub department: Option<String>,
    pub availability_status: String,
    pub years_of_experience: f64,
    pub match_percentage: f64,
    pub skill_tags: Vec<SkillTag>,
    /// Experience basis used for this result, for display.
    pub experience_context: Option<ExperienceBasis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidates {
    pub candidates: Vec<ScoredCandidate>,
    pub combination: Combination,
    /// False for pure location/availability searches.
    pub skills_scored: bool,
    pub insufficient_criteria: bool,
    pub message: Option<String>,
}

impl RankedCandidates {
    fn insufficient(combination: Combination) -> Self {
        Self {
            candidates: vec![],
            combination,
            skills_scored: false,
            insufficient_criteria: true,
            message: Some(INSUFFICIENT_CRITERIA_MESSAGE.to_string()),
        }
    }
}

/// What a years constraint compares for one skill.
#[derive(Debug, Clone, Copy, PartialEq)]
enum YearsBasis {
    /// Constraint belongs to another skill; ownership is enough.
    PresenceOnly,
    SkillSpecific(f64),
    Total(f64),
}

/// Which target skills a skill-specific years constraint binds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YearsScope {
    /// The context skill, or the first target skill when none is named.
    #[default]
    Anchored,
    /// Every target skill against its own years.
    EachSkill,
}

/// Per-query scoring context shared by every candidate.
struct SkillScorer<'a> {
    query: &'a ParsedQuery,
    policy: &'a ScoringPolicy,
    /// Context skill, when the context names one of the target skills.
    anchor: Option<String>,
}

impl<'a> SkillScorer<'a> {
    fn new(
        query: &'a ParsedQuery,
        targets: &[String],
        scope: YearsScope,
        policy: &'a ScoringPolicy,
    ) -> Self {
        let anchor = match (query.experience_basis(), scope) {
            (ExperienceBasis::SkillSpecific, YearsScope::Anchored) => match query.context_skill() {
                Some(named) => targets
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(named))
                    .then(|| named.to_string()),
                None => targets.first().cloned(),
            },
            _ => None,
        };
        Self {
            query,
            policy,
            anchor,
        }
    }

    fn has_constraint(&self) -> bool {
        self.query.min_years().is_some() || self.query.max_years().is_some()
    }

    fn basis_for(&self, candidate: &EmployeeProfile, skill: &EmployeeSkill) -> YearsBasis {
        match self.query.experience_basis() {
            ExperienceBasis::Total => YearsBasis::Total(candidate.employee.years_of_experience),
            ExperienceBasis::SkillSpecific => match &self.anchor {
                Some(anchor) if !anchor.eq_ignore_ascii_case(&skill.skill_name) => {
                    YearsBasis::PresenceOnly
                }
                _ => YearsBasis::SkillSpecific(skill.years_of_experience),
            },
        }
    }

    fn meets_bounds(&self, years: f64) -> bool {
        let min_ok = self
            .query
            .min_years()
            .map(|min| self.query.experience_operator.holds(years, min))
            .unwrap_or(true);
        let max_ok = self.query.max_years().map(|max| years <= max).unwrap_or(true);
        min_ok && max_ok
    }

    fn ratio(&self, years: f64) -> f64 {
        match (self.query.min_years(), self.query.max_years()) {
            (Some(min), _) => years / min,
            (None, Some(max)) if years > 0.0 => max / years,
            _ => 1.0,
        }
    }

    fn banded(&self, years: f64, bands: &BandTable) -> f64 {
        if self.meets_bounds(years) {
            self.policy.full_points
        } else {
            bands.points(self.ratio(years))
        }
    }

    /// Points (0..=full) for one target skill.
    fn skill_points(&self, candidate: &EmployeeProfile, skill_name: &str) -> f64 {
        let Some(owned) = candidate.skill_named(skill_name) else {
            return 0.0;
        };
        if !self.has_constraint() {
            return self.policy.full_points;
        }
        match self.basis_for(candidate, owned) {
            YearsBasis::PresenceOnly => self.policy.full_points,
            YearsBasis::SkillSpecific(years) => {
                self.banded(years, &self.policy.skill_specific_bands)
            }
            YearsBasis::Total(years) => self.banded(years, &self.policy.total_experience_bands),
        }
    }

    fn tag_status(&self, candidate: &EmployeeProfile, skill: &EmployeeSkill, targets: &[String]) -> TagStatus {
        if !targets.iter().any(|t| t.eq_ignore_ascii_case(&skill.skill_name)) {
            return TagStatus::Extra;
        }
        match self.basis_for(candidate, skill) {
            YearsBasis::SkillSpecific(years) if self.has_constraint() && !self.meets_bounds(years) => {
                TagStatus::Partial
            }
            _ => TagStatus::Match,
        }
    }
}

/// Scores and ranks `candidates` against `query`.
pub fn rank_candidates(
    query: &ParsedQuery,
    combination: Combination,
    candidates: &[EmployeeProfile],
    policy: &ScoringPolicy,
) -> RankedCandidates {
    rank_candidates_scoped(query, combination, YearsScope::Anchored, candidates, policy)
}

/// `rank_candidates` with an explicit scope for skill-specific years.
pub fn rank_candidates_scoped(
    query: &ParsedQuery,
    combination: Combination,
    scope: YearsScope,
    candidates: &[EmployeeProfile],
    policy: &ScoringPolicy,
) -> RankedCandidates {
    let targets = query.target_skills();
    let location = query.location_filter();
    let availability = query.availability_filter();

    if targets.is_empty() && location.is_none() && availability.is_none() {
        debug!("No usable search criteria in parsed query");
        return RankedCandidates::insufficient(combination);
    }

    let filtered: Vec<&EmployeeProfile> = candidates
        .iter()
        .filter(|c| matches_filter(c.employee.location.as_deref(), location))
        .filter(|c| matches_filter(Some(c.employee.availability_status.as_str()), availability))
        .filter(|c| targets.is_empty() || targets.iter().any(|t| c.skill_named(t).is_some()))
        .collect();

    debug!(
        total = candidates.len(),
        prefiltered = filtered.len(),
        "Candidate pre-filter applied"
    );

    let scorer = SkillScorer::new(query, &targets, scope, policy);
    let context = query.experience_context.as_ref().map(|c| c.kind);

    if targets.is_empty() {
        let mut ranked = list_by_name(filtered, &scorer, context);
        ranked.combination = combination;
        return ranked;
    }

    let explicit = query.explicit_skills();
    let category_only = query.category_only_skills();

    let mut results: Vec<ScoredCandidate> = Vec::new();
    for candidate in filtered {
        let percentage = candidate_percentage(candidate, &scorer, &explicit, &category_only, combination);
        if percentage <= 0.0 {
            debug!(employee_id = candidate.employee.employee_id, "Excluded: 0% match");
            continue;
        }
        debug!(
            employee_id = candidate.employee.employee_id,
            match_percentage = percentage,
            "Candidate scored"
        );
        results.push(to_scored(candidate, percentage, &scorer, &targets, context));
    }

    results.sort_by(|a, b| {
        b.match_percentage
            .total_cmp(&a.match_percentage)
            .then_with(|| a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()))
            .then(a.employee_id.cmp(&b.employee_id))
    });

    RankedCandidates {
        candidates: results,
        combination,
        skills_scored: true,
        insufficient_criteria: false,
        message: None,
    }
}

/// Lists candidates without skill scoring: 0 %, every tag `Extra`, by name.
///
/// Used for searches that only filter (location, availability, team).
pub fn list_unscored(candidates: &[EmployeeProfile], policy: &ScoringPolicy) -> RankedCandidates {
    let query = ParsedQuery::default();
    let scorer = SkillScorer::new(&query, &[], YearsScope::default(), policy);
    list_by_name(candidates.iter().collect(), &scorer, None)
}

fn list_by_name(
    candidates: Vec<&EmployeeProfile>,
    scorer: &SkillScorer<'_>,
    context: Option<ExperienceBasis>,
) -> RankedCandidates {
    let mut results: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|c| to_scored(c, 0.0, scorer, &[], context))
        .collect();
    results.sort_by(|a, b| {
        a.full_name
            .to_lowercase()
            .cmp(&b.full_name.to_lowercase())
            .then(a.employee_id.cmp(&b.employee_id))
    });
    RankedCandidates {
        candidates: results,
        combination: Combination::And,
        skills_scored: false,
        insufficient_criteria: false,
        message: None,
    }
}

fn candidate_percentage(
    candidate: &EmployeeProfile,
    scorer: &SkillScorer<'_>,
    explicit: &[String],
    category_only: &[String],
    combination: Combination,
) -> f64 {
    let full = scorer.policy.full_points;
    let explicit_scores: Vec<f64> = explicit
        .iter()
        .map(|s| scorer.skill_points(candidate, s))
        .collect();
    let explicit_hit = explicit_scores.iter().any(|p| *p > 0.0);

    // Category matches only count once a named skill already matched
    let category_score = if category_only.is_empty() {
        None
    } else if explicit.is_empty() || explicit_hit {
        Some(
            category_only
                .iter()
                .map(|s| scorer.skill_points(candidate, s))
                .fold(0.0, f64::max),
        )
    } else {
        Some(0.0)
    };

    let (total, max_possible) = match combination {
        Combination::And => {
            let dims = explicit.len() + usize::from(category_score.is_some());
            let total = explicit_scores.iter().sum::<f64>() + category_score.unwrap_or(0.0);
            (total, full * dims as f64)
        }
        Combination::Or => {
            let best = explicit_scores
                .iter()
                .copied()
                .chain(category_score)
                .fold(0.0, f64::max)
                .min(full);
            (best, full)
        }
    };

    if max_possible > 0.0 {
        clamp_percentage(total / max_possible * 100.0, 1)
    } else {
        0.0
    }
}

fn matches_filter(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => value
            .map(|v| v.trim().eq_ignore_ascii_case(wanted))
            .unwrap_or(false),
    }
}

fn to_scored(
    candidate: &EmployeeProfile,
    match_percentage: f64,
    scorer: &SkillScorer<'_>,
    targets: &[String],
    experience_context: Option<ExperienceBasis>,
) -> ScoredCandidate {
    let employee = &candidate.employee;
    ScoredCandidate {
        employee_id: employee.employee_id,
        full_name: employee.full_name.clone(),
        email: employee.email.clone(),
        designation: employee.designation.clone(),
        location: employee.location.clone(),
        team_name: employee.team_name.clone(),
        department: employee.department.clone(),
        availability_status: employee.availability_status.clone(),
        years_of_experience: employee.years_of_experience,
        match_percentage,
        skill_tags: candidate
            .skills
            .iter()
            .map(|s| SkillTag {
                skill_name: s.skill_name.clone(),
                years_of_experience: s.years_of_experience,
                proficiency_level: s
                    .proficiency_level
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                match_status: scorer.tag_status(candidate, s, targets),
                last_used_date: s.last_used_date,
            })
            .collect(),
        experience_context,
    }
}
