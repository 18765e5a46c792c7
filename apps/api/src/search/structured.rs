//! Structured criteria search: form-style filters ranked by the same
//! interpreter as free text, then sorted and paged.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::policy::ScoringPolicy;
use crate::models::employee::EmployeeProfile;
use crate::models::skill::TaxonomySkill;
use crate::search::interpreter::{
    list_unscored, rank_candidates_scoped, Combination, RankedCandidates, ScoredCandidate,
    YearsScope,
};
use crate::search::parsed_query::{ExperienceBasis, ExperienceContext, ParsedQuery};
use crate::store::EmployeeFilter;

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    MatchPercentage,
    Name,
    Experience,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredCriteria {
    pub skills: Vec<String>,
    /// Resolved to names through the taxonomy and merged into `skills`.
    pub skill_ids: Vec<i32>,
    pub min_years_experience: Option<f64>,
    pub location: Option<String>,
    pub availability_status: Option<String>,
    pub team_id: Option<i32>,
    pub department: Option<String>,
    pub sort_by: SortBy,
    pub sort_descending: bool,
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for StructuredCriteria {
    fn default() -> Self {
        Self {
            skills: vec![],
            skill_ids: vec![],
            min_years_experience: None,
            location: None,
            availability_status: None,
            team_id: None,
            department: None,
            sort_by: SortBy::MatchPercentage,
            sort_descending: true,
            page_number: 1,
            page_size: 20,
        }
    }
}

impl StructuredCriteria {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_number < 1 {
            return Err(AppError::Validation("page_number must be at least 1".into()));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.min_years_experience.is_some_and(|y| y < 0.0 || !y.is_finite()) {
            return Err(AppError::Validation(
                "min_years_experience must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// True when the criteria name any skill, by name or by id.
    pub fn requests_skills(&self) -> bool {
        !self.skill_ids.is_empty() || self.skills.iter().any(|s| !s.trim().is_empty())
    }

    /// Named skills plus skills resolved from `skill_ids`, de-duplicated.
    /// Unknown ids are ignored.
    pub fn resolved_skills(&self, taxonomy: &[TaxonomySkill]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let from_ids = self.skill_ids.iter().filter_map(|id| {
            taxonomy
                .iter()
                .find(|t| t.skill_id == *id)
                .map(|t| t.skill_name.clone())
        });
        for name in self.skills.iter().cloned().chain(from_ids) {
            let trimmed = name.trim();
            if !trimmed.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(trimmed)) {
                names.push(trimmed.to_string());
            }
        }
        names
    }

    /// Years in structured searches always refer to the listed skills.
    pub fn to_parsed_query(&self, skills: Vec<String>) -> ParsedQuery {
        let experience_context = self.min_years_experience.map(|_| ExperienceContext {
            kind: ExperienceBasis::SkillSpecific,
            skill: None,
            reason: Some("structured criteria".to_string()),
        });
        ParsedQuery {
            skills,
            min_years_experience: self.min_years_experience,
            experience_context,
            location: self.location.clone(),
            availability_status: self.availability_status.clone(),
            ..Default::default()
        }
    }

    pub fn to_filter(&self, skills: &[String]) -> EmployeeFilter {
        EmployeeFilter {
            location: self.location.clone(),
            availability_status: self.availability_status.clone(),
            team_id: self.team_id,
            department: self.department.clone(),
            any_skills: skills.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePage {
    pub candidates: Vec<ScoredCandidate>,
    pub total_count: usize,
    pub page_number: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Ranks pre-filtered `candidates` against `criteria`, then sorts and pages.
///
/// With no skills requested the listing is unscored: every candidate the
/// store returned, at 0 %. Requested skills that resolve to nothing match
/// nobody.
pub fn rank_structured(
    criteria: &StructuredCriteria,
    skills: Vec<String>,
    candidates: &[EmployeeProfile],
    policy: &ScoringPolicy,
) -> CandidatePage {
    if skills.is_empty() && criteria.requests_skills() {
        return paginate(vec![], criteria.page_number, criteria.page_size);
    }

    let ranked: RankedCandidates = if skills.is_empty() {
        list_unscored(candidates, policy)
    } else {
        let query = criteria.to_parsed_query(skills);
        rank_candidates_scoped(&query, Combination::And, YearsScope::EachSkill, candidates, policy)
    };

    let mut all = ranked.candidates;
    sort_candidates(&mut all, criteria.sort_by, criteria.sort_descending);
    paginate(all, criteria.page_number, criteria.page_size)
}

pub fn sort_candidates(candidates: &mut [ScoredCandidate], sort_by: SortBy, descending: bool) {
    candidates.sort_by(|a, b| {
        let by_name = || a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase());
        let primary = match sort_by {
            SortBy::MatchPercentage => a.match_percentage.total_cmp(&b.match_percentage),
            SortBy::Experience => a.years_of_experience.total_cmp(&b.years_of_experience),
            SortBy::Name => by_name(),
        };
        let primary = if descending { primary.reverse() } else { primary };
        primary
            .then_with(by_name)
            .then(a.employee_id.cmp(&b.employee_id))
    });
}

pub fn paginate(candidates: Vec<ScoredCandidate>, page_number: u32, page_size: u32) -> CandidatePage {
    let total_count = candidates.len();
    let size = page_size.max(1) as usize;
    let total_pages = total_count.div_ceil(size) as u32;
    let skip = (page_number.max(1) as usize - 1) * size;

    CandidatePage {
        candidates: candidates.into_iter().skip(skip).take(size).collect(),
        total_count,
        page_number,
        page_size,
        total_pages,
    }
}
