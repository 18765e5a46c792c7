//! Skill Match Scorer: weighted per-skill match of one employee against one
//! requirement's skill criteria.
//!
//! Algorithm, per requirement skill (weight = weightage, doubled when mandatory):
//! 1. years ≥ minimum                → full weight, `Full`
//! 2. years ≥ 0.8 × minimum          → 0.7 × weight, `Partial`, gap recorded
//! 3. any other owned skill          → weight × (years / minimum) × 0.5, `Partial`, gap recorded
//! 4. skill not owned                → 0, `Missing`, gap = minimum
//!
//! match_percentage = matched / total_weight × 100, rounded to 2 places (0 when
//! the requirement carries no skills).

use serde::{Deserialize, Serialize};

use crate::matching::policy::{clamp_percentage, ScoringPolicy};
use crate::models::employee::{EmployeeProfile, EmployeeSkill};
use crate::models::requirement::{RequirementProfile, RequirementSkill};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Full,
    Partial,
    Missing,
}

/// Per-skill explanation of a structured match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub skill_id: i32,
    pub skill_name: String,
    pub required_years: f64,
    pub employee_years: f64,
    pub match_status: MatchStatus,
    pub is_mandatory: bool,
    /// Effective weight after the mandatory multiplier.
    pub weight: f64,
    /// Weight actually credited to the employee.
    pub credited: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_name: String,
    pub gap_years: f64,
}

/// Output of the scorer for one employee/requirement pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub employee_id: i32,
    pub requirement_id: i32,
    pub match_percentage: f64,
    pub skill_matches: Vec<MatchDetail>,
    pub skill_gaps: Vec<SkillGap>,
}

/// Scores one employee profile against one requirement.
pub fn score_employee(
    employee: &EmployeeProfile,
    requirement: &RequirementProfile,
    policy: &ScoringPolicy,
) -> MatchResult {
    let (match_percentage, skill_matches, skill_gaps) =
        score_skills(&employee.skills, &requirement.skills, policy);

    MatchResult {
        employee_id: employee.employee.employee_id,
        requirement_id: requirement.requirement.requirement_id,
        match_percentage,
        skill_matches,
        skill_gaps,
    }
}

/// Core weighted match over raw skill lists. Employee skills are joined to
/// requirement skills by `skill_id`.
pub fn score_skills(
    employee_skills: &[EmployeeSkill],
    requirement_skills: &[RequirementSkill],
    policy: &ScoringPolicy,
) -> (f64, Vec<MatchDetail>, Vec<SkillGap>) {
    let mut total_weight = 0.0_f64;
    let mut matched_weight = 0.0_f64;
    let mut details = Vec::with_capacity(requirement_skills.len());
    let mut gaps = Vec::new();

    for req in requirement_skills {
        let weight = req.effective_weight(policy.mandatory_multiplier);
        total_weight += weight;

        let owned = employee_skills.iter().find(|s| s.skill_id == req.skill_id);
        let (status, employee_years, credited) = match owned {
            Some(skill) => {
                let (status, credited) = credit_owned_skill(skill.years_of_experience, req, weight, policy);
                (status, skill.years_of_experience, credited)
            }
            None => (MatchStatus::Missing, 0.0, 0.0),
        };

        if employee_years < req.min_years_required {
            gaps.push(SkillGap {
                skill_name: req.skill_name.clone(),
                gap_years: req.min_years_required - employee_years,
            });
        }

        matched_weight += credited;
        details.push(MatchDetail {
            skill_id: req.skill_id,
            skill_name: req.skill_name.clone(),
            required_years: req.min_years_required,
            employee_years,
            match_status: status,
            is_mandatory: req.is_mandatory,
            weight,
            credited,
        });
    }

    let match_percentage = if total_weight > 0.0 {
        clamp_percentage(matched_weight / total_weight * 100.0, 2)
    } else {
        0.0
    };

    (match_percentage, details, gaps)
}

fn credit_owned_skill(
    years: f64,
    req: &RequirementSkill,
    weight: f64,
    policy: &ScoringPolicy,
) -> (MatchStatus, f64) {
    let min = req.min_years_required;
    if years >= min {
        (MatchStatus::Full, weight)
    } else if years >= min * policy.near_miss_ratio {
        (MatchStatus::Partial, weight * policy.near_miss_credit)
    } else {
        // min > 0 here, otherwise the first branch would have matched
        let ratio = years / min;
        (MatchStatus::Partial, weight * ratio * policy.shortfall_credit)
    }
}
