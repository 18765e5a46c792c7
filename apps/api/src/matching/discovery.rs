//! Requirement discovery: which open requirements does a set of core skills cover?

use serde::{Deserialize, Serialize};

use crate::models::requirement::RequirementProfile;

pub const DEFAULT_MINIMUM_MATCH_PERCENTAGE: u32 = 70;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementCoverage {
    pub requirement: RequirementProfile,
    /// Integer share of the requirement's skills covered by the core skills.
    pub coverage_percentage: u32,
}

/// Filters open, active requirements whose skills are covered by `core_skills`.
///
/// A requirement skill counts as covered when its lower-cased, trimmed name
/// contains a core skill name or is contained in one. Requirements without
/// skills never qualify. Results are ordered by number of required skills,
/// descending.
pub fn requirements_matching_skills(
    core_skills: &[String],
    requirements: &[RequirementProfile],
    minimum_match_percentage: u32,
) -> Vec<RequirementCoverage> {
    let mut normalized: Vec<String> = core_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();

    if normalized.is_empty() {
        return Vec::new();
    }

    let mut matched: Vec<RequirementCoverage> = requirements
        .iter()
        .filter(|r| r.requirement.is_active && r.requirement.status == "Open")
        .filter(|r| !r.skills.is_empty())
        .filter_map(|r| {
            let covered = r
                .skills
                .iter()
                .map(|s| s.skill_name.trim().to_lowercase())
                .filter(|required| {
                    normalized
                        .iter()
                        .any(|core| required.contains(core.as_str()) || core.contains(required.as_str()))
                })
                .count();
            let coverage_percentage = (covered * 100 / r.skills.len()) as u32;
            (coverage_percentage >= minimum_match_percentage).then(|| RequirementCoverage {
                requirement: r.clone(),
                coverage_percentage,
            })
        })
        .collect();

    matched.sort_by(|a, b| b.requirement.skills.len().cmp(&a.requirement.skills.len()));
    matched
}
