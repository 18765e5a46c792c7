use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementRow {
    pub requirement_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String, // Open, Closed, Filled
    pub is_active: bool,
    pub application_count: i32,
    pub posted_date: DateTime<Utc>,
}

/// A skill criterion attached to a requirement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementSkill {
    pub requirement_id: i32,
    pub skill_id: i32,
    pub skill_name: String,
    pub min_years_required: f64,
    pub is_mandatory: bool,
    pub weightage: i32,
}

impl RequirementSkill {
    /// Weight used by the match scorer. Mandatory skills are multiplied by
    /// `mandatory_multiplier`; a non-positive stored weightage is treated as 1.
    pub fn effective_weight(&self, mandatory_multiplier: f64) -> f64 {
        let base = self.weightage.max(1) as f64;
        if self.is_mandatory {
            base * mandatory_multiplier
        } else {
            base
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementProfile {
    pub requirement: RequirementRow,
    pub skills: Vec<RequirementSkill>,
}
