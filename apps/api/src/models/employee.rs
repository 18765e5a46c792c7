use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeRow {
    pub employee_id: i32,
    pub full_name: String,
    pub email: String,
    pub designation: Option<String>,
    pub location: Option<String>,
    pub availability_status: String,
    /// Total career tenure.
    pub years_of_experience: f64,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub department: Option<String>,
}

/// One entry of an employee's skill profile, joined with the skill's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeSkill {
    pub employee_id: i32,
    pub skill_id: i32,
    pub skill_name: String,
    pub years_of_experience: f64,
    pub proficiency_level: Option<String>,
    pub last_used_date: Option<NaiveDate>,
}

/// An employee together with their full skill profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub employee: EmployeeRow,
    pub skills: Vec<EmployeeSkill>,
}

impl EmployeeProfile {
    /// Case-insensitive lookup by skill name.
    pub fn skill_named(&self, name: &str) -> Option<&EmployeeSkill> {
        self.skills
            .iter()
            .find(|s| s.skill_name.eq_ignore_ascii_case(name))
    }
}
