//! Builders shared by unit tests across modules.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::models::employee::{EmployeeProfile, EmployeeRow, EmployeeSkill};
use crate::models::requirement::{RequirementProfile, RequirementRow, RequirementSkill};
use crate::models::skill::{LearningResource, TaxonomySkill};
use crate::nlp_client::{NlpError, QueryParser};
use crate::search::parsed_query::ParseQueryResult;

pub fn employee(id: i32, name: &str, total_years: f64, skills: &[(i32, &str, f64)]) -> EmployeeProfile {
    EmployeeProfile {
        employee: EmployeeRow {
            employee_id: id,
            full_name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            designation: Some("Engineer".to_string()),
            location: Some("Bangalore".to_string()),
            availability_status: "Available".to_string(),
            years_of_experience: total_years,
            team_id: Some(1),
            team_name: Some("Platform".to_string()),
            department: Some("Engineering".to_string()),
        },
        skills: skills
            .iter()
            .map(|(skill_id, skill_name, years)| EmployeeSkill {
                employee_id: id,
                skill_id: *skill_id,
                skill_name: skill_name.to_string(),
                years_of_experience: *years,
                proficiency_level: Some("Intermediate".to_string()),
                last_used_date: None,
            })
            .collect(),
    }
}

pub fn with_location(mut profile: EmployeeProfile, location: &str) -> EmployeeProfile {
    profile.employee.location = Some(location.to_string());
    profile
}

pub fn with_availability(mut profile: EmployeeProfile, status: &str) -> EmployeeProfile {
    profile.employee.availability_status = status.to_string();
    profile
}

/// `(skill_id, skill_name, min_years, is_mandatory, weightage)`
pub fn requirement(id: i32, skills: &[(i32, &str, f64, bool, i32)]) -> RequirementProfile {
    RequirementProfile {
        requirement: RequirementRow {
            requirement_id: id,
            title: format!("Requirement {id}"),
            description: None,
            location: Some("Bangalore".to_string()),
            status: "Open".to_string(),
            is_active: true,
            application_count: 0,
            posted_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        },
        skills: skills
            .iter()
            .map(|(skill_id, skill_name, min_years, is_mandatory, weightage)| RequirementSkill {
                requirement_id: id,
                skill_id: *skill_id,
                skill_name: skill_name.to_string(),
                min_years_required: *min_years,
                is_mandatory: *is_mandatory,
                weightage: *weightage,
            })
            .collect(),
    }
}

pub fn taxonomy_skill(id: i32, name: &str, category: &str, aliases: &[&str]) -> TaxonomySkill {
    TaxonomySkill {
        skill_id: id,
        skill_name: name.to_string(),
        category_name: Some(category.to_string()),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

pub fn resource(id: i32, skill_id: i32, skill_name: &str, rating: Option<f64>, is_active: bool) -> LearningResource {
    LearningResource {
        resource_id: id,
        skill_id,
        skill_name: skill_name.to_string(),
        resource_title: format!("{skill_name} course {id}"),
        provider: Some("Coursera".to_string()),
        resource_url: Some(format!("https://learn.example.com/{id}")),
        resource_type: Some("Course".to_string()),
        duration_hours: 10,
        level: Some("Intermediate".to_string()),
        rating,
        is_active,
    }
}

/// Scripted `QueryParser`: fixed health, fixed reply, optional delay.
pub struct StubParser {
    healthy: bool,
    reply: Result<ParseQueryResult, String>,
    delay: Option<Duration>,
}

impl StubParser {
    pub fn returning(result: ParseQueryResult) -> Self {
        Self {
            healthy: true,
            reply: Ok(result),
            delay: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            healthy: true,
            reply: Err(message.to_string()),
            delay: None,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            reply: Err("unreachable".to_string()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl QueryParser for StubParser {
    async fn parse(&self, _text: &str) -> Result<ParseQueryResult, NlpError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(NlpError::Rejected)
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}
