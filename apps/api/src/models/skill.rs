use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A skill from the taxonomy with its category and known aliases.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxonomySkill {
    pub skill_id: i32,
    pub skill_name: String,
    pub category_name: Option<String>,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LearningResource {
    pub resource_id: i32,
    pub skill_id: i32,
    pub skill_name: String,
    pub resource_title: String,
    pub provider: Option<String>, // Udemy, Coursera, LinkedIn Learning
    pub resource_url: Option<String>,
    pub resource_type: Option<String>, // Course, Tutorial, Book, Documentation
    pub duration_hours: i32,
    pub level: Option<String>,
    pub rating: Option<f64>,
    pub is_active: bool,
}
