//! Persistence seam for the matching and search services.
//!
//! Services only see `TalentStore`; `PgStore` backs it in production and the
//! in-memory store backs unit and router tests.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::application::{
    ApplicationRow, NewApplication, NewSearchHistory, SearchHistoryRow,
};
use crate::models::employee::EmployeeProfile;
use crate::models::requirement::RequirementProfile;
use crate::models::skill::{LearningResource, TaxonomySkill};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Coarse candidate pre-selection pushed down to the store.
///
/// Text comparisons are case-insensitive and exact. An empty `any_skills`
/// list means "no skill restriction".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    pub location: Option<String>,
    pub availability_status: Option<String>,
    pub team_id: Option<i32>,
    pub department: Option<String>,
    pub any_skills: Vec<String>,
}

/// In-memory twin of the SQL filter in `PgStore::fetch_candidates`.
#[cfg(test)]
impl EmployeeFilter {
    pub fn matches(&self, profile: &EmployeeProfile) -> bool {
        let employee = &profile.employee;
        eq_filter(self.location.as_deref(), employee.location.as_deref())
            && eq_filter(
                self.availability_status.as_deref(),
                Some(employee.availability_status.as_str()),
            )
            && self.team_id.map_or(true, |id| employee.team_id == Some(id))
            && eq_filter(self.department.as_deref(), employee.department.as_deref())
            && (self.any_skills.is_empty()
                || self.any_skills.iter().any(|s| profile.skill_named(s).is_some()))
    }
}

#[cfg(test)]
fn eq_filter(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|w| !w.is_empty()) {
        None => true,
        Some(wanted) => actual.is_some_and(|a| a.trim().eq_ignore_ascii_case(wanted)),
    }
}

#[async_trait]
pub trait TalentStore: Send + Sync {
    async fn fetch_employee(&self, employee_id: i32) -> Result<Option<EmployeeProfile>, AppError>;

    async fn fetch_requirement(
        &self,
        requirement_id: i32,
    ) -> Result<Option<RequirementProfile>, AppError>;

    /// Active employees passing `filter`, each with their full skill profile.
    async fn fetch_candidates(&self, filter: &EmployeeFilter)
        -> Result<Vec<EmployeeProfile>, AppError>;

    async fn fetch_skill_taxonomy(&self) -> Result<Vec<TaxonomySkill>, AppError>;

    /// Resources tagged with any of `skill_names` (exact names).
    async fn fetch_learning_resources(
        &self,
        skill_names: &[String],
    ) -> Result<Vec<LearningResource>, AppError>;

    async fn fetch_open_requirements(&self) -> Result<Vec<RequirementProfile>, AppError>;

    async fn application_exists(&self, employee_id: i32, requirement_id: i32)
        -> Result<bool, AppError>;

    /// Persists the application and bumps the requirement's application count.
    /// An existing application for the same pair is `AppError::Conflict`,
    /// even when it landed after `application_exists` was checked.
    async fn insert_application(&self, application: NewApplication)
        -> Result<ApplicationRow, AppError>;

    async fn fetch_applications_for_requirement(
        &self,
        requirement_id: i32,
    ) -> Result<Vec<ApplicationRow>, AppError>;

    async fn insert_search_history(&self, entry: NewSearchHistory)
        -> Result<SearchHistoryRow, AppError>;

    /// Most recent searches first.
    async fn fetch_search_history(
        &self,
        searched_by_id: i32,
        limit: i64,
    ) -> Result<Vec<SearchHistoryRow>, AppError>;

    async fn fetch_saved_searches(&self, searched_by_id: i32)
        -> Result<Vec<SearchHistoryRow>, AppError>;

    /// Returns false when no saved search has that id.
    async fn delete_saved_search(&self, search_id: i32) -> Result<bool, AppError>;
}
