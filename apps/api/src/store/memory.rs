//! In-memory `TalentStore` for service and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::AppError;
use crate::models::application::{
    ApplicationRow, NewApplication, NewSearchHistory, SearchHistoryRow,
};
use crate::models::employee::EmployeeProfile;
use crate::models::requirement::RequirementProfile;
use crate::models::skill::{LearningResource, TaxonomySkill};
use crate::store::{EmployeeFilter, TalentStore};

#[derive(Default)]
pub struct MemoryStore {
    pub employees: Vec<EmployeeProfile>,
    pub requirements: Mutex<Vec<RequirementProfile>>,
    pub taxonomy: Vec<TaxonomySkill>,
    pub resources: Vec<LearningResource>,
    pub applications: Mutex<Vec<ApplicationRow>>,
    pub history: Mutex<Vec<SearchHistoryRow>>,
}

impl MemoryStore {
    pub fn new(employees: Vec<EmployeeProfile>, requirements: Vec<RequirementProfile>) -> Self {
        Self {
            employees,
            requirements: Mutex::new(requirements),
            ..Default::default()
        }
    }

    pub fn with_taxonomy(mut self, taxonomy: Vec<TaxonomySkill>) -> Self {
        self.taxonomy = taxonomy;
        self
    }

    pub fn with_resources(mut self, resources: Vec<LearningResource>) -> Self {
        self.resources = resources;
        self
    }

    pub fn application_count(&self, requirement_id: i32) -> i32 {
        self.requirements
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.requirement.requirement_id == requirement_id)
            .map(|r| r.requirement.application_count)
            .unwrap_or_default()
    }
}

#[async_trait]
impl TalentStore for MemoryStore {
    async fn fetch_employee(&self, employee_id: i32) -> Result<Option<EmployeeProfile>, AppError> {
        Ok(self
            .employees
            .iter()
            .find(|e| e.employee.employee_id == employee_id)
            .cloned())
    }

    async fn fetch_requirement(
        &self,
        requirement_id: i32,
    ) -> Result<Option<RequirementProfile>, AppError> {
        Ok(self
            .requirements
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.requirement.requirement_id == requirement_id)
            .cloned())
    }

    async fn fetch_candidates(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Vec<EmployeeProfile>, AppError> {
        Ok(self
            .employees
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn fetch_skill_taxonomy(&self) -> Result<Vec<TaxonomySkill>, AppError> {
        Ok(self.taxonomy.clone())
    }

    async fn fetch_learning_resources(
        &self,
        skill_names: &[String],
    ) -> Result<Vec<LearningResource>, AppError> {
        Ok(self
            .resources
            .iter()
            .filter(|r| skill_names.contains(&r.skill_name))
            .cloned()
            .collect())
    }

    async fn fetch_open_requirements(&self) -> Result<Vec<RequirementProfile>, AppError> {
        Ok(self
            .requirements
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.requirement.is_active && r.requirement.status == "Open")
            .cloned()
            .collect())
    }

    async fn application_exists(
        &self,
        employee_id: i32,
        requirement_id: i32,
    ) -> Result<bool, AppError> {
        Ok(self
            .applications
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.employee_id == employee_id && a.requirement_id == requirement_id))
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<ApplicationRow, AppError> {
        let mut applications = self.applications.lock().unwrap();
        if applications
            .iter()
            .any(|a| a.employee_id == application.employee_id && a.requirement_id == application.requirement_id)
        {
            return Err(AppError::Conflict(format!(
                "Employee {} has already applied to requirement {}",
                application.employee_id, application.requirement_id
            )));
        }
        let row = ApplicationRow {
            application_id: applications.len() as i32 + 1,
            requirement_id: application.requirement_id,
            employee_id: application.employee_id,
            cover_letter: application.cover_letter,
            match_percentage: Some(application.match_percentage),
            ai_score: Some(application.ai_score),
            ai_recommendation: Some(application.ai_recommendation),
            status: "Pending".to_string(),
            applied_date: Utc::now(),
            reviewed_date: None,
        };
        applications.push(row.clone());

        if let Some(r) = self
            .requirements
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.requirement.requirement_id == application.requirement_id)
        {
            r.requirement.application_count += 1;
        }
        Ok(row)
    }

    async fn fetch_applications_for_requirement(
        &self,
        requirement_id: i32,
    ) -> Result<Vec<ApplicationRow>, AppError> {
        Ok(self
            .applications
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.requirement_id == requirement_id)
            .cloned()
            .collect())
    }

    async fn insert_search_history(
        &self,
        entry: NewSearchHistory,
    ) -> Result<SearchHistoryRow, AppError> {
        let mut history = self.history.lock().unwrap();
        let row = SearchHistoryRow {
            search_id: history.iter().map(|h| h.search_id).max().unwrap_or(0) + 1,
            searched_by_id: entry.searched_by_id,
            search_query: entry.search_query,
            filters: entry.filters,
            result_count: entry.result_count,
            search_date: Utc::now(),
            is_saved: entry.is_saved,
            saved_search_name: entry.saved_search_name,
        };
        history.push(row.clone());
        Ok(row)
    }

    async fn fetch_search_history(
        &self,
        searched_by_id: i32,
        limit: i64,
    ) -> Result<Vec<SearchHistoryRow>, AppError> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|h| h.searched_by_id == searched_by_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn fetch_saved_searches(
        &self,
        searched_by_id: i32,
    ) -> Result<Vec<SearchHistoryRow>, AppError> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|h| h.searched_by_id == searched_by_id && h.is_saved)
            .cloned()
            .collect())
    }

    async fn delete_saved_search(&self, search_id: i32) -> Result<bool, AppError> {
        let mut history = self.history.lock().unwrap();
        let before = history.len();
        history.retain(|h| !(h.search_id == search_id && h.is_saved));
        Ok(history.len() < before)
    }
}
