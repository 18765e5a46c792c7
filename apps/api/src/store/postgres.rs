//! `TalentStore` over PostgreSQL.
//!
//! NUMERIC columns are cast to `float8` in every SELECT so rows decode into `f64`.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::application::{
    ApplicationRow, NewApplication, NewSearchHistory, SearchHistoryRow,
};
use crate::models::employee::{EmployeeProfile, EmployeeRow, EmployeeSkill};
use crate::models::requirement::{RequirementProfile, RequirementRow, RequirementSkill};
use crate::models::skill::{LearningResource, TaxonomySkill};
use crate::store::{EmployeeFilter, TalentStore};

const EMPLOYEE_COLUMNS: &str = r#"
    e.employee_id, e.full_name, e.email, e.designation, e.location,
    e.availability_status, e.years_of_experience::float8 AS years_of_experience,
    e.team_id, t.team_name, t.department
"#;

const REQUIREMENT_COLUMNS: &str = r#"
    r.requirement_id, r.title, r.description, r.location, r.status,
    r.is_active, r.application_count, r.posted_date
"#;

const APPLICATION_COLUMNS: &str = r#"
    application_id, requirement_id, employee_id, cover_letter,
    match_percentage::float8 AS match_percentage, ai_score::float8 AS ai_score,
    ai_recommendation, status, applied_date, reviewed_date
"#;

const SEARCH_HISTORY_COLUMNS: &str = r#"
    search_id, searched_by_id, search_query, filters, result_count,
    search_date, is_saved, saved_search_name
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn skills_for_employees(
        &self,
        employee_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<EmployeeSkill>>, AppError> {
        if employee_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, EmployeeSkill>(
            r#"
            SELECT es.employee_id, es.skill_id, s.skill_name,
                   es.years_of_experience::float8 AS years_of_experience,
                   es.proficiency_level, es.last_used_date
            FROM employee_skills es
            JOIN skills s ON s.skill_id = es.skill_id
            WHERE es.employee_id = ANY($1)
            ORDER BY es.employee_id, es.years_of_experience DESC, s.skill_name
            "#,
        )
        .bind(employee_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<EmployeeSkill>> = HashMap::new();
        for row in rows {
            grouped.entry(row.employee_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn skills_for_requirements(
        &self,
        requirement_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<RequirementSkill>>, AppError> {
        if requirement_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RequirementSkill>(
            r#"
            SELECT rs.requirement_id, rs.skill_id, s.skill_name,
                   rs.min_years_required::float8 AS min_years_required,
                   rs.is_mandatory, rs.weightage
            FROM requirement_skills rs
            JOIN skills s ON s.skill_id = rs.skill_id
            WHERE rs.requirement_id = ANY($1)
            ORDER BY rs.requirement_id, rs.requirement_skill_id
            "#,
        )
        .bind(requirement_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<RequirementSkill>> = HashMap::new();
        for row in rows {
            grouped.entry(row.requirement_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn with_employee_skills(
        &self,
        employees: Vec<EmployeeRow>,
    ) -> Result<Vec<EmployeeProfile>, AppError> {
        let ids: Vec<i32> = employees.iter().map(|e| e.employee_id).collect();
        let mut skills = self.skills_for_employees(&ids).await?;
        Ok(employees
            .into_iter()
            .map(|employee| EmployeeProfile {
                skills: skills.remove(&employee.employee_id).unwrap_or_default(),
                employee,
            })
            .collect())
    }

    async fn with_requirement_skills(
        &self,
        requirements: Vec<RequirementRow>,
    ) -> Result<Vec<RequirementProfile>, AppError> {
        let ids: Vec<i32> = requirements.iter().map(|r| r.requirement_id).collect();
        let mut skills = self.skills_for_requirements(&ids).await?;
        Ok(requirements
            .into_iter()
            .map(|requirement| RequirementProfile {
                skills: skills.remove(&requirement.requirement_id).unwrap_or_default(),
                requirement,
            })
            .collect())
    }
}

#[async_trait]
impl TalentStore for PgStore {
    async fn fetch_employee(&self, employee_id: i32) -> Result<Option<EmployeeProfile>, AppError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees e
            LEFT JOIN teams t ON t.team_id = e.team_id
            WHERE e.employee_id = $1
            "#
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(employee) => Ok(self.with_employee_skills(vec![employee]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn fetch_requirement(
        &self,
        requirement_id: i32,
    ) -> Result<Option<RequirementProfile>, AppError> {
        let row = sqlx::query_as::<_, RequirementRow>(&format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM requirements r WHERE r.requirement_id = $1"
        ))
        .bind(requirement_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(requirement) => Ok(self.with_requirement_skills(vec![requirement]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn fetch_candidates(
        &self,
        filter: &EmployeeFilter,
    ) -> Result<Vec<EmployeeProfile>, AppError> {
        let any_skills: Vec<String> = filter
            .any_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let employees = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees e
            LEFT JOIN teams t ON t.team_id = e.team_id
            WHERE e.is_active
              AND ($1::text IS NULL OR LOWER(TRIM(e.location)) = LOWER(TRIM($1)))
              AND ($2::text IS NULL OR LOWER(TRIM(e.availability_status)) = LOWER(TRIM($2)))
              AND ($3::int IS NULL OR e.team_id = $3)
              AND ($4::text IS NULL OR LOWER(TRIM(t.department)) = LOWER(TRIM($4)))
              AND (cardinality($5::text[]) = 0 OR EXISTS (
                    SELECT 1
                    FROM employee_skills es
                    JOIN skills s ON s.skill_id = es.skill_id
                    WHERE es.employee_id = e.employee_id
                      AND LOWER(s.skill_name) = ANY($5)))
            ORDER BY e.employee_id
            "#
        ))
        .bind(non_blank(&filter.location))
        .bind(non_blank(&filter.availability_status))
        .bind(filter.team_id)
        .bind(non_blank(&filter.department))
        .bind(&any_skills)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = employees.len(), "Fetched candidate employees");
        self.with_employee_skills(employees).await
    }

    async fn fetch_skill_taxonomy(&self) -> Result<Vec<TaxonomySkill>, AppError> {
        Ok(sqlx::query_as::<_, TaxonomySkill>(
            r#"
            SELECT s.skill_id, s.skill_name, c.category_name,
                   COALESCE(
                       array_agg(a.alias_name::text) FILTER (WHERE a.alias_name IS NOT NULL),
                       ARRAY[]::text[]
                   ) AS aliases
            FROM skills s
            LEFT JOIN skill_categories c ON c.category_id = s.category_id
            LEFT JOIN skill_aliases a ON a.skill_id = s.skill_id
            WHERE s.is_active
            GROUP BY s.skill_id, s.skill_name, c.category_name, c.display_order
            ORDER BY c.display_order NULLS LAST, s.skill_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_learning_resources(
        &self,
        skill_names: &[String],
    ) -> Result<Vec<LearningResource>, AppError> {
        if skill_names.is_empty() {
            return Ok(vec![]);
        }

        Ok(sqlx::query_as::<_, LearningResource>(
            r#"
            SELECT lr.resource_id, lr.skill_id, s.skill_name, lr.resource_title,
                   lr.provider, lr.resource_url, lr.resource_type, lr.duration_hours,
                   lr.level, lr.rating::float8 AS rating, lr.is_active
            FROM learning_resources lr
            JOIN skills s ON s.skill_id = lr.skill_id
            WHERE s.skill_name = ANY($1)
            ORDER BY lr.rating DESC NULLS LAST, lr.resource_id
            "#,
        )
        .bind(skill_names)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_open_requirements(&self) -> Result<Vec<RequirementProfile>, AppError> {
        let rows = sqlx::query_as::<_, RequirementRow>(&format!(
            r#"
            SELECT {REQUIREMENT_COLUMNS}
            FROM requirements r
            WHERE r.is_active AND r.status = 'Open'
            ORDER BY r.posted_date DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_requirement_skills(rows).await
    }

    async fn application_exists(
        &self,
        employee_id: i32,
        requirement_id: i32,
    ) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE employee_id = $1 AND requirement_id = $2)",
        )
        .bind(employee_id)
        .bind(requirement_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_application(
        &self,
        application: NewApplication,
    ) -> Result<ApplicationRow, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications
                (requirement_id, employee_id, cover_letter, match_percentage,
                 ai_score, ai_recommendation, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'Pending')
            ON CONFLICT (employee_id, requirement_id) DO NOTHING
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application.requirement_id)
        .bind(application.employee_id)
        .bind(&application.cover_letter)
        .bind(application.match_percentage)
        .bind(application.ai_score)
        .bind(&application.ai_recommendation)
        .fetch_optional(&mut *tx)
        .await?;

        // A concurrent apply for the same pair won the insert
        let Some(row) = inserted else {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "Employee {} has already applied to requirement {}",
                application.employee_id, application.requirement_id
            )));
        };

        sqlx::query(
            "UPDATE requirements SET application_count = application_count + 1 WHERE requirement_id = $1",
        )
        .bind(application.requirement_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Inserted application {} (employee {}, requirement {})",
            row.application_id, row.employee_id, row.requirement_id
        );
        Ok(row)
    }

    async fn fetch_applications_for_requirement(
        &self,
        requirement_id: i32,
    ) -> Result<Vec<ApplicationRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM applications
            WHERE requirement_id = $1
            ORDER BY ai_score DESC NULLS LAST, applied_date
            "#
        ))
        .bind(requirement_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_search_history(
        &self,
        entry: NewSearchHistory,
    ) -> Result<SearchHistoryRow, AppError> {
        Ok(sqlx::query_as::<_, SearchHistoryRow>(&format!(
            r#"
            INSERT INTO search_history
                (searched_by_id, search_query, filters, result_count, is_saved, saved_search_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SEARCH_HISTORY_COLUMNS}
            "#
        ))
        .bind(entry.searched_by_id)
        .bind(&entry.search_query)
        .bind(&entry.filters)
        .bind(entry.result_count)
        .bind(entry.is_saved)
        .bind(&entry.saved_search_name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn fetch_search_history(
        &self,
        searched_by_id: i32,
        limit: i64,
    ) -> Result<Vec<SearchHistoryRow>, AppError> {
        Ok(sqlx::query_as::<_, SearchHistoryRow>(&format!(
            r#"
            SELECT {SEARCH_HISTORY_COLUMNS}
            FROM search_history
            WHERE searched_by_id = $1
            ORDER BY search_date DESC
            LIMIT $2
            "#
        ))
        .bind(searched_by_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn fetch_saved_searches(
        &self,
        searched_by_id: i32,
    ) -> Result<Vec<SearchHistoryRow>, AppError> {
        Ok(sqlx::query_as::<_, SearchHistoryRow>(&format!(
            r#"
            SELECT {SEARCH_HISTORY_COLUMNS}
            FROM search_history
            WHERE searched_by_id = $1 AND is_saved
            ORDER BY search_date DESC
            "#
        ))
        .bind(searched_by_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_saved_search(&self, search_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM search_history WHERE search_id = $1 AND is_saved")
            .bind(search_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
