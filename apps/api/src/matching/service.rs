//! Application workflow: score an employee against a requirement, validate and
//! persist applications, and discover matches in both directions.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::matching::composite::{composite_score, Recommendation};
use crate::matching::discovery::{
    requirements_matching_skills, RequirementCoverage, DEFAULT_MINIMUM_MATCH_PERCENTAGE,
};
use crate::matching::learning::suggest_learning;
use crate::matching::policy::ScoringPolicy;
use crate::matching::skill_match::{score_employee, MatchDetail, MatchResult, SkillGap};
use crate::models::application::{ApplicationRow, NewApplication};
use crate::models::employee::EmployeeProfile;
use crate::models::requirement::RequirementProfile;
use crate::models::skill::LearningResource;
use crate::search::structured::{CandidatePage, StructuredCriteria};
use crate::search::service::structured_search;
use crate::store::TalentStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationValidation {
    pub employee_id: i32,
    pub requirement_id: i32,
    pub match_percentage: f64,
    pub mandatory_matched: usize,
    pub mandatory_total: usize,
    pub ai_score: f64,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
    pub skill_analysis: Vec<MatchDetail>,
    pub gap_analysis: Vec<SkillGap>,
    pub suggested_learning: Vec<LearningResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub employee_id: i32,
    pub requirement_id: i32,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub application: ApplicationRow,
    pub validation: ApplicationValidation,
}

async fn load_pair(
    store: &dyn TalentStore,
    employee_id: i32,
    requirement_id: i32,
) -> Result<(EmployeeProfile, RequirementProfile), AppError> {
    let employee = store
        .fetch_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found")))?;
    let requirement = store
        .fetch_requirement(requirement_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Requirement {requirement_id} not found")))?;
    Ok((employee, requirement))
}

#[tracing::instrument(skip(store, policy))]
pub async fn score_employee_against_requirement(
    store: &dyn TalentStore,
    policy: &ScoringPolicy,
    employee_id: i32,
    requirement_id: i32,
) -> Result<MatchResult, AppError> {
    let (employee, requirement) = load_pair(store, employee_id, requirement_id).await?;
    let result = score_employee(&employee, &requirement, policy);

    debug!(
        match_percentage = result.match_percentage,
        gaps = result.skill_gaps.len(),
        "Scored employee against requirement"
    );
    Ok(result)
}

/// Full pre-application analysis: match, composite score, recommendation,
/// gaps and up to `policy.learning_limit` learning resources.
#[tracing::instrument(skip(store, policy))]
pub async fn validate_application(
    store: &dyn TalentStore,
    policy: &ScoringPolicy,
    employee_id: i32,
    requirement_id: i32,
) -> Result<ApplicationValidation, AppError> {
    let result = score_employee_against_requirement(store, policy, employee_id, requirement_id).await?;
    let composite = composite_score(result.match_percentage, &result.skill_matches, policy);

    let suggested_learning = if result.skill_gaps.is_empty() {
        vec![]
    } else {
        let gap_names: Vec<String> = result.skill_gaps.iter().map(|g| g.skill_name.clone()).collect();
        let resources = store.fetch_learning_resources(&gap_names).await?;
        suggest_learning(&result.skill_gaps, &resources, policy.learning_limit)
    };

    info!(
        match_percentage = result.match_percentage,
        ai_score = composite.ai_score,
        recommendation = composite.recommendation.label(),
        "Application validated"
    );

    Ok(ApplicationValidation {
        employee_id,
        requirement_id,
        match_percentage: result.match_percentage,
        mandatory_matched: composite.mandatory_matched,
        mandatory_total: composite.mandatory_total,
        ai_score: composite.ai_score,
        recommendation: composite.recommendation,
        recommendation_reason: composite.recommendation_reason,
        skill_analysis: result.skill_matches,
        gap_analysis: result.skill_gaps,
        suggested_learning,
    })
}

/// Validates and persists an application. One application per employee and
/// requirement; the requirement must be open.
#[tracing::instrument(skip(store, policy, request), fields(employee_id = request.employee_id, requirement_id = request.requirement_id))]
pub async fn apply(
    store: &dyn TalentStore,
    policy: &ScoringPolicy,
    request: ApplyRequest,
) -> Result<ApplyResponse, AppError> {
    let (_, requirement) = load_pair(store, request.employee_id, request.requirement_id).await?;
    if !requirement.requirement.is_active || requirement.requirement.status != "Open" {
        return Err(AppError::Validation(format!(
            "Requirement {} is not open for applications",
            request.requirement_id
        )));
    }
    if store
        .application_exists(request.employee_id, request.requirement_id)
        .await?
    {
        return Err(AppError::Conflict(format!(
            "Employee {} has already applied to requirement {}",
            request.employee_id, request.requirement_id
        )));
    }

    let validation =
        validate_application(store, policy, request.employee_id, request.requirement_id).await?;

    let application = store
        .insert_application(NewApplication {
            requirement_id: request.requirement_id,
            employee_id: request.employee_id,
            cover_letter: request
                .cover_letter
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            match_percentage: validation.match_percentage,
            ai_score: validation.ai_score,
            ai_recommendation: format!(
                "{}: {}",
                validation.recommendation.label(),
                validation.recommendation_reason
            ),
        })
        .await?;

    Ok(ApplyResponse {
        application,
        validation,
    })
}

/// Applications for a requirement, best AI score first.
pub async fn applications_for_requirement(
    store: &dyn TalentStore,
    requirement_id: i32,
) -> Result<Vec<ApplicationRow>, AppError> {
    if store.fetch_requirement(requirement_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Requirement {requirement_id} not found")));
    }
    let mut applications = store.fetch_applications_for_requirement(requirement_id).await?;
    applications.sort_by(|a, b| {
        b.ai_score
            .unwrap_or(f64::MIN)
            .total_cmp(&a.ai_score.unwrap_or(f64::MIN))
            .then(a.applied_date.cmp(&b.applied_date))
    });
    Ok(applications)
}

/// Employees ranked against a requirement's skills and location.
#[tracing::instrument(skip(store, policy))]
pub async fn matching_employees_for_requirement(
    store: &dyn TalentStore,
    policy: &ScoringPolicy,
    requirement_id: i32,
) -> Result<CandidatePage, AppError> {
    let requirement = store
        .fetch_requirement(requirement_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Requirement {requirement_id} not found")))?;

    let criteria = StructuredCriteria {
        skills: requirement.skills.iter().map(|s| s.skill_name.clone()).collect(),
        location: requirement.requirement.location.clone(),
        ..Default::default()
    };
    structured_search(store, policy, &criteria).await
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsRequest {
    pub skills: Vec<String>,
    #[serde(default)]
    pub minimum_match_percentage: Option<u32>,
}

/// Open requirements whose skills are mostly covered by `request.skills`.
pub async fn requirements_by_skills(
    store: &dyn TalentStore,
    request: &SkillsRequest,
) -> Result<Vec<RequirementCoverage>, AppError> {
    let minimum = request
        .minimum_match_percentage
        .unwrap_or(DEFAULT_MINIMUM_MATCH_PERCENTAGE);
    if minimum > 100 {
        return Err(AppError::Validation(
            "minimum_match_percentage must be between 0 and 100".into(),
        ));
    }
    if request.skills.iter().all(|s| s.trim().is_empty()) {
        return Ok(vec![]);
    }

    let requirements = store.fetch_open_requirements().await?;
    Ok(requirements_matching_skills(&request.skills, &requirements, minimum))
}
