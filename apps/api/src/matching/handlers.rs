use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::matching::discovery::RequirementCoverage;
use crate::matching::service::{
    applications_for_requirement, apply, matching_employees_for_requirement,
    requirements_by_skills, score_employee_against_requirement, validate_application,
    ApplicationValidation, ApplyRequest, ApplyResponse, SkillsRequest,
};
use crate::matching::skill_match::MatchResult;
use crate::models::application::ApplicationRow;
use crate::search::structured::CandidatePage;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ValidateQuery {
    pub employee_id: i32,
    pub requirement_id: i32,
}

/// GET /api/v1/employees/:employee_id/match/:requirement_id
pub async fn handle_score_match(
    State(state): State<AppState>,
    Path((employee_id, requirement_id)): Path<(i32, i32)>,
) -> Result<Json<MatchResult>, AppError> {
    let result =
        score_employee_against_requirement(state.store.as_ref(), &state.policy, employee_id, requirement_id)
            .await?;
    Ok(Json(result))
}

/// GET /api/v1/applications/validate
pub async fn handle_validate_application(
    State(state): State<AppState>,
    Query(params): Query<ValidateQuery>,
) -> Result<Json<ApplicationValidation>, AppError> {
    let validation = validate_application(
        state.store.as_ref(),
        &state.policy,
        params.employee_id,
        params.requirement_id,
    )
    .await?;
    Ok(Json(validation))
}

/// POST /api/v1/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let response = apply(state.store.as_ref(), &state.policy, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/requirements/:id/applications
pub async fn handle_requirement_applications(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let applications = applications_for_requirement(state.store.as_ref(), id).await?;
    Ok(Json(applications))
}

/// GET /api/v1/requirements/:id/matches
pub async fn handle_requirement_matches(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CandidatePage>, AppError> {
    let page = matching_employees_for_requirement(state.store.as_ref(), &state.policy, id).await?;
    Ok(Json(page))
}

/// POST /api/v1/requirements/by-skills
pub async fn handle_requirements_by_skills(
    State(state): State<AppState>,
    Json(req): Json<SkillsRequest>,
) -> Result<Json<Vec<RequirementCoverage>>, AppError> {
    let found = requirements_by_skills(state.store.as_ref(), &req).await?;
    Ok(Json(found))
}
