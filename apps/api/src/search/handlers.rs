use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::SearchHistoryRow;
use crate::search::service::{
    delete_saved_search, natural_language_search, record_search, save_search, saved_searches,
    search_history, structured_search, NaturalLanguageRequest, SaveSearchRequest, SearchOutcome,
};
use crate::search::structured::{CandidatePage, StructuredCriteria};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub user_id: i32,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: i32,
}

/// POST /api/v1/search
pub async fn handle_structured_search(
    State(state): State<AppState>,
    Json(criteria): Json<StructuredCriteria>,
) -> Result<Json<CandidatePage>, AppError> {
    let page = structured_search(state.store.as_ref(), &state.policy, &criteria).await?;
    Ok(Json(page))
}

/// POST /api/v1/search/natural
pub async fn handle_natural_search(
    State(state): State<AppState>,
    Json(req): Json<NaturalLanguageRequest>,
) -> Result<Json<SearchOutcome>, AppError> {
    let outcome = natural_language_search(
        state.store.as_ref(),
        state.parser.as_ref(),
        &state.policy,
        state.parse_timeout(),
        &req.query,
    )
    .await?;

    if let Some(user_id) = req.searched_by_id {
        record_search(state.store.as_ref(), user_id, &outcome).await;
    }
    Ok(Json(outcome))
}

/// GET /api/v1/search/history
pub async fn handle_search_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<SearchHistoryRow>>, AppError> {
    let history = search_history(state.store.as_ref(), params.user_id, params.limit).await?;
    Ok(Json(history))
}

/// GET /api/v1/search/saved
pub async fn handle_saved_searches(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<SearchHistoryRow>>, AppError> {
    let saved = saved_searches(state.store.as_ref(), params.user_id).await?;
    Ok(Json(saved))
}

/// POST /api/v1/search/saved
pub async fn handle_save_search(
    State(state): State<AppState>,
    Json(req): Json<SaveSearchRequest>,
) -> Result<(StatusCode, Json<SearchHistoryRow>), AppError> {
    let saved = save_search(state.store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// DELETE /api/v1/search/saved/:id
pub async fn handle_delete_saved_search(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_saved_search(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
