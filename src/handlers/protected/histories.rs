// handlers/protected/histories.rs - Incident / activity history

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};

use crate::database::models::{History, HistoryInput};
use crate::filter::HistoryFilter;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::HistoryPayload;
use crate::state::AppState;

pub async fn find(State(state): State<AppState>, Query(filter): Query<HistoryFilter>) -> ApiResult<Vec<History>> {
    Ok(ApiResponse::success(state.histories.find(filter).await?))
}

/// GET /api/histories/parent/:parent_id
pub async fn find_for_parent(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
    Query(filter): Query<HistoryFilter>,
) -> ApiResult<Vec<History>> {
    Ok(ApiResponse::success(state.histories.find_for_parent(&parent_id, filter).await?))
}

/// POST /api/histories - An open status (1..=3) adds a case to the unit
pub async fn insert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<HistoryInput>, JsonRejection>,
) -> ApiResult<History> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(state.histories.insert(&user, input).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<History> {
    Ok(ApiResponse::success(state.histories.get(&id).await?))
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<HistoryPayload>, JsonRejection>,
) -> ApiResult<History> {
    let Json(payload) = payload?;
    Ok(ApiResponse::success(state.histories.edit(&user, &id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<History> {
    Ok(ApiResponse::success(state.histories.delete(&user, &id).await?))
}
