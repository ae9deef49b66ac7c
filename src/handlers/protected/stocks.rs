// handlers/protected/stocks.rs - Stock inventory

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};

use super::DisableRequest;
use crate::database::models::{Stock, StockMode};
use crate::filter::StockFilter;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::stock_service::QuantityChange;
use crate::services::StockPayload;
use crate::state::AppState;

pub async fn find(State(state): State<AppState>, Query(filter): Query<StockFilter>) -> ApiResult<Vec<Stock>> {
    Ok(ApiResponse::success(state.stocks.find(filter).await?))
}

pub async fn insert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<StockPayload>, JsonRejection>,
) -> ApiResult<Stock> {
    let Json(payload) = payload?;
    Ok(ApiResponse::created(state.stocks.insert(&user, payload).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Stock> {
    Ok(ApiResponse::success(state.stocks.get(&id).await?))
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<StockPayload>, JsonRejection>,
) -> ApiResult<Stock> {
    let Json(payload) = payload?;
    Ok(ApiResponse::success(state.stocks.edit(&user, &id, payload).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Stock> {
    Ok(ApiResponse::success(state.stocks.delete(&user, &id).await?))
}

pub async fn disable(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<DisableRequest>, JsonRejection>,
) -> ApiResult<Stock> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(state.stocks.disable(&user, &id, request.disable).await?))
}

async fn change(
    state: AppState,
    user: AuthUser,
    id: String,
    mode: StockMode,
    payload: Result<Json<QuantityChange>, JsonRejection>,
) -> ApiResult<Stock> {
    let Json(change) = payload?;
    Ok(ApiResponse::success(state.stocks.change_qty(&user, &id, mode, change).await?))
}

/// POST /api/stocks/:id/increment
pub async fn increment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<QuantityChange>, JsonRejection>,
) -> ApiResult<Stock> {
    change(state, user, id, StockMode::Increment, payload).await
}

/// POST /api/stocks/:id/decrement - 400 when the quantity would drop below zero
pub async fn decrement(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<QuantityChange>, JsonRejection>,
) -> ApiResult<Stock> {
    change(state, user, id, StockMode::Decrement, payload).await
}
