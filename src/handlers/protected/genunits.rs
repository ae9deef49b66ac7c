// handlers/protected/genunits.rs - Read access to the GenUnit mirror

use axum::extract::{Path, Query, State};

use crate::database::models::GenUnit;
use crate::filter::GenUnitFilter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn find(State(state): State<AppState>, Query(filter): Query<GenUnitFilter>) -> ApiResult<Vec<GenUnit>> {
    Ok(ApiResponse::success(state.genunits.find(filter).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<GenUnit> {
    Ok(ApiResponse::success(state.genunits.get(&id).await?))
}
