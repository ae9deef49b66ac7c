// handlers/protected/users.rs - User directory and self-service

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::UserView;
use crate::filter::UserFilter;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::ChangePasswordRequest;
use crate::state::AppState;

pub async fn find(State(state): State<AppState>, Query(filter): Query<UserFilter>) -> ApiResult<Vec<UserView>> {
    Ok(ApiResponse::success(state.users.find(filter).await?))
}

/// GET /api/users/me - Profile of the token's owner
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(state.users.get(&user.identity).await?))
}

/// PUT /api/users/me/password - Needs a fresh token
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = payload?;
    state.users.change_password(&user, request).await?;
    Ok(ApiResponse::success(json!({ "message": "Password changed" })))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserView> {
    Ok(ApiResponse::success(state.users.get(&id).await?))
}
