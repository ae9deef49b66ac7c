// handlers/elevated/users.rs - Account administration (ADMIN role)

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{RegisterInput, UserEdit, UserView};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::user_service::ResetPasswordRequest;
use crate::state::AppState;

/// POST /api/admin/users
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> ApiResult<UserView> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(state.users.register(input).await?))
}

/// PUT /api/admin/users/:id
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserEdit>, JsonRejection>,
) -> ApiResult<UserView> {
    let Json(edit) = payload?;
    Ok(ApiResponse::success(state.users.edit(&id, edit).await?))
}

/// DELETE /api/admin/users/:id - An admin cannot delete their own account
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<UserView> {
    Ok(ApiResponse::success(state.users.delete(&admin, &id).await?))
}

/// PUT /api/admin/users/:id/password
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = payload?;
    state.users.reset_password(&id, request).await?;
    Ok(ApiResponse::success(json!({ "message": format!("Password of {} reset", id) })))
}
