// handlers/public/auth.rs - Token acquisition

use axum::{extract::rejection::JsonRejection, extract::State, http::HeaderMap, Json};

use crate::error::ApiError;
use crate::middleware::{extract_jwt_from_headers, ApiResponse, ApiResult};
use crate::services::user_service::LoginRequest;
use crate::services::{LoginResponse, RefreshResponse};
use crate::state::AppState;

/// POST /auth/login - Username + password → access and refresh tokens
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(state.users.login(request).await?))
}

/// POST /auth/refresh - Refresh token as Bearer → new non-fresh access token
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<RefreshResponse> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    Ok(ApiResponse::success(state.users.refresh(&token).await?))
}
