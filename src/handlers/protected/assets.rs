// handlers/protected/assets.rs - CCTV / computer / other registries
//
// One set of generic handlers; the route picks the registry through the detail type.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};

use super::DisableRequest;
use crate::database::models::{AssetDoc, AssetKind};
use crate::filter::AssetFilter;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{AssetPayload, AssetService};

/// GET /api/{registry}
pub async fn find<D: AssetKind>(
    State(service): State<AssetService<D>>,
    Query(filter): Query<AssetFilter>,
) -> ApiResult<Vec<AssetDoc<D>>> {
    Ok(ApiResponse::success(service.find(filter).await?))
}

/// POST /api/{registry}
pub async fn insert<D: AssetKind>(
    State(service): State<AssetService<D>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<AssetPayload<D>>, JsonRejection>,
) -> ApiResult<AssetDoc<D>> {
    let Json(payload) = payload?;
    Ok(ApiResponse::created(service.insert(&user, payload).await?))
}

/// GET /api/{registry}/:id
pub async fn get<D: AssetKind>(
    State(service): State<AssetService<D>>,
    Path(id): Path<String>,
) -> ApiResult<AssetDoc<D>> {
    Ok(ApiResponse::success(service.get(&id).await?))
}

/// PUT /api/{registry}/:id - Requires `filter_timestamp`
pub async fn edit<D: AssetKind>(
    State(service): State<AssetService<D>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<AssetPayload<D>>, JsonRejection>,
) -> ApiResult<AssetDoc<D>> {
    let Json(payload) = payload?;
    Ok(ApiResponse::success(service.edit(&user, &id, payload).await?))
}

/// DELETE /api/{registry}/:id
pub async fn delete<D: AssetKind>(
    State(service): State<AssetService<D>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<AssetDoc<D>> {
    Ok(ApiResponse::success(service.delete(&user, &id).await?))
}

/// PUT /api/{registry}/:id/disable
pub async fn disable<D: AssetKind>(
    State(service): State<AssetService<D>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<DisableRequest>, JsonRejection>,
) -> ApiResult<AssetDoc<D>> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(service.disable(&user, &id, request.disable).await?))
}
