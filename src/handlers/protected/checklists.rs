// handlers/protected/checklists.rs - Inspection checklists
//
// `:kind` is one of vendor, vendor-physical, altai, config.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    Json,
};

use super::NoteRequest;
use crate::database::models::{CheckItemPatch, Checklist, ChecklistSummary};
use crate::filter::ChecklistFilter;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::ChecklistKind;

/// GET /api/checklists/:kind - Summaries, newest first
pub async fn find(
    State(state): State<AppState>,
    Path(kind): Path<ChecklistKind>,
    Query(filter): Query<ChecklistFilter>,
) -> ApiResult<Vec<ChecklistSummary>> {
    Ok(ApiResponse::success(state.checklists.find(kind, filter).await?))
}

/// POST /api/checklists/:kind - Snapshot the branch's active units
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(kind): Path<ChecklistKind>,
    payload: Option<Json<NoteRequest>>,
) -> ApiResult<Checklist> {
    let note = payload.map(|Json(body)| body.note).unwrap_or_default();
    Ok(ApiResponse::created(state.checklists.create(&user, kind, note).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ChecklistKind, String)>,
) -> ApiResult<Checklist> {
    Ok(ApiResponse::success(state.checklists.get(kind, &id).await?))
}

/// DELETE /api/checklists/:kind/:id - Unfinished checklists only
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((kind, id)): Path<(ChecklistKind, String)>,
) -> ApiResult<Checklist> {
    Ok(ApiResponse::success(state.checklists.delete(&user, kind, &id).await?))
}

/// PATCH /api/checklists/:kind/:id/items/:item_id
pub async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((kind, id, item_id)): Path<(ChecklistKind, String, String)>,
    payload: Result<Json<CheckItemPatch>, JsonRejection>,
) -> ApiResult<Checklist> {
    let Json(patch) = payload?;
    Ok(ApiResponse::success(
        state.checklists.update_item(&user, kind, &id, &item_id, patch).await?,
    ))
}

/// POST /api/checklists/:kind/:id/finish
pub async fn finish(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((kind, id)): Path<(ChecklistKind, String)>,
    payload: Option<Json<NoteRequest>>,
) -> ApiResult<Checklist> {
    let note = payload.map(|Json(body)| body.note).unwrap_or_default();
    Ok(ApiResponse::success(state.checklists.finish(&user, kind, &id, note).await?))
}
