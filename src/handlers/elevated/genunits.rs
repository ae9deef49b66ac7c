// handlers/elevated/genunits.rs - Batch ping results from the monitoring job

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{PingReport, PingUpdate};
use crate::state::AppState;

/// PUT /api/admin/genunits/pings - Body is `[{id, code}]`; failures are reported per unit
pub async fn update_pings(
    State(state): State<AppState>,
    payload: Result<Json<Vec<PingUpdate>>, JsonRejection>,
) -> ApiResult<PingReport> {
    let Json(pings) = payload?;
    Ok(ApiResponse::success(state.genunits.update_pings(pings).await))
}
