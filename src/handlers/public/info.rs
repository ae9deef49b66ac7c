// handlers/public/info.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service name, version and route overview
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Branch Asset API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/login, /auth/refresh (public)",
                "users": "/api/users[/:id], /api/users/me[/password] (protected)",
                "assets": "/api/cctvs, /api/computers, /api/others [/:id[/disable]] (protected)",
                "stocks": "/api/stocks[/:id[/disable|/increment|/decrement]] (protected)",
                "histories": "/api/histories[/:id], /api/histories/parent/:parent_id (protected)",
                "genunits": "/api/genunits[/:id] (protected)",
                "checklists": "/api/checklists/:kind[/:id[/items/:item_id|/finish]] (protected)",
                "admin": "/api/admin/users[/:id[/password]], /api/admin/genunits/pings (admin)",
            }
        }
    }))
}

/// GET /health - Liveness plus a database ping when running on MongoDB
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(db) = state.database.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "memory" }
            })),
        );
    };

    match db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
                })),
            )
        }
    }
}
