// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware injects `AuthUser`; every write uses the caller's branch.
pub mod assets;
pub mod checklists;
pub mod genunits;
pub mod histories;
pub mod stocks;
pub mod users;

use serde::Deserialize;

/// Body of every `/:id/disable` route
#[derive(Debug, Deserialize)]
pub struct DisableRequest {
    pub disable: bool,
}

/// Optional free-text note sent with checklist create and finish
#[derive(Debug, Default, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub note: String,
}
