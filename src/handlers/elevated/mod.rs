// handlers/elevated/mod.rs - Elevated handlers (ADMIN role required)
//
// Route Prefix: /api/admin/*
// Middleware: jwt_auth_middleware, then require_admin
pub mod genunits;
pub mod users;
