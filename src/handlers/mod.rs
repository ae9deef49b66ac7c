// handlers/mod.rs - 3-tier handler architecture
//
// Public (no auth) → Protected (JWT access token, /api/*) → Elevated (ADMIN role, /api/admin/*)
pub mod elevated;
pub mod protected;
pub mod public;
