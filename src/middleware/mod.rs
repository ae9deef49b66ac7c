pub mod auth;
pub mod response;

pub use auth::{extract_jwt_from_headers, jwt_auth_middleware, require_admin, AuthUser};
pub use response::{ApiResponse, ApiResult};
