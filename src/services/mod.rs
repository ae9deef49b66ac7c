//! Business rules between the handlers and the stores.
//!
//! Services validate input, stamp IDs and timestamps from the caller, and fan
//! out to one or more stores. They hold `Arc<dyn ...Store>` so the same code
//! runs over MongoDB and the in-memory stores.

pub mod asset_service;
pub mod checklist_service;
pub mod genunit_service;
pub mod history_service;
pub mod stock_service;
pub mod user_service;

pub use asset_service::{AssetPayload, AssetService};
pub use checklist_service::ChecklistService;
pub use genunit_service::{GenUnitService, PingReport, PingUpdate};
pub use history_service::{HistoryPayload, HistoryService};
pub use stock_service::{StockPayload, StockService};
pub use user_service::{LoginResponse, RefreshResponse, UserService};

use crate::auth::{JwtError, PasswordError};
use crate::config::ApiConfig;
use crate::dao::Stamp;
use crate::database::models::FieldErrors;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::filter::clamp_limit;
use crate::middleware::AuthUser;
use crate::types::unix_now;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => e.into(),
            ServiceError::Validation(fields) => ApiError::validation_error("Validation failed", Some(fields)),
            ServiceError::BadRequest(msg) => ApiError::bad_request(msg),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::Internal(msg) => {
                tracing::error!("{}", msg);
                ApiError::internal_server_error(msg)
            }
            ServiceError::Jwt(e) => e.into(),
            ServiceError::Password(e) => e.into(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// `Err(Validation)` when any field error was collected
pub fn check_fields(errors: FieldErrors) -> ServiceResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

pub fn field_error(field: &str, message: impl Into<String>) -> ServiceError {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), message.into());
    ServiceError::Validation(errors)
}

/// Page size bounds for every `find`
#[derive(Debug, Clone, Copy)]
pub struct FindLimits {
    pub default: i64,
    pub max: i64,
}

impl FindLimits {
    pub fn from_config(api: &ApiConfig) -> Self {
        Self {
            default: api.default_find_limit,
            max: api.max_find_limit,
        }
    }

    pub fn apply(&self, requested: Option<i64>) -> Option<i64> {
        Some(clamp_limit(requested, self.default, self.max))
    }
}

impl Default for FindLimits {
    fn default() -> Self {
        Self { default: 100, max: 1000 }
    }
}

/// Change stamp for the caller at the current time
pub fn stamp(user: &AuthUser) -> Stamp {
    Stamp {
        by: user.identity.clone(),
        at: unix_now(),
    }
}

/// Folds a primary write and its GenUnit mirror write into one result.
///
/// A mirror failure after a successful primary write is reported as a 500
/// naming the mirror; nothing is rolled back. When both fail the primary
/// error kind is kept and the messages are joined.
pub fn reconcile<T, U>(
    primary: Result<T, DatabaseError>,
    mirror: Result<U, DatabaseError>,
) -> ServiceResult<T> {
    match (primary, mirror) {
        (Ok(value), Ok(_)) => Ok(value),
        (Err(e), Ok(_)) => Err(e.into()),
        (Ok(_), Err(e)) => Err(ServiceError::Internal(format!(
            "Asset saved but genunit mirror failed: {}",
            e
        ))),
        (Err(a), Err(b)) => Err(match a {
            DatabaseError::NotFound(msg) => DatabaseError::NotFound(format!("{}; genunit: {}", msg, b)).into(),
            DatabaseError::Duplicate(msg) => DatabaseError::Duplicate(format!("{}; genunit: {}", msg, b)).into(),
            other => ServiceError::Internal(format!("{}; genunit: {}", other, b)),
        }),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::middleware::AuthUser;

    pub fn user(identity: &str, branch: &str, roles: &[&str]) -> AuthUser {
        AuthUser {
            identity: identity.to_string(),
            name: identity.to_uppercase(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            branch: branch.to_string(),
            fresh: true,
        }
    }
}
