use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::{check_fields, field_error, FindLimits, ServiceError, ServiceResult};
use crate::dao::{GenUnitStore, HistoryStore};
use crate::database::models::{Case, FieldErrors, History, HistoryEdit, HistoryInput, HistoryUpdate};
use crate::database::DatabaseError;
use crate::filter::HistoryFilter;
use crate::middleware::AuthUser;
use crate::types::{new_id, unix_now, HistoryStatus};

/// Histories may only be deleted this long after creation
pub const DELETE_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Request body for history insert and edit
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPayload {
    /// `updated_at` the client last read; required on edit
    #[serde(default)]
    pub filter_timestamp: Option<i64>,
    #[serde(flatten)]
    pub input: HistoryInput,
}

#[derive(Clone)]
pub struct HistoryService {
    histories: Arc<dyn HistoryStore>,
    units: Arc<dyn GenUnitStore>,
    limits: FindLimits,
}

impl HistoryService {
    pub fn new(histories: Arc<dyn HistoryStore>, units: Arc<dyn GenUnitStore>, limits: FindLimits) -> Self {
        Self { histories, units, limits }
    }

    pub async fn insert(&self, user: &AuthUser, input: HistoryInput) -> ServiceResult<History> {
        let mut errors = FieldErrors::new();
        input.validate(&mut errors);
        if input.parent_id.trim().is_empty() {
            errors.insert("parent_id".to_string(), "This field is required".to_string());
        }
        check_fields(errors)?;

        let unit = match self.units.get(input.parent_id.trim()).await {
            Ok(unit) => unit,
            Err(DatabaseError::NotFound(_)) => {
                return Err(field_error("parent_id", format!("Unknown unit: {}", input.parent_id)))
            }
            Err(e) => return Err(e.into()),
        };

        let now = unix_now();
        let status = HistoryStatus::from_code(input.complete_status);
        let history = History {
            id: new_id(),
            created_at: now,
            created_by: user.identity.clone(),
            updated_at: now,
            updated_by: user.identity.clone(),
            category: unit.category.clone(),
            branch: user.branch.clone(),
            parent_id: unit.id.clone(),
            parent_name: unit.name.clone(),
            problem: input.problem.trim().to_string(),
            problem_resolve: input.problem_resolve.trim().to_string(),
            complete_status: input.complete_status,
            date_start: input.date_start.unwrap_or(now),
            date_end: if status == Some(HistoryStatus::Complete) { now } else { 0 },
            tag: input.tag,
            note: input.note,
            image: String::new(),
            updates: Vec::new(),
        };
        self.histories.insert(&history).await?;

        if history.opens_case() {
            self.open_case(&history).await?;
        }

        info!("history {} filed on {} by {}", history.id, history.parent_id, user.identity);
        Ok(history)
    }

    /// Optimistic edit; the unit's case follows the status in and out of the open set
    pub async fn edit(&self, user: &AuthUser, id: &str, payload: HistoryPayload) -> ServiceResult<History> {
        let filter_timestamp = payload
            .filter_timestamp
            .ok_or_else(|| field_error("filter_timestamp", "This field is required"))?;
        let input = payload.input;
        let mut errors = FieldErrors::new();
        input.validate(&mut errors);
        check_fields(errors)?;

        let existing = self.histories.get(id).await?;
        let now = unix_now();
        let completes = HistoryStatus::from_code(input.complete_status) == Some(HistoryStatus::Complete);
        let edit = HistoryEdit {
            id: id.to_string(),
            branch: user.branch.clone(),
            filter_timestamp,
            problem: input.problem.trim().to_string(),
            problem_resolve: input.problem_resolve.trim().to_string(),
            complete_status: input.complete_status,
            date_end: match (completes, existing.date_end) {
                (true, 0) => now,
                (true, end) => end,
                (false, _) => 0,
            },
            tag: input.tag,
            note: input.note,
            update: HistoryUpdate {
                time: now,
                updated_by: user.identity.clone(),
                problem: input.problem.trim().to_string(),
                problem_resolve: input.problem_resolve.trim().to_string(),
                complete_status: input.complete_status,
            },
        };
        let updated = self.histories.edit(&edit).await?;

        match (existing.opens_case(), updated.opens_case()) {
            (true, false) => self.close_case(&updated).await?,
            (false, true) => self.open_case(&updated).await?,
            _ => {}
        }
        Ok(updated)
    }

    pub async fn delete(&self, user: &AuthUser, id: &str) -> ServiceResult<History> {
        let existing = self.histories.get(id).await?;
        if existing.branch != user.branch {
            return Err(DatabaseError::not_found("history not found or not editable").into());
        }
        let created_after = unix_now() - DELETE_WINDOW_SECS;
        if existing.created_at < created_after {
            return Err(ServiceError::BadRequest(
                "History can only be deleted within 24 hours of creation".to_string(),
            ));
        }

        let deleted = self.histories.delete(id, &user.branch, created_after).await?;
        if deleted.opens_case() {
            self.close_case(&deleted).await?;
        }
        info!("history {} deleted by {}", id, user.identity);
        Ok(deleted)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<History> {
        Ok(self.histories.get(id).await?)
    }

    pub async fn find(&self, mut filter: HistoryFilter) -> ServiceResult<Vec<History>> {
        filter.limit = self.limits.apply(filter.limit);
        Ok(self.histories.find(&filter).await?)
    }

    pub async fn find_for_parent(&self, parent_id: &str, mut filter: HistoryFilter) -> ServiceResult<Vec<History>> {
        filter.parent_id = Some(parent_id.to_string());
        self.find(filter).await
    }

    async fn open_case(&self, history: &History) -> ServiceResult<()> {
        let case = Case {
            case_id: history.id.clone(),
            case_note: history.problem.clone(),
        };
        self.units
            .insert_case(&history.parent_id, &case)
            .await
            .map_err(|e| ServiceError::Internal(format!("History saved but genunit case update failed: {}", e)))?;
        Ok(())
    }

    /// A unit deleted in the meantime has no case left to close
    async fn close_case(&self, history: &History) -> ServiceResult<()> {
        match self.units.delete_case(&history.parent_id, &history.id).await {
            Ok(_) => Ok(()),
            Err(DatabaseError::NotFound(_)) => {
                warn!("unit {} of history {} is gone", history.parent_id, history.id);
                Ok(())
            }
            Err(e) => Err(ServiceError::Internal(format!(
                "History saved but genunit case update failed: {}",
                e
            ))),
        }
    }
}
