use serde::{Deserialize, Serialize};

use super::asset::FieldErrors;
use crate::types::HistoryStatus;

/// Incident / activity log entry attached to a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: i64,
    pub created_by: String,
    pub updated_at: i64,
    pub updated_by: String,
    pub category: String,
    pub branch: String,
    pub parent_id: String,
    pub parent_name: String,
    pub problem: String,
    #[serde(default)]
    pub problem_resolve: String,
    pub complete_status: i32,
    pub date_start: i64,
    #[serde(default)]
    pub date_end: i64,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub updates: Vec<HistoryUpdate>,
}

impl History {
    pub fn status(&self) -> Option<HistoryStatus> {
        HistoryStatus::from_code(self.complete_status)
    }

    pub fn opens_case(&self) -> bool {
        self.status().map(|s| s.opens_case()).unwrap_or(false)
    }
}

/// One entry of the edit trail kept on every history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryUpdate {
    pub time: i64,
    pub updated_by: String,
    pub problem: String,
    pub problem_resolve: String,
    pub complete_status: i32,
}

/// Client payload for insert and edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryInput {
    #[serde(default)]
    pub parent_id: String,
    pub problem: String,
    #[serde(default)]
    pub problem_resolve: String,
    pub complete_status: i32,
    /// Defaults to now
    #[serde(default)]
    pub date_start: Option<i64>,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl HistoryInput {
    pub fn validate(&self, errors: &mut FieldErrors) {
        if self.problem.trim().is_empty() {
            errors.insert("problem".to_string(), "This field is required".to_string());
        }
        if HistoryStatus::from_code(self.complete_status).is_none() {
            errors.insert(
                "complete_status".to_string(),
                format!("Unknown status code: {}", self.complete_status),
            );
        }
    }
}

/// Resolved edit handed to the store
#[derive(Debug, Clone)]
pub struct HistoryEdit {
    pub id: String,
    pub branch: String,
    pub filter_timestamp: i64,
    pub problem: String,
    pub problem_resolve: String,
    pub complete_status: i32,
    pub date_end: i64,
    pub tag: Vec<String>,
    pub note: String,
    pub update: HistoryUpdate,
}
