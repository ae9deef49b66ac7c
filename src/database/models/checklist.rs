use serde::{Deserialize, Serialize};

use crate::types::ChecklistKind;

/// Inspection round over every active unit of one category in a branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: i64,
    pub created_by: String,
    pub updated_at: i64,
    pub updated_by: String,
    pub branch: String,
    pub kind: ChecklistKind,
    pub name: String,
    pub time_started: i64,
    #[serde(default)]
    pub time_ended: i64,
    #[serde(default)]
    pub is_finish: bool,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub items: Vec<CheckItem>,
}

/// Snapshot of one unit at checklist creation plus its check result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub category: String,
    /// Open cases on the unit when the checklist was created
    #[serde(default)]
    pub open_cases: i32,
    #[serde(default)]
    pub is_checked: bool,
    #[serde(default)]
    pub is_offline: bool,
    #[serde(default)]
    pub is_maintained: bool,
    #[serde(default)]
    pub checked_at: i64,
    #[serde(default)]
    pub checked_by: String,
    #[serde(default)]
    pub note: String,
}

/// Client patch for a single item; absent fields stay as they are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckItemPatch {
    pub is_checked: Option<bool>,
    pub is_offline: Option<bool>,
    pub is_maintained: Option<bool>,
    pub note: Option<String>,
}

impl CheckItemPatch {
    pub fn is_empty(&self) -> bool {
        self.is_checked.is_none()
            && self.is_offline.is_none()
            && self.is_maintained.is_none()
            && self.note.is_none()
    }

    pub fn apply(&self, item: &mut CheckItem, checked_by: &str, checked_at: i64) {
        if let Some(v) = self.is_checked {
            item.is_checked = v;
        }
        if let Some(v) = self.is_offline {
            item.is_offline = v;
        }
        if let Some(v) = self.is_maintained {
            item.is_maintained = v;
        }
        if let Some(ref v) = self.note {
            item.note = v.clone();
        }
        item.checked_at = checked_at;
        item.checked_by = checked_by.to_string();
    }
}

/// List view of a checklist: header fields and counters instead of items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistSummary {
    pub id: String,
    pub created_at: i64,
    pub created_by: String,
    pub updated_at: i64,
    pub updated_by: String,
    pub branch: String,
    pub kind: ChecklistKind,
    pub name: String,
    pub time_started: i64,
    pub time_ended: i64,
    pub is_finish: bool,
    pub note: String,
    pub items_count: usize,
    pub checked_count: usize,
    pub offline_count: usize,
    pub maintained_count: usize,
}

impl From<&Checklist> for ChecklistSummary {
    fn from(checklist: &Checklist) -> Self {
        let count = |f: fn(&CheckItem) -> bool| checklist.items.iter().filter(|i| f(i)).count();
        Self {
            id: checklist.id.clone(),
            created_at: checklist.created_at,
            created_by: checklist.created_by.clone(),
            updated_at: checklist.updated_at,
            updated_by: checklist.updated_by.clone(),
            branch: checklist.branch.clone(),
            kind: checklist.kind,
            name: checklist.name.clone(),
            time_started: checklist.time_started,
            time_ended: checklist.time_ended,
            is_finish: checklist.is_finish,
            note: checklist.note.clone(),
            items_count: checklist.items.len(),
            checked_count: count(|i| i.is_checked),
            offline_count: count(|i| i.is_offline),
            maintained_count: count(|i| i.is_maintained),
        }
    }
}
