/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Current time as Unix seconds, the timestamp format stored in every document
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Fresh document ID (24 hex chars, same shape Mongo would generate)
pub fn new_id() -> String {
    mongodb::bson::oid::ObjectId::new().to_hex()
}

/// Top-level asset categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetCategory {
    Cctv,
    #[serde(rename = "PC")]
    Pc,
    Other,
    Stock,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Cctv => "CCTV",
            AssetCategory::Pc => "PC",
            AssetCategory::Other => "OTHER",
            AssetCategory::Stock => "STOCK",
        }
    }
}

/// User roles carried in the JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Normal,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Normal => "NORMAL",
            Role::Vendor => "VENDOR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "NORMAL" => Some(Role::Normal),
            "VENDOR" => Some(Role::Vendor),
            _ => None,
        }
    }
}

/// Incident progress stored as `complete_status` on a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HistoryStatus {
    Info = 0,
    Progress = 1,
    RequestPending = 2,
    Pending = 3,
    Complete = 4,
}

impl HistoryStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(HistoryStatus::Info),
            1 => Some(HistoryStatus::Progress),
            2 => Some(HistoryStatus::RequestPending),
            3 => Some(HistoryStatus::Pending),
            4 => Some(HistoryStatus::Complete),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Whether a history in this state counts as an open case on its unit
    pub fn opens_case(&self) -> bool {
        matches!(
            self,
            HistoryStatus::Progress | HistoryStatus::RequestPending | HistoryStatus::Pending
        )
    }
}

/// Checklist flavours, one per inspection workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChecklistKind {
    /// Daily CCTV check done by the vendor through the recorder
    Vendor,
    /// Quarterly on-site CCTV check, includes maintenance
    VendorPhysical,
    /// Wireless (ALTAI) units
    Altai,
    /// Client PC configuration check
    Config,
}

impl ChecklistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistKind::Vendor => "vendor",
            ChecklistKind::VendorPhysical => "vendor-physical",
            ChecklistKind::Altai => "altai",
            ChecklistKind::Config => "config",
        }
    }

    /// GenUnit category the checklist snapshots
    pub fn unit_category(&self) -> &'static str {
        match self {
            ChecklistKind::Vendor | ChecklistKind::VendorPhysical => "CCTV",
            ChecklistKind::Altai => "ALTAI",
            ChecklistKind::Config => "PC",
        }
    }

    pub fn tracks_maintenance(&self) -> bool {
        matches!(self, ChecklistKind::VendorPhysical)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChecklistKind::Vendor => "CCTV daily check",
            ChecklistKind::VendorPhysical => "CCTV physical check",
            ChecklistKind::Altai => "ALTAI check",
            ChecklistKind::Config => "PC configuration check",
        }
    }
}

impl std::fmt::Display for ChecklistKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
