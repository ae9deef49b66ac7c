use serde::{Deserialize, Serialize};

/// How many ping results a unit keeps
pub const PING_HISTORY: usize = 3;

/// Cross-category mirror of every CCTV/PC/other asset, keyed by the asset ID
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenUnit {
    #[serde(rename = "_id")]
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub ip: String,
    pub branch: String,
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub cases: Vec<Case>,
    #[serde(default)]
    pub cases_size: i32,
    #[serde(default)]
    pub pings_state: Vec<PingState>,
    #[serde(default)]
    pub last_ping: i64,
}

impl GenUnit {
    pub fn new(id: String, category: String, name: String, ip: String, branch: String) -> Self {
        Self {
            id,
            category,
            name,
            ip,
            branch,
            disable: false,
            cases: Vec::new(),
            cases_size: 0,
            pings_state: Vec::new(),
            last_ping: 0,
        }
    }

    pub fn has_open_cases(&self) -> bool {
        self.cases_size > 0
    }
}

/// Open incident attached to a unit; `case_id` is the history ID
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub case_id: String,
    pub case_note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PingState {
    /// 0 down, 1 up
    pub code: i32,
    pub time: i64,
}

/// Mirror fields that follow the asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenUnitEdit {
    pub category: String,
    pub name: String,
    pub ip: String,
    pub branch: String,
}
