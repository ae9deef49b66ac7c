use serde::{Deserialize, Serialize};

use super::asset::FieldErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: i64,
    pub created_by: String,
    pub updated_at: i64,
    pub updated_by: String,
    pub branch: String,
    #[serde(flatten)]
    pub input: StockInput,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub increment: Vec<StockChange>,
    #[serde(default)]
    pub decrement: Vec<StockChange>,
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub image: String,
}

impl Stock {
    pub fn below_threshold(&self) -> bool {
        self.quantity <= self.input.threshold
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StockInput {
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// pcs, box, meter...
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub threshold: i64,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl StockInput {
    pub fn validate(&self, errors: &mut FieldErrors) {
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "This field is required".to_string());
        }
        if self.threshold < 0 {
            errors.insert("threshold".to_string(), "Must not be negative".to_string());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockChange {
    pub author: String,
    pub qty: i64,
    pub time: i64,
    #[serde(default)]
    pub note: String,
    /// Quantity before the change
    #[serde(default)]
    pub base_qty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockMode {
    Increment,
    Decrement,
}

impl StockMode {
    pub fn field(&self) -> &'static str {
        match self {
            StockMode::Increment => "increment",
            StockMode::Decrement => "decrement",
        }
    }

    /// Signed delta applied to `quantity`
    pub fn delta(&self, qty: i64) -> i64 {
        match self {
            StockMode::Increment => qty,
            StockMode::Decrement => -qty,
        }
    }
}
