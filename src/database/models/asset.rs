use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::types::AssetCategory;

/// Field name → problem, surfaced as `field_errors` in 400 responses
pub type FieldErrors = HashMap<String, String>;

/// Per-category behaviour of an asset document
pub trait AssetKind:
    Serialize + DeserializeOwned + Clone + Debug + Send + Sync + Unpin + 'static
{
    const COLLECTION: &'static str;
    const CATEGORY: AssetCategory;

    /// Category written to the GenUnit mirror
    fn unit_category(&self) -> String {
        Self::CATEGORY.as_str().to_string()
    }

    fn sub_category(&self) -> Option<&str> {
        None
    }

    fn validate(&self, _errors: &mut FieldErrors) {}

    fn normalize(&mut self) {}
}

/// Fields a client may set on any asset
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssetInput {
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub inventory_number: String,
    #[serde(default)]
    pub location: String,
    /// Installation date
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub note: String,
}

impl AssetInput {
    pub fn validate(&self, errors: &mut FieldErrors) {
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), "This field is required".to_string());
        }
        if !self.ip.is_empty() && self.ip.parse::<std::net::IpAddr>().is_err() {
            errors.insert("ip".to_string(), format!("Invalid IP address: {}", self.ip));
        }
    }

    /// Trimmed and upper-cased the way the registry stores names
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_uppercase();
        self.ip = self.ip.trim().to_string();
        self.location = self.location.trim().to_string();
        self.tag = self
            .tag
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDoc<D> {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: i64,
    pub created_by: String,
    pub updated_at: i64,
    pub updated_by: String,
    pub branch: String,
    #[serde(default)]
    pub disable: bool,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub input: AssetInput,
    #[serde(flatten)]
    pub detail: D,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CctvDetail {
    #[serde(default)]
    pub brand: String,
    /// fixed, ptz, dome...
    #[serde(default)]
    pub cctv_type: String,
}

impl AssetKind for CctvDetail {
    const COLLECTION: &'static str = "cctv";
    const CATEGORY: AssetCategory = AssetCategory::Cctv;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComputerDetail {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub division: String,
    /// PC or LAPTOP
    #[serde(default)]
    pub client_type: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub processor: String,
    #[serde(default)]
    pub ram: i32,
    #[serde(default)]
    pub hardisk: i32,
    #[serde(default)]
    pub seat_management: bool,
}

impl AssetKind for ComputerDetail {
    const COLLECTION: &'static str = "computer";
    const CATEGORY: AssetCategory = AssetCategory::Pc;

    fn validate(&self, errors: &mut FieldErrors) {
        if self.ram < 0 {
            errors.insert("ram".to_string(), "Must not be negative".to_string());
        }
        if self.hardisk < 0 {
            errors.insert("hardisk".to_string(), "Must not be negative".to_string());
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OtherDetail {
    /// ALTAI, UPS, SWITCH...; doubles as the GenUnit category
    pub sub_category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial_number: String,
}

impl AssetKind for OtherDetail {
    const COLLECTION: &'static str = "other";
    const CATEGORY: AssetCategory = AssetCategory::Other;

    fn unit_category(&self) -> String {
        self.sub_category.trim().to_uppercase()
    }

    fn sub_category(&self) -> Option<&str> {
        Some(&self.sub_category)
    }

    fn normalize(&mut self) {
        self.sub_category = self.sub_category.trim().to_uppercase();
    }

    fn validate(&self, errors: &mut FieldErrors) {
        let sub = self.sub_category.trim();
        if sub.is_empty() {
            errors.insert("sub_category".to_string(), "This field is required".to_string());
        } else if ["CCTV", "PC", "STOCK"].contains(&sub.to_uppercase().as_str()) {
            errors.insert(
                "sub_category".to_string(),
                format!("'{}' has its own registry", sub),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_document_shape() {
        let cctv = AssetDoc::<CctvDetail> {
            id: "abc".to_string(),
            created_at: 1,
            created_by: "tester".to_string(),
            updated_at: 1,
            updated_by: "tester".to_string(),
            branch: "NORTH".to_string(),
            disable: false,
            image: String::new(),
            input: AssetInput { name: "CAM LOBBY".to_string(), ..Default::default() },
            detail: CctvDetail { brand: "Hikvision".to_string(), cctv_type: "dome".to_string() },
        };
        let value = serde_json::to_value(&cctv).unwrap();
        assert_eq!(value["_id"], "abc");
        assert_eq!(value["name"], "CAM LOBBY");
        assert_eq!(value["brand"], "Hikvision");
    }

    #[test]
    fn input_validation_flags_missing_name_and_bad_ip() {
        let input = AssetInput { name: " ".to_string(), ip: "10.0.0.300".to_string(), ..Default::default() };
        let mut errors = FieldErrors::new();
        input.validate(&mut errors);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("ip"));
    }

    #[test]
    fn other_mirror_category_comes_from_sub_category() {
        let detail = OtherDetail { sub_category: " altai ".to_string(), ..Default::default() };
        assert_eq!(detail.unit_category(), "ALTAI");

        let mut errors = FieldErrors::new();
        OtherDetail { sub_category: "cctv".to_string(), ..Default::default() }.validate(&mut errors);
        assert!(errors.contains_key("sub_category"));
    }
}
