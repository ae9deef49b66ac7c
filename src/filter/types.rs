use std::cmp::Ordering;

use mongodb::bson::{doc, Document};
use serde::Deserialize;

use super::text::{contains_ci, contains_condition, in_range, present, range_condition};
use crate::database::models::{AssetDoc, AssetKind, Checklist, GenUnit, History, Stock, User};
use crate::types::{ChecklistKind, HistoryStatus};

/// Query for the CCTV / PC / other registries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    pub branch: Option<String>,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub location: Option<String>,
    pub sub_category: Option<String>,
    pub disable: Option<bool>,
    pub limit: Option<i64>,
}

impl AssetFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(branch) = present(&self.branch) {
            filter.insert("branch", branch);
        }
        if let Some(name) = present(&self.name) {
            filter.insert("name", contains_condition(name));
        }
        if let Some(ip) = present(&self.ip) {
            filter.insert("ip", contains_condition(ip));
        }
        if let Some(location) = present(&self.location) {
            filter.insert("location", contains_condition(location));
        }
        if let Some(sub) = present(&self.sub_category) {
            filter.insert("sub_category", sub.to_uppercase());
        }
        if let Some(disable) = self.disable {
            filter.insert("disable", disable);
        }
        filter
    }

    pub fn matches<D: AssetKind>(&self, asset: &AssetDoc<D>) -> bool {
        present(&self.branch).map_or(true, |b| asset.branch == b)
            && present(&self.name).map_or(true, |n| contains_ci(&asset.input.name, n))
            && present(&self.ip).map_or(true, |ip| contains_ci(&asset.input.ip, ip))
            && present(&self.location).map_or(true, |l| contains_ci(&asset.input.location, l))
            && present(&self.sub_category).map_or(true, |s| {
                asset.detail.sub_category().map_or(false, |own| own.eq_ignore_ascii_case(s))
            })
            && self.disable.map_or(true, |d| asset.disable == d)
    }

    pub fn sort_document() -> Document {
        doc! { "location": 1, "name": 1 }
    }

    pub fn order<D>(a: &AssetDoc<D>, b: &AssetDoc<D>) -> Ordering {
        a.input
            .location
            .cmp(&b.input.location)
            .then_with(|| a.input.name.cmp(&b.input.name))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenUnitFilter {
    pub branch: Option<String>,
    pub category: Option<String>,
    pub name: Option<String>,
    pub ip: Option<String>,
    /// true: only units with open cases, false: only units without
    pub has_cases: Option<bool>,
    pub disable: Option<bool>,
    pub limit: Option<i64>,
}

impl GenUnitFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(branch) = present(&self.branch) {
            filter.insert("branch", branch);
        }
        if let Some(category) = present(&self.category) {
            filter.insert("category", category.to_uppercase());
        }
        if let Some(name) = present(&self.name) {
            filter.insert("name", contains_condition(name));
        }
        if let Some(ip) = present(&self.ip) {
            filter.insert("ip", contains_condition(ip));
        }
        match self.has_cases {
            Some(true) => {
                filter.insert("cases_size", doc! { "$gt": 0 });
            }
            Some(false) => {
                filter.insert("cases_size", doc! { "$lte": 0 });
            }
            None => {}
        }
        if let Some(disable) = self.disable {
            filter.insert("disable", disable);
        }
        filter
    }

    pub fn matches(&self, unit: &GenUnit) -> bool {
        present(&self.branch).map_or(true, |b| unit.branch == b)
            && present(&self.category).map_or(true, |c| unit.category.eq_ignore_ascii_case(c))
            && present(&self.name).map_or(true, |n| contains_ci(&unit.name, n))
            && present(&self.ip).map_or(true, |ip| contains_ci(&unit.ip, ip))
            && self.has_cases.map_or(true, |h| unit.has_open_cases() == h)
            && self.disable.map_or(true, |d| unit.disable == d)
    }

    pub fn sort_document() -> Document {
        doc! { "name": 1 }
    }

    pub fn order(a: &GenUnit, b: &GenUnit) -> Ordering {
        a.name.cmp(&b.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryFilter {
    pub branch: Option<String>,
    pub category: Option<String>,
    pub parent_id: Option<String>,
    pub complete_status: Option<i32>,
    /// Only entries whose status still counts as an open case
    pub open_only: Option<bool>,
    /// Range on `date_start`
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub limit: Option<i64>,
}

impl HistoryFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(branch) = present(&self.branch) {
            filter.insert("branch", branch);
        }
        if let Some(category) = present(&self.category) {
            filter.insert("category", category.to_uppercase());
        }
        if let Some(parent) = present(&self.parent_id) {
            filter.insert("parent_id", parent);
        }
        if let Some(status) = self.complete_status {
            filter.insert("complete_status", status);
        } else if self.open_only == Some(true) {
            let open: Vec<i32> = [
                HistoryStatus::Progress,
                HistoryStatus::RequestPending,
                HistoryStatus::Pending,
            ]
            .iter()
            .map(HistoryStatus::code)
            .collect();
            filter.insert("complete_status", doc! { "$in": open });
        }
        if let Some(range) = range_condition(self.start, self.end) {
            filter.insert("date_start", range);
        }
        filter
    }

    pub fn matches(&self, history: &History) -> bool {
        let status_ok = match (self.complete_status, self.open_only) {
            (Some(status), _) => history.complete_status == status,
            (None, Some(true)) => history.opens_case(),
            _ => true,
        };
        present(&self.branch).map_or(true, |b| history.branch == b)
            && present(&self.category).map_or(true, |c| history.category.eq_ignore_ascii_case(c))
            && present(&self.parent_id).map_or(true, |p| history.parent_id == p)
            && status_ok
            && in_range(history.date_start, self.start, self.end)
    }

    pub fn sort_document() -> Document {
        doc! { "updated_at": -1 }
    }

    pub fn order(a: &History, b: &History) -> Ordering {
        b.updated_at.cmp(&a.updated_at)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockFilter {
    pub branch: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub disable: Option<bool>,
    pub limit: Option<i64>,
}

impl StockFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(branch) = present(&self.branch) {
            filter.insert("branch", branch);
        }
        if let Some(name) = present(&self.name) {
            filter.insert("name", contains_condition(name));
        }
        if let Some(category) = present(&self.category) {
            filter.insert("category", contains_condition(category));
        }
        if let Some(disable) = self.disable {
            filter.insert("disable", disable);
        }
        filter
    }

    pub fn matches(&self, stock: &Stock) -> bool {
        present(&self.branch).map_or(true, |b| stock.branch == b)
            && present(&self.name).map_or(true, |n| contains_ci(&stock.input.name, n))
            && present(&self.category).map_or(true, |c| contains_ci(&stock.input.category, c))
            && self.disable.map_or(true, |d| stock.disable == d)
    }

    pub fn sort_document() -> Document {
        doc! { "name": 1 }
    }

    pub fn order(a: &Stock, b: &Stock) -> Ordering {
        a.input.name.cmp(&b.input.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecklistFilter {
    pub branch: Option<String>,
    /// Taken from the route, never from the query string
    #[serde(skip)]
    pub kind: Option<ChecklistKind>,
    pub is_finish: Option<bool>,
    /// Range on `created_at`
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub limit: Option<i64>,
}

impl ChecklistFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(branch) = present(&self.branch) {
            filter.insert("branch", branch);
        }
        if let Some(kind) = self.kind {
            filter.insert("kind", kind.as_str());
        }
        if let Some(is_finish) = self.is_finish {
            filter.insert("is_finish", is_finish);
        }
        if let Some(range) = range_condition(self.start, self.end) {
            filter.insert("created_at", range);
        }
        filter
    }

    pub fn matches(&self, checklist: &Checklist) -> bool {
        present(&self.branch).map_or(true, |b| checklist.branch == b)
            && self.kind.map_or(true, |k| checklist.kind == k)
            && self.is_finish.map_or(true, |f| checklist.is_finish == f)
            && in_range(checklist.created_at, self.start, self.end)
    }

    pub fn sort_document() -> Document {
        doc! { "created_at": -1 }
    }

    pub fn order(a: &Checklist, b: &Checklist) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    /// Matches username or display name
    pub name: Option<String>,
    pub branch: Option<String>,
    pub limit: Option<i64>,
}

impl UserFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(name) = present(&self.name) {
            filter.insert(
                "$or",
                vec![
                    doc! { "_id": contains_condition(name) },
                    doc! { "name": contains_condition(name) },
                ],
            );
        }
        if let Some(branch) = present(&self.branch) {
            filter.insert("branch", branch);
        }
        filter
    }

    pub fn matches(&self, user: &User) -> bool {
        present(&self.name).map_or(true, |n| contains_ci(&user.id, n) || contains_ci(&user.name, n))
            && present(&self.branch).map_or(true, |b| user.branch == b)
    }

    pub fn sort_document() -> Document {
        doc! { "_id": 1 }
    }

    pub fn order(a: &User, b: &User) -> Ordering {
        a.id.cmp(&b.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{AssetInput, OtherDetail};

    fn other(name: &str, sub: &str, location: &str) -> AssetDoc<OtherDetail> {
        AssetDoc {
            id: name.to_lowercase(),
            created_at: 0,
            created_by: String::new(),
            updated_at: 0,
            updated_by: String::new(),
            branch: "NORTH".to_string(),
            disable: false,
            image: String::new(),
            input: AssetInput {
                name: name.to_string(),
                location: location.to_string(),
                ..Default::default()
            },
            detail: OtherDetail { sub_category: sub.to_string(), ..Default::default() },
        }
    }

    #[test]
    fn asset_filter_document_skips_blank_fields() {
        let filter = AssetFilter {
            branch: Some("NORTH".to_string()),
            name: Some("".to_string()),
            disable: Some(false),
            ..Default::default()
        };
        let document = filter.to_document();
        assert_eq!(document.get_str("branch").unwrap(), "NORTH");
        assert!(!document.contains_key("name"));
        assert_eq!(document.get_bool("disable").unwrap(), false);
    }

    #[test]
    fn asset_filter_matches_sub_category_case_insensitively() {
        let filter = AssetFilter { sub_category: Some("altai".to_string()), ..Default::default() };
        assert!(filter.matches(&other("AP-1", "ALTAI", "ROOF")));
        assert!(!filter.matches(&other("UPS-1", "UPS", "SERVER ROOM")));
    }

    #[test]
    fn asset_order_is_location_then_name() {
        let mut docs = vec![other("B", "UPS", "2F"), other("A", "UPS", "2F"), other("C", "UPS", "1F")];
        docs.sort_by(AssetFilter::order);
        let names: Vec<_> = docs.iter().map(|d| d.input.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn history_open_only_uses_in_condition() {
        let filter = HistoryFilter { open_only: Some(true), ..Default::default() };
        let document = filter.to_document();
        let status = document.get_document("complete_status").unwrap();
        assert_eq!(status.get_array("$in").unwrap().len(), 3);
    }

    #[test]
    fn genunit_has_cases_filter() {
        let mut unit = GenUnit::new("1".into(), "CCTV".into(), "CAM".into(), String::new(), "NORTH".into());
        let with_cases = GenUnitFilter { has_cases: Some(true), ..Default::default() };
        assert!(!with_cases.matches(&unit));
        unit.cases_size = 1;
        assert!(with_cases.matches(&unit));
        assert_eq!(
            with_cases.to_document().get_document("cases_size").unwrap(),
            &doc! { "$gt": 0 }
        );
    }
}
