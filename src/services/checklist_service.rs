use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use super::{field_error, stamp, FindLimits, HistoryService, ServiceError, ServiceResult};
use crate::dao::{AssetStore, ChecklistStore, GenUnitStore};
use crate::database::models::{
    CctvDetail, CheckItem, CheckItemPatch, Checklist, ChecklistSummary, ComputerDetail, GenUnit, HistoryInput,
    OtherDetail,
};
use crate::database::DatabaseError;
use crate::filter::{AssetFilter, ChecklistFilter, GenUnitFilter};
use crate::middleware::AuthUser;
use crate::types::{new_id, unix_now, ChecklistKind, HistoryStatus};

/// Joins active units with their asset locations into checklist items.
///
/// Units without an active asset are skipped. A unit with open cases starts
/// checked and offline. Items are ordered by location, then name.
pub fn build_items(units: &[GenUnit], locations: &HashMap<String, String>) -> Vec<CheckItem> {
    let mut items: Vec<CheckItem> = units
        .iter()
        .filter_map(|unit| {
            let location = locations.get(&unit.id)?;
            let has_cases = unit.has_open_cases();
            Some(CheckItem {
                id: unit.id.clone(),
                name: unit.name.clone(),
                location: location.clone(),
                category: unit.category.clone(),
                open_cases: unit.cases_size,
                is_checked: has_cases,
                is_offline: has_cases,
                is_maintained: false,
                checked_at: 0,
                checked_by: String::new(),
                note: String::new(),
            })
        })
        .collect();
    items.sort_by(|a, b| a.location.cmp(&b.location).then_with(|| a.name.cmp(&b.name)));
    items
}

/// Histories a finished checklist leaves behind: new outages and maintenance done
pub fn follow_up_histories(checklist: &Checklist) -> Vec<HistoryInput> {
    let title = checklist.kind.title();
    let mut inputs = Vec::new();
    for item in &checklist.items {
        if item.is_offline && item.open_cases == 0 {
            inputs.push(HistoryInput {
                parent_id: item.id.clone(),
                problem: format!("Offline during {}", title),
                complete_status: HistoryStatus::Progress.code(),
                date_start: Some(checklist.time_ended),
                note: item.note.clone(),
                tag: vec![checklist.kind.as_str().to_string()],
                ..Default::default()
            });
        }
        if item.is_maintained {
            inputs.push(HistoryInput {
                parent_id: item.id.clone(),
                problem: format!("Maintained during {}", title),
                problem_resolve: "Maintenance done".to_string(),
                complete_status: HistoryStatus::Info.code(),
                date_start: Some(checklist.time_ended),
                note: item.note.clone(),
                tag: vec![checklist.kind.as_str().to_string()],
            });
        }
    }
    inputs
}

#[derive(Clone)]
pub struct ChecklistService {
    checklists: Arc<dyn ChecklistStore>,
    units: Arc<dyn GenUnitStore>,
    cctvs: Arc<dyn AssetStore<CctvDetail>>,
    computers: Arc<dyn AssetStore<ComputerDetail>>,
    others: Arc<dyn AssetStore<OtherDetail>>,
    histories: HistoryService,
    limits: FindLimits,
}

impl ChecklistService {
    pub fn new(
        checklists: Arc<dyn ChecklistStore>,
        units: Arc<dyn GenUnitStore>,
        cctvs: Arc<dyn AssetStore<CctvDetail>>,
        computers: Arc<dyn AssetStore<ComputerDetail>>,
        others: Arc<dyn AssetStore<OtherDetail>>,
        histories: HistoryService,
        limits: FindLimits,
    ) -> Self {
        Self {
            checklists,
            units,
            cctvs,
            computers,
            others,
            histories,
            limits,
        }
    }

    /// Asset ID → location for the active assets behind a checklist kind
    async fn locations(&self, kind: ChecklistKind, branch: &str) -> Result<HashMap<String, String>, DatabaseError> {
        let filter = AssetFilter {
            branch: Some(branch.to_string()),
            disable: Some(false),
            ..Default::default()
        };
        let pairs: Vec<(String, String)> = match kind {
            ChecklistKind::Vendor | ChecklistKind::VendorPhysical => self
                .cctvs
                .find(&filter)
                .await?
                .into_iter()
                .map(|a| (a.id, a.input.location))
                .collect(),
            ChecklistKind::Config => self
                .computers
                .find(&filter)
                .await?
                .into_iter()
                .map(|a| (a.id, a.input.location))
                .collect(),
            ChecklistKind::Altai => {
                let filter = AssetFilter {
                    sub_category: Some(kind.unit_category().to_string()),
                    ..filter
                };
                self.others
                    .find(&filter)
                    .await?
                    .into_iter()
                    .map(|a| (a.id, a.input.location))
                    .collect()
            }
        };
        Ok(pairs.into_iter().collect())
    }

    pub async fn create(&self, user: &AuthUser, kind: ChecklistKind, note: String) -> ServiceResult<Checklist> {
        if let Some(open) = self.checklists.find_unfinished(&user.branch, kind).await? {
            return Err(ServiceError::BadRequest(format!(
                "An unfinished {} checklist already exists for {}: {}",
                kind, user.branch, open.id
            )));
        }

        let unit_filter = GenUnitFilter {
            branch: Some(user.branch.clone()),
            category: Some(kind.unit_category().to_string()),
            disable: Some(false),
            ..Default::default()
        };
        let (units, locations) = tokio::join!(self.units.find(&unit_filter), self.locations(kind, &user.branch));
        let items = build_items(&units?, &locations?);

        let now = unix_now();
        let checklist = Checklist {
            id: new_id(),
            created_at: now,
            created_by: user.identity.clone(),
            updated_at: now,
            updated_by: user.identity.clone(),
            branch: user.branch.clone(),
            kind,
            name: format!("{} {}", kind.title(), chrono::Utc::now().format("%Y-%m-%d")),
            time_started: now,
            time_ended: 0,
            is_finish: false,
            note: note.trim().to_string(),
            items,
        };
        match self.checklists.insert(&checklist).await {
            Ok(()) => {}
            Err(DatabaseError::Duplicate(_)) => {
                return Err(ServiceError::BadRequest(format!(
                    "An unfinished {} checklist already exists for {}",
                    kind, user.branch
                )))
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            "{} checklist {} created for {} with {} items",
            kind,
            checklist.id,
            checklist.branch,
            checklist.items.len()
        );
        Ok(checklist)
    }

    /// Loads a checklist of the caller's branch and kind that is still open
    async fn open_checklist(&self, user: &AuthUser, kind: ChecklistKind, id: &str) -> ServiceResult<Checklist> {
        let checklist = self.checklists.get(id).await?;
        if checklist.branch != user.branch || checklist.kind != kind {
            return Err(DatabaseError::not_found("checklist not found or not editable").into());
        }
        if checklist.is_finish {
            return Err(ServiceError::BadRequest(format!("Checklist {} is already finished", id)));
        }
        Ok(checklist)
    }

    pub async fn update_item(
        &self,
        user: &AuthUser,
        kind: ChecklistKind,
        id: &str,
        item_id: &str,
        patch: CheckItemPatch,
    ) -> ServiceResult<Checklist> {
        if patch.is_empty() {
            return Err(ServiceError::BadRequest("Nothing to update".to_string()));
        }
        if patch.is_maintained.is_some() && !kind.tracks_maintenance() {
            return Err(field_error(
                "is_maintained",
                format!("{} checklists do not track maintenance", kind),
            ));
        }

        let checklist = self.open_checklist(user, kind, id).await?;
        if !checklist.items.iter().any(|item| item.id == item_id) {
            return Err(DatabaseError::not_found(format!("checklist item {} not found", item_id)).into());
        }

        Ok(self
            .checklists
            .update_item(id, &user.branch, item_id, &patch, &stamp(user))
            .await?)
    }

    /// Marks the checklist finished and files its follow-up histories in the background
    pub async fn finish(&self, user: &AuthUser, kind: ChecklistKind, id: &str, note: String) -> ServiceResult<Checklist> {
        self.open_checklist(user, kind, id).await?;
        let finished = self
            .checklists
            .finish(id, &user.branch, note.trim(), &stamp(user))
            .await?;

        let inputs = follow_up_histories(&finished);
        if !inputs.is_empty() {
            let histories = self.histories.clone();
            let author = user.clone();
            let checklist_id = finished.id.clone();
            tokio::spawn(async move {
                for input in inputs {
                    let parent = input.parent_id.clone();
                    if let Err(e) = histories.insert(&author, input).await {
                        error!("checklist {}: history for {} not filed: {}", checklist_id, parent, e);
                    }
                }
            });
        }

        info!("{} checklist {} finished by {}", kind, id, user.identity);
        Ok(finished)
    }

    pub async fn delete(&self, user: &AuthUser, kind: ChecklistKind, id: &str) -> ServiceResult<Checklist> {
        self.open_checklist(user, kind, id).await?;
        let deleted = self.checklists.delete(id, &user.branch).await?;
        info!("{} checklist {} deleted by {}", kind, id, user.identity);
        Ok(deleted)
    }

    pub async fn get(&self, kind: ChecklistKind, id: &str) -> ServiceResult<Checklist> {
        let checklist = self.checklists.get(id).await?;
        if checklist.kind != kind {
            return Err(DatabaseError::not_found(format!("{} checklist {} not found", kind, id)).into());
        }
        Ok(checklist)
    }

    pub async fn find(&self, kind: ChecklistKind, mut filter: ChecklistFilter) -> ServiceResult<Vec<ChecklistSummary>> {
        filter.kind = Some(kind);
        filter.limit = self.limits.apply(filter.limit);
        let checklists = self.checklists.find(&filter).await?;
        Ok(checklists.iter().map(ChecklistSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::memory::{MemoryAssetStore, MemoryChecklistStore, MemoryGenUnitStore, MemoryHistoryStore};
    use crate::dao::HistoryStore;
    use crate::database::models::{AssetInput, Case};
    use crate::filter::HistoryFilter;
    use crate::services::test_support::user;
    use crate::services::{AssetPayload, AssetService};
    use std::time::Duration;

    struct Fixture {
        checklists: ChecklistService,
        cctv: AssetService<CctvDetail>,
        computers: AssetService<ComputerDetail>,
        others: AssetService<OtherDetail>,
        units: Arc<MemoryGenUnitStore>,
        histories: Arc<MemoryHistoryStore>,
    }

    fn fixture() -> Fixture {
        let limits = FindLimits::default();
        let units = Arc::new(MemoryGenUnitStore::default());
        let histories = Arc::new(MemoryHistoryStore::default());
        let cctvs = Arc::new(MemoryAssetStore::<CctvDetail>::default());
        let computers = Arc::new(MemoryAssetStore::<ComputerDetail>::default());
        let others = Arc::new(MemoryAssetStore::<OtherDetail>::default());
        let history_service = HistoryService::new(histories.clone(), units.clone(), limits);
        let checklists = ChecklistService::new(
            Arc::new(MemoryChecklistStore::default()),
            units.clone(),
            cctvs.clone(),
            computers.clone(),
            others.clone(),
            history_service,
            limits,
        );
        Fixture {
            checklists,
            cctv: AssetService::new(cctvs, units.clone(), limits),
            computers: AssetService::new(computers, units.clone(), limits),
            others: AssetService::new(others, units.clone(), limits),
            units,
            histories,
        }
    }

    async fn camera(fx: &Fixture, operator: &AuthUser, name: &str, location: &str) -> String {
        let payload = AssetPayload {
            filter_timestamp: None,
            input: AssetInput {
                name: name.to_string(),
                location: location.to_string(),
                ..Default::default()
            },
            detail: CctvDetail::default(),
        };
        fx.cctv.insert(operator, payload).await.unwrap().id
    }

    async fn other(fx: &Fixture, operator: &AuthUser, name: &str, sub_category: &str) -> String {
        let payload = AssetPayload {
            filter_timestamp: None,
            input: AssetInput {
                name: name.to_string(),
                location: "SERVER ROOM".to_string(),
                ..Default::default()
            },
            detail: OtherDetail {
                sub_category: sub_category.to_string(),
                ..Default::default()
            },
        };
        fx.others.insert(operator, payload).await.unwrap().id
    }

    #[test]
    fn items_follow_units_with_assets() {
        let mut broken = GenUnit::new("b".into(), "CCTV".into(), "CAM B".into(), String::new(), "N".into());
        broken.cases = vec![Case { case_id: "h".into(), case_note: "down".into() }];
        broken.cases_size = 1;
        let units = vec![
            GenUnit::new("c".into(), "CCTV".into(), "CAM C".into(), String::new(), "N".into()),
            broken,
            GenUnit::new("orphan".into(), "CCTV".into(), "CAM X".into(), String::new(), "N".into()),
        ];
        let locations: HashMap<String, String> =
            [("b".to_string(), "GATE".to_string()), ("c".to_string(), "GATE".to_string())].into_iter().collect();

        let items = build_items(&units, &locations);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "CAM B");
        assert!(items[0].is_checked && items[0].is_offline);
        assert_eq!(items[0].open_cases, 1);
        assert!(!items[1].is_checked);
    }

    #[tokio::test]
    async fn create_snapshots_branch_units_sorted_by_location() {
        let fx = fixture();
        let north = user("vendor1", "NORTH", &["VENDOR"]);
        let south = user("vendor2", "SOUTH", &["VENDOR"]);
        camera(&fx, &north, "CAM 2", "PARKING").await;
        camera(&fx, &north, "CAM 1", "LOBBY").await;
        camera(&fx, &south, "CAM 9", "LOBBY").await;

        let checklist = fx.checklists.create(&north, ChecklistKind::Vendor, String::new()).await.unwrap();
        let names: Vec<&str> = checklist.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["CAM 1", "CAM 2"]);
        assert!(checklist.items.iter().all(|i| !i.is_checked));

        let again = fx.checklists.create(&north, ChecklistKind::Vendor, String::new()).await;
        assert!(matches!(again, Err(ServiceError::BadRequest(_))));

        // a different kind is independent
        assert!(fx.checklists.create(&north, ChecklistKind::VendorPhysical, String::new()).await.is_ok());
    }

    #[tokio::test]
    async fn altai_checklists_only_take_altai_assets() {
        let fx = fixture();
        let north = user("budi", "NORTH", &["NORMAL"]);
        let radio = other(&fx, &north, "ALTAI 1", "altai").await;
        other(&fx, &north, "UPS 1", "UPS").await;
        camera(&fx, &north, "CAM 1", "LOBBY").await;

        let checklist = fx.checklists.create(&north, ChecklistKind::Altai, String::new()).await.unwrap();
        assert_eq!(checklist.items.len(), 1);
        assert_eq!(checklist.items[0].id, radio);
        assert_eq!(checklist.items[0].category, "ALTAI");
        assert_eq!(checklist.items[0].location, "SERVER ROOM");
    }

    #[tokio::test]
    async fn config_checklists_take_computers() {
        let fx = fixture();
        let north = user("budi", "NORTH", &["NORMAL"]);
        let payload = AssetPayload {
            filter_timestamp: None,
            input: AssetInput {
                name: "PC TELLER 1".to_string(),
                location: "TELLER".to_string(),
                ..Default::default()
            },
            detail: ComputerDetail {
                hostname: "teller-01".to_string(),
                ..Default::default()
            },
        };
        let pc = fx.computers.insert(&north, payload).await.unwrap().id;
        camera(&fx, &north, "CAM 1", "LOBBY").await;

        let checklist = fx.checklists.create(&north, ChecklistKind::Config, String::new()).await.unwrap();
        assert_eq!(checklist.items.len(), 1);
        assert_eq!(checklist.items[0].id, pc);
        assert_eq!(checklist.items[0].category, "PC");
        assert_eq!(checklist.items[0].location, "TELLER");
    }

    #[tokio::test]
    async fn concurrent_creates_leave_one_unfinished_checklist() {
        let fx = fixture();
        let north = user("vendor1", "NORTH", &["VENDOR"]);
        camera(&fx, &north, "CAM 1", "LOBBY").await;

        let (first, second) = tokio::join!(
            fx.checklists.create(&north, ChecklistKind::Vendor, String::new()),
            fx.checklists.create(&north, ChecklistKind::Vendor, String::new())
        );
        let created = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(created, 1);
        let refused = if first.is_err() { first } else { second };
        assert!(matches!(refused, Err(ServiceError::BadRequest(_))));

        let summaries = fx.checklists.find(ChecklistKind::Vendor, ChecklistFilter::default()).await.unwrap();
        assert_eq!(summaries.len(), 1);
    }

    #[tokio::test]
    async fn disabled_assets_are_left_out() {
        let fx = fixture();
        let north = user("vendor1", "NORTH", &["VENDOR"]);
        camera(&fx, &north, "CAM 1", "LOBBY").await;
        let retired = camera(&fx, &north, "CAM OLD", "LOBBY").await;
        fx.cctv.disable(&north, &retired, true).await.unwrap();

        let checklist = fx.checklists.create(&north, ChecklistKind::Vendor, String::new()).await.unwrap();
        assert_eq!(checklist.items.len(), 1);
    }

    #[tokio::test]
    async fn maintenance_is_only_tracked_on_physical_checks() {
        let fx = fixture();
        let north = user("vendor1", "NORTH", &["VENDOR"]);
        let cam = camera(&fx, &north, "CAM 1", "LOBBY").await;
        let checklist = fx.checklists.create(&north, ChecklistKind::Vendor, String::new()).await.unwrap();

        let patch = CheckItemPatch { is_maintained: Some(true), ..Default::default() };
        let result = fx.checklists.update_item(&north, ChecklistKind::Vendor, &checklist.id, &cam, patch).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn finished_checklists_are_frozen_and_file_histories() {
        let fx = fixture();
        let north = user("vendor1", "NORTH", &["VENDOR"]);
        let down = camera(&fx, &north, "CAM 1", "LOBBY").await;
        let fine = camera(&fx, &north, "CAM 2", "LOBBY").await;
        let kind = ChecklistKind::VendorPhysical;
        let checklist = fx.checklists.create(&north, kind, String::new()).await.unwrap();

        let offline = CheckItemPatch { is_checked: Some(true), is_offline: Some(true), ..Default::default() };
        let updated = fx.checklists.update_item(&north, kind, &checklist.id, &down, offline).await.unwrap();
        let item = updated.items.iter().find(|i| i.id == down).unwrap();
        assert_eq!(item.checked_by, "vendor1");
        assert!(item.is_offline);

        let maintained = CheckItemPatch { is_checked: Some(true), is_maintained: Some(true), ..Default::default() };
        fx.checklists.update_item(&north, kind, &checklist.id, &fine, maintained).await.unwrap();

        let finished = fx.checklists.finish(&north, kind, &checklist.id, "done".into()).await.unwrap();
        assert!(finished.is_finish);
        assert!(finished.time_ended > 0);

        let late = CheckItemPatch { note: Some("late".into()), ..Default::default() };
        let result = fx.checklists.update_item(&north, kind, &checklist.id, &down, late).await;
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));
        assert!(fx.checklists.delete(&north, kind, &checklist.id).await.is_err());

        // follow-up histories are filed by a spawned task
        let mut filed = Vec::new();
        for _ in 0..50 {
            filed = fx.histories.find(&HistoryFilter::default()).await.unwrap();
            if filed.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(filed.len(), 2);
        let outage = filed.iter().find(|h| h.parent_id == down).unwrap();
        assert_eq!(outage.complete_status, HistoryStatus::Progress.code());
        let service_visit = filed.iter().find(|h| h.parent_id == fine).unwrap();
        assert_eq!(service_visit.complete_status, HistoryStatus::Info.code());
        assert_eq!(fx.units.get(&down).await.unwrap().cases_size, 1);
    }

    #[tokio::test]
    async fn units_with_open_cases_are_not_filed_twice() {
        let fx = fixture();
        let north = user("vendor1", "NORTH", &["VENDOR"]);
        let cam = camera(&fx, &north, "CAM 1", "LOBBY").await;
        let case = Case { case_id: "h0".into(), case_note: "known outage".into() };
        fx.units.insert_case(&cam, &case).await.unwrap();

        let checklist = fx.checklists.create(&north, ChecklistKind::Vendor, String::new()).await.unwrap();
        assert!(checklist.items[0].is_offline);
        let finished = fx.checklists.finish(&north, ChecklistKind::Vendor, &checklist.id, String::new()).await.unwrap();
        assert!(follow_up_histories(&finished).is_empty());
    }

    #[tokio::test]
    async fn summaries_count_items() {
        let fx = fixture();
        let north = user("vendor1", "NORTH", &["VENDOR"]);
        camera(&fx, &north, "CAM 1", "LOBBY").await;
        camera(&fx, &north, "CAM 2", "LOBBY").await;
        fx.checklists.create(&north, ChecklistKind::Vendor, String::new()).await.unwrap();

        let summaries = fx.checklists.find(ChecklistKind::Vendor, ChecklistFilter::default()).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].items_count, 2);
        assert_eq!(summaries[0].checked_count, 0);
        assert!(fx.checklists.find(ChecklistKind::Altai, ChecklistFilter::default()).await.unwrap().is_empty());
    }
}
