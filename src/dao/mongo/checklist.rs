use async_trait::async_trait;
use mongodb::bson::{doc, Document};

use crate::dao::{ChecklistStore, Stamp};
use crate::database::models::{CheckItemPatch, Checklist};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::filter::ChecklistFilter;
use crate::types::ChecklistKind;

pub const COLLECTION: &str = "checklist";

pub struct MongoChecklistStore {
    repo: Repository<Checklist>,
}

impl MongoChecklistStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            repo: Repository::new(manager, COLLECTION),
        }
    }
}

/// `$set` for one embedded item through the positional operator
fn item_update(patch: &CheckItemPatch, stamp: &Stamp) -> Document {
    let mut set = Document::new();
    if let Some(v) = patch.is_checked {
        set.insert("items.$.is_checked", v);
    }
    if let Some(v) = patch.is_offline {
        set.insert("items.$.is_offline", v);
    }
    if let Some(v) = patch.is_maintained {
        set.insert("items.$.is_maintained", v);
    }
    if let Some(ref v) = patch.note {
        set.insert("items.$.note", v.as_str());
    }
    set.insert("items.$.checked_at", stamp.at);
    set.insert("items.$.checked_by", stamp.by.as_str());
    set.insert("updated_at", stamp.at);
    set.insert("updated_by", stamp.by.as_str());
    doc! { "$set": set }
}

#[async_trait]
impl ChecklistStore for MongoChecklistStore {
    async fn insert(&self, checklist: &Checklist) -> Result<(), DatabaseError> {
        self.repo.insert(checklist).await
    }

    async fn get(&self, id: &str) -> Result<Checklist, DatabaseError> {
        self.repo.select_404(doc! { "_id": id }).await
    }

    async fn find(&self, filter: &ChecklistFilter) -> Result<Vec<Checklist>, DatabaseError> {
        self.repo
            .select_any(
                filter.to_document(),
                ChecklistFilter::sort_document(),
                filter.limit.unwrap_or(0),
            )
            .await
    }

    async fn find_unfinished(&self, branch: &str, kind: ChecklistKind) -> Result<Option<Checklist>, DatabaseError> {
        self.repo
            .select_one(doc! { "branch": branch, "kind": kind.as_str(), "is_finish": false })
            .await
    }

    async fn update_item(
        &self,
        id: &str,
        branch: &str,
        item_id: &str,
        patch: &CheckItemPatch,
        stamp: &Stamp,
    ) -> Result<Checklist, DatabaseError> {
        let filter = doc! { "_id": id, "branch": branch, "is_finish": false, "items.id": item_id };
        self.repo.update_404(filter, item_update(patch, stamp)).await
    }

    async fn finish(&self, id: &str, branch: &str, note: &str, stamp: &Stamp) -> Result<Checklist, DatabaseError> {
        let filter = doc! { "_id": id, "branch": branch, "is_finish": false };
        let update = doc! {
            "$set": {
                "is_finish": true,
                "time_ended": stamp.at,
                "note": note,
                "updated_at": stamp.at,
                "updated_by": stamp.by.as_str(),
            }
        };
        self.repo.update_404(filter, update).await
    }

    async fn delete(&self, id: &str, branch: &str) -> Result<Checklist, DatabaseError> {
        self.repo
            .delete_404(doc! { "_id": id, "branch": branch, "is_finish": false })
            .await
    }
}
