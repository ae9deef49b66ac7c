use async_trait::async_trait;
use mongodb::bson::{doc, to_bson};

use crate::dao::HistoryStore;
use crate::database::models::{History, HistoryEdit};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::filter::HistoryFilter;

pub const COLLECTION: &str = "history";

pub struct MongoHistoryStore {
    repo: Repository<History>,
}

impl MongoHistoryStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            repo: Repository::new(manager, COLLECTION),
        }
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn insert(&self, history: &History) -> Result<(), DatabaseError> {
        self.repo.insert(history).await
    }

    async fn edit(&self, edit: &HistoryEdit) -> Result<History, DatabaseError> {
        let filter = doc! {
            "_id": edit.id.as_str(),
            "branch": edit.branch.as_str(),
            "updated_at": edit.filter_timestamp,
        };
        let update = doc! {
            "$set": {
                "problem": edit.problem.as_str(),
                "problem_resolve": edit.problem_resolve.as_str(),
                "complete_status": edit.complete_status,
                "date_end": edit.date_end,
                "tag": edit.tag.clone(),
                "note": edit.note.as_str(),
                "updated_at": edit.update.time,
                "updated_by": edit.update.updated_by.as_str(),
            },
            "$push": { "updates": to_bson(&edit.update)? },
        };
        self.repo.update_404(filter, update).await
    }

    async fn delete(&self, id: &str, branch: &str, created_after: i64) -> Result<History, DatabaseError> {
        self.repo
            .delete_404(doc! { "_id": id, "branch": branch, "created_at": { "$gte": created_after } })
            .await
    }

    async fn get(&self, id: &str) -> Result<History, DatabaseError> {
        self.repo.select_404(doc! { "_id": id }).await
    }

    async fn find(&self, filter: &HistoryFilter) -> Result<Vec<History>, DatabaseError> {
        self.repo
            .select_any(
                filter.to_document(),
                HistoryFilter::sort_document(),
                filter.limit.unwrap_or(0),
            )
            .await
    }
}
