use async_trait::async_trait;
use mongodb::bson::{doc, to_bson};

use crate::dao::GenUnitStore;
use crate::database::models::genunit::PING_HISTORY;
use crate::database::models::{Case, GenUnit, GenUnitEdit, PingState};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::filter::GenUnitFilter;

pub const COLLECTION: &str = "genunit";

pub struct MongoGenUnitStore {
    repo: Repository<GenUnit>,
}

impl MongoGenUnitStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            repo: Repository::new(manager, COLLECTION),
        }
    }
}

#[async_trait]
impl GenUnitStore for MongoGenUnitStore {
    async fn insert(&self, unit: &GenUnit) -> Result<(), DatabaseError> {
        self.repo.insert(unit).await
    }

    async fn edit(&self, id: &str, edit: &GenUnitEdit) -> Result<GenUnit, DatabaseError> {
        let update = doc! {
            "$set": {
                "category": edit.category.as_str(),
                "name": edit.name.as_str(),
                "ip": edit.ip.as_str(),
                "branch": edit.branch.as_str(),
            }
        };
        self.repo.update_404(doc! { "_id": id }, update).await
    }

    async fn set_disable(&self, id: &str, disable: bool) -> Result<GenUnit, DatabaseError> {
        self.repo
            .update_404(doc! { "_id": id }, doc! { "$set": { "disable": disable } })
            .await
    }

    async fn delete(&self, id: &str) -> Result<GenUnit, DatabaseError> {
        self.repo.delete_404(doc! { "_id": id }).await
    }

    async fn get(&self, id: &str) -> Result<GenUnit, DatabaseError> {
        self.repo.select_404(doc! { "_id": id }).await
    }

    async fn find(&self, filter: &GenUnitFilter) -> Result<Vec<GenUnit>, DatabaseError> {
        self.repo
            .select_any(
                filter.to_document(),
                GenUnitFilter::sort_document(),
                filter.limit.unwrap_or(0),
            )
            .await
    }

    async fn insert_case(&self, id: &str, case: &Case) -> Result<GenUnit, DatabaseError> {
        let update = doc! {
            "$push": { "cases": to_bson(case)? },
            "$inc": { "cases_size": 1 },
        };
        // A case is counted once
        let filter = doc! { "_id": id, "cases.case_id": { "$ne": case.case_id.as_str() } };
        match self.repo.update_404(filter, update).await {
            Ok(unit) => Ok(unit),
            Err(DatabaseError::NotFound(_)) => self.get(id).await,
            Err(other) => Err(other),
        }
    }

    async fn delete_case(&self, id: &str, case_id: &str) -> Result<GenUnit, DatabaseError> {
        let filter = doc! { "_id": id, "cases.case_id": case_id };
        let update = doc! {
            "$pull": { "cases": { "case_id": case_id } },
            "$inc": { "cases_size": -1 },
        };
        match self.repo.update_404(filter, update).await {
            Ok(unit) => Ok(unit),
            // Case already gone: report the unit as it is
            Err(DatabaseError::NotFound(_)) => self.get(id).await,
            Err(other) => Err(other),
        }
    }

    async fn append_ping(&self, id: &str, ping: &PingState) -> Result<GenUnit, DatabaseError> {
        let keep = -(PING_HISTORY as i32);
        let update = doc! {
            "$push": { "pings_state": { "$each": [to_bson(ping)?], "$slice": keep } },
            "$set": { "last_ping": ping.time },
        };
        self.repo.update_404(doc! { "_id": id }, update).await
    }
}
