use async_trait::async_trait;
use mongodb::bson::{doc, to_bson, to_document, Document};

use crate::dao::{Stamp, StockStore};
use crate::database::models::{Stock, StockChange, StockInput, StockMode};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::filter::StockFilter;

pub const COLLECTION: &str = "stock";

pub struct MongoStockStore {
    repo: Repository<Stock>,
}

impl MongoStockStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            repo: Repository::new(manager, COLLECTION),
        }
    }
}

#[async_trait]
impl StockStore for MongoStockStore {
    async fn insert(&self, stock: &Stock) -> Result<(), DatabaseError> {
        self.repo.insert(stock).await
    }

    async fn edit(
        &self,
        id: &str,
        branch: &str,
        filter_timestamp: i64,
        input: &StockInput,
        stamp: &Stamp,
    ) -> Result<Stock, DatabaseError> {
        let mut set = to_document(input)?;
        set.insert("updated_at", stamp.at);
        set.insert("updated_by", stamp.by.as_str());
        let filter = doc! { "_id": id, "branch": branch, "updated_at": filter_timestamp };
        self.repo.update_404(filter, doc! { "$set": set }).await
    }

    async fn delete(&self, id: &str, branch: &str) -> Result<Stock, DatabaseError> {
        self.repo.delete_404(doc! { "_id": id, "branch": branch }).await
    }

    async fn set_disable(&self, id: &str, branch: &str, disable: bool, stamp: &Stamp) -> Result<Stock, DatabaseError> {
        let update = doc! {
            "$set": { "disable": disable, "updated_at": stamp.at, "updated_by": stamp.by.as_str() }
        };
        self.repo
            .update_404(doc! { "_id": id, "branch": branch }, update)
            .await
    }

    async fn get(&self, id: &str) -> Result<Stock, DatabaseError> {
        self.repo.select_404(doc! { "_id": id }).await
    }

    async fn find(&self, filter: &StockFilter) -> Result<Vec<Stock>, DatabaseError> {
        self.repo
            .select_any(
                filter.to_document(),
                StockFilter::sort_document(),
                filter.limit.unwrap_or(0),
            )
            .await
    }

    async fn change_qty(
        &self,
        id: &str,
        branch: &str,
        mode: StockMode,
        change: &StockChange,
    ) -> Result<Stock, DatabaseError> {
        let mut filter = doc! { "_id": id, "branch": branch, "disable": false };
        match mode {
            StockMode::Decrement => filter.insert("quantity", doc! { "$gte": change.qty }),
            StockMode::Increment => filter.insert("quantity", doc! { "$lte": i64::MAX - change.qty }),
        };
        let mut push = Document::new();
        push.insert(mode.field(), to_bson(change)?);
        let update = doc! {
            "$inc": { "quantity": mode.delta(change.qty) },
            "$push": push,
            "$set": { "updated_at": change.time, "updated_by": change.author.as_str() },
        };
        self.repo.update_404(filter, update).await
    }
}
