//! Store traits, one per collection.
//!
//! Services only see these traits. `mongo` holds the production
//! implementations, `memory` an in-process one with the same semantics
//! that backs tests and `--memory` runs.

use async_trait::async_trait;

use crate::database::models::{
    AssetDoc, AssetInput, AssetKind, Case, CheckItemPatch, Checklist, GenUnit, GenUnitEdit,
    History, HistoryEdit, PingState, Stock, StockChange, StockInput, StockMode, User, UserEdit,
};
use crate::database::DatabaseError;
use crate::filter::{AssetFilter, ChecklistFilter, GenUnitFilter, HistoryFilter, StockFilter, UserFilter};
use crate::types::ChecklistKind;

pub mod memory;
pub mod mongo;

/// Who changed a document and when
#[derive(Debug, Clone)]
pub struct Stamp {
    pub by: String,
    pub at: i64,
}

#[async_trait]
pub trait AssetStore<D: AssetKind>: Send + Sync {
    async fn insert(&self, asset: &AssetDoc<D>) -> Result<(), DatabaseError>;

    /// Only matches while `updated_at == filter_timestamp`
    async fn edit(
        &self,
        id: &str,
        branch: &str,
        filter_timestamp: i64,
        input: &AssetInput,
        detail: &D,
        stamp: &Stamp,
    ) -> Result<AssetDoc<D>, DatabaseError>;

    async fn delete(&self, id: &str, branch: &str) -> Result<AssetDoc<D>, DatabaseError>;

    async fn set_disable(
        &self,
        id: &str,
        branch: &str,
        disable: bool,
        stamp: &Stamp,
    ) -> Result<AssetDoc<D>, DatabaseError>;

    async fn get(&self, id: &str) -> Result<AssetDoc<D>, DatabaseError>;

    async fn find(&self, filter: &AssetFilter) -> Result<Vec<AssetDoc<D>>, DatabaseError>;
}

#[async_trait]
pub trait GenUnitStore: Send + Sync {
    async fn insert(&self, unit: &GenUnit) -> Result<(), DatabaseError>;
    async fn edit(&self, id: &str, edit: &GenUnitEdit) -> Result<GenUnit, DatabaseError>;
    async fn set_disable(&self, id: &str, disable: bool) -> Result<GenUnit, DatabaseError>;
    async fn delete(&self, id: &str) -> Result<GenUnit, DatabaseError>;
    async fn get(&self, id: &str) -> Result<GenUnit, DatabaseError>;
    async fn find(&self, filter: &GenUnitFilter) -> Result<Vec<GenUnit>, DatabaseError>;
    async fn insert_case(&self, id: &str, case: &Case) -> Result<GenUnit, DatabaseError>;
    /// Pulls the case; `cases_size` only drops when the case was present
    async fn delete_case(&self, id: &str, case_id: &str) -> Result<GenUnit, DatabaseError>;
    /// Keeps the most recent `PING_HISTORY` states
    async fn append_ping(&self, id: &str, ping: &PingState) -> Result<GenUnit, DatabaseError>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert(&self, history: &History) -> Result<(), DatabaseError>;
    /// Only matches while `updated_at == edit.filter_timestamp`
    async fn edit(&self, edit: &HistoryEdit) -> Result<History, DatabaseError>;
    /// Only matches entries created at or after `created_after`
    async fn delete(&self, id: &str, branch: &str, created_after: i64) -> Result<History, DatabaseError>;
    async fn get(&self, id: &str) -> Result<History, DatabaseError>;
    async fn find(&self, filter: &HistoryFilter) -> Result<Vec<History>, DatabaseError>;
}

#[async_trait]
pub trait StockStore: Send + Sync {
    async fn insert(&self, stock: &Stock) -> Result<(), DatabaseError>;
    async fn edit(
        &self,
        id: &str,
        branch: &str,
        filter_timestamp: i64,
        input: &StockInput,
        stamp: &Stamp,
    ) -> Result<Stock, DatabaseError>;
    async fn delete(&self, id: &str, branch: &str) -> Result<Stock, DatabaseError>;
    async fn set_disable(&self, id: &str, branch: &str, disable: bool, stamp: &Stamp) -> Result<Stock, DatabaseError>;
    async fn get(&self, id: &str) -> Result<Stock, DatabaseError>;
    async fn find(&self, filter: &StockFilter) -> Result<Vec<Stock>, DatabaseError>;
    /// A decrement only matches while `quantity >= change.qty`
    async fn change_qty(
        &self,
        id: &str,
        branch: &str,
        mode: StockMode,
        change: &StockChange,
    ) -> Result<Stock, DatabaseError>;
}

#[async_trait]
pub trait ChecklistStore: Send + Sync {
    async fn insert(&self, checklist: &Checklist) -> Result<(), DatabaseError>;
    async fn get(&self, id: &str) -> Result<Checklist, DatabaseError>;
    async fn find(&self, filter: &ChecklistFilter) -> Result<Vec<Checklist>, DatabaseError>;
    async fn find_unfinished(&self, branch: &str, kind: ChecklistKind) -> Result<Option<Checklist>, DatabaseError>;
    /// Only matches unfinished checklists
    async fn update_item(
        &self,
        id: &str,
        branch: &str,
        item_id: &str,
        patch: &CheckItemPatch,
        stamp: &Stamp,
    ) -> Result<Checklist, DatabaseError>;
    /// Only matches unfinished checklists
    async fn finish(&self, id: &str, branch: &str, note: &str, stamp: &Stamp) -> Result<Checklist, DatabaseError>;
    /// Only matches unfinished checklists
    async fn delete(&self, id: &str, branch: &str) -> Result<Checklist, DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError>;
    async fn get(&self, id: &str) -> Result<User, DatabaseError>;
    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError>;
    async fn edit(&self, id: &str, edit: &UserEdit, updated_at: i64) -> Result<User, DatabaseError>;
    async fn change_password(&self, id: &str, hashed_password: &str, updated_at: i64) -> Result<(), DatabaseError>;
    async fn delete(&self, id: &str) -> Result<User, DatabaseError>;
}
