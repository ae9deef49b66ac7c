use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::dao::{AssetStore, ChecklistStore, GenUnitStore, HistoryStore, Stamp, StockStore, UserStore};
use crate::database::models::genunit::PING_HISTORY;
use crate::database::models::{
    AssetDoc, AssetInput, AssetKind, Case, CheckItemPatch, Checklist, GenUnit, GenUnitEdit,
    History, HistoryEdit, PingState, Stock, StockChange, StockInput, StockMode, User, UserEdit,
};
use crate::database::DatabaseError;
use crate::filter::{AssetFilter, ChecklistFilter, GenUnitFilter, HistoryFilter, StockFilter, UserFilter};
use crate::types::ChecklistKind;

type Table<T> = RwLock<HashMap<String, T>>;

fn not_found(collection: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found or not editable", collection))
}

fn select<T: Clone>(
    table: &HashMap<String, T>,
    keep: impl Fn(&T) -> bool,
    order: fn(&T, &T) -> Ordering,
    limit: Option<i64>,
) -> Vec<T> {
    let mut rows: Vec<T> = table.values().filter(|row| keep(row)).cloned().collect();
    rows.sort_by(order);
    match limit {
        Some(n) if n > 0 => rows.into_iter().take(n as usize).collect(),
        _ => rows,
    }
}

fn insert_new<T: Clone>(table: &mut HashMap<String, T>, id: &str, row: &T, collection: &str) -> Result<(), DatabaseError> {
    if table.contains_key(id) {
        return Err(DatabaseError::Duplicate(format!("document already exists in {}", collection)));
    }
    table.insert(id.to_string(), row.clone());
    Ok(())
}

pub struct MemoryAssetStore<D> {
    rows: Table<AssetDoc<D>>,
}

impl<D> Default for MemoryAssetStore<D> {
    fn default() -> Self {
        Self { rows: RwLock::new(HashMap::new()) }
    }
}

#[async_trait]
impl<D: AssetKind> AssetStore<D> for MemoryAssetStore<D> {
    async fn insert(&self, asset: &AssetDoc<D>) -> Result<(), DatabaseError> {
        insert_new(&mut *self.rows.write().await, &asset.id, asset, D::COLLECTION)
    }

    async fn edit(
        &self,
        id: &str,
        branch: &str,
        filter_timestamp: i64,
        input: &AssetInput,
        detail: &D,
        stamp: &Stamp,
    ) -> Result<AssetDoc<D>, DatabaseError> {
        let mut rows = self.rows.write().await;
        let asset = rows
            .get_mut(id)
            .filter(|a| a.branch == branch && a.updated_at == filter_timestamp)
            .ok_or_else(|| not_found(D::COLLECTION))?;
        asset.input = input.clone();
        asset.detail = detail.clone();
        asset.updated_at = stamp.at;
        asset.updated_by = stamp.by.clone();
        Ok(asset.clone())
    }

    async fn delete(&self, id: &str, branch: &str) -> Result<AssetDoc<D>, DatabaseError> {
        let mut rows = self.rows.write().await;
        match rows.get(id) {
            Some(a) if a.branch == branch => rows.remove(id).ok_or_else(|| not_found(D::COLLECTION)),
            _ => Err(not_found(D::COLLECTION)),
        }
    }

    async fn set_disable(
        &self,
        id: &str,
        branch: &str,
        disable: bool,
        stamp: &Stamp,
    ) -> Result<AssetDoc<D>, DatabaseError> {
        let mut rows = self.rows.write().await;
        let asset = rows
            .get_mut(id)
            .filter(|a| a.branch == branch)
            .ok_or_else(|| not_found(D::COLLECTION))?;
        asset.disable = disable;
        asset.updated_at = stamp.at;
        asset.updated_by = stamp.by.clone();
        Ok(asset.clone())
    }

    async fn get(&self, id: &str) -> Result<AssetDoc<D>, DatabaseError> {
        self.rows.read().await.get(id).cloned().ok_or_else(|| not_found(D::COLLECTION))
    }

    async fn find(&self, filter: &AssetFilter) -> Result<Vec<AssetDoc<D>>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(select(&rows, |a| filter.matches(a), AssetFilter::order, filter.limit))
    }
}

#[derive(Default)]
pub struct MemoryGenUnitStore {
    rows: Table<GenUnit>,
}

const GENUNIT: &str = "genunit";

#[async_trait]
impl GenUnitStore for MemoryGenUnitStore {
    async fn insert(&self, unit: &GenUnit) -> Result<(), DatabaseError> {
        insert_new(&mut *self.rows.write().await, &unit.id, unit, GENUNIT)
    }

    async fn edit(&self, id: &str, edit: &GenUnitEdit) -> Result<GenUnit, DatabaseError> {
        let mut rows = self.rows.write().await;
        let unit = rows.get_mut(id).ok_or_else(|| not_found(GENUNIT))?;
        unit.category = edit.category.clone();
        unit.name = edit.name.clone();
        unit.ip = edit.ip.clone();
        unit.branch = edit.branch.clone();
        Ok(unit.clone())
    }

    async fn set_disable(&self, id: &str, disable: bool) -> Result<GenUnit, DatabaseError> {
        let mut rows = self.rows.write().await;
        let unit = rows.get_mut(id).ok_or_else(|| not_found(GENUNIT))?;
        unit.disable = disable;
        Ok(unit.clone())
    }

    async fn delete(&self, id: &str) -> Result<GenUnit, DatabaseError> {
        self.rows.write().await.remove(id).ok_or_else(|| not_found(GENUNIT))
    }

    async fn get(&self, id: &str) -> Result<GenUnit, DatabaseError> {
        self.rows.read().await.get(id).cloned().ok_or_else(|| not_found(GENUNIT))
    }

    async fn find(&self, filter: &GenUnitFilter) -> Result<Vec<GenUnit>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(select(&rows, |u| filter.matches(u), GenUnitFilter::order, filter.limit))
    }

    async fn insert_case(&self, id: &str, case: &Case) -> Result<GenUnit, DatabaseError> {
        let mut rows = self.rows.write().await;
        let unit = rows.get_mut(id).ok_or_else(|| not_found(GENUNIT))?;
        if !unit.cases.iter().any(|c| c.case_id == case.case_id) {
            unit.cases.push(case.clone());
            unit.cases_size += 1;
        }
        Ok(unit.clone())
    }

    async fn delete_case(&self, id: &str, case_id: &str) -> Result<GenUnit, DatabaseError> {
        let mut rows = self.rows.write().await;
        let unit = rows.get_mut(id).ok_or_else(|| not_found(GENUNIT))?;
        if unit.cases.iter().any(|c| c.case_id == case_id) {
            unit.cases.retain(|c| c.case_id != case_id);
            unit.cases_size -= 1;
        }
        Ok(unit.clone())
    }

    async fn append_ping(&self, id: &str, ping: &PingState) -> Result<GenUnit, DatabaseError> {
        let mut rows = self.rows.write().await;
        let unit = rows.get_mut(id).ok_or_else(|| not_found(GENUNIT))?;
        unit.pings_state.push(ping.clone());
        let overflow = unit.pings_state.len().saturating_sub(PING_HISTORY);
        unit.pings_state.drain(..overflow);
        unit.last_ping = ping.time;
        Ok(unit.clone())
    }
}

#[derive(Default)]
pub struct MemoryHistoryStore {
    rows: Table<History>,
}

const HISTORY: &str = "history";

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn insert(&self, history: &History) -> Result<(), DatabaseError> {
        insert_new(&mut *self.rows.write().await, &history.id, history, HISTORY)
    }

    async fn edit(&self, edit: &HistoryEdit) -> Result<History, DatabaseError> {
        let mut rows = self.rows.write().await;
        let history = rows
            .get_mut(&edit.id)
            .filter(|h| h.branch == edit.branch && h.updated_at == edit.filter_timestamp)
            .ok_or_else(|| not_found(HISTORY))?;
        history.problem = edit.problem.clone();
        history.problem_resolve = edit.problem_resolve.clone();
        history.complete_status = edit.complete_status;
        history.date_end = edit.date_end;
        history.tag = edit.tag.clone();
        history.note = edit.note.clone();
        history.updated_at = edit.update.time;
        history.updated_by = edit.update.updated_by.clone();
        history.updates.push(edit.update.clone());
        Ok(history.clone())
    }

    async fn delete(&self, id: &str, branch: &str, created_after: i64) -> Result<History, DatabaseError> {
        let mut rows = self.rows.write().await;
        match rows.get(id) {
            Some(h) if h.branch == branch && h.created_at >= created_after => {
                rows.remove(id).ok_or_else(|| not_found(HISTORY))
            }
            _ => Err(not_found(HISTORY)),
        }
    }

    async fn get(&self, id: &str) -> Result<History, DatabaseError> {
        self.rows.read().await.get(id).cloned().ok_or_else(|| not_found(HISTORY))
    }

    async fn find(&self, filter: &HistoryFilter) -> Result<Vec<History>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(select(&rows, |h| filter.matches(h), HistoryFilter::order, filter.limit))
    }
}

#[derive(Default)]
pub struct MemoryStockStore {
    rows: Table<Stock>,
}

const STOCK: &str = "stock";

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn insert(&self, stock: &Stock) -> Result<(), DatabaseError> {
        insert_new(&mut *self.rows.write().await, &stock.id, stock, STOCK)
    }

    async fn edit(
        &self,
        id: &str,
        branch: &str,
        filter_timestamp: i64,
        input: &StockInput,
        stamp: &Stamp,
    ) -> Result<Stock, DatabaseError> {
        let mut rows = self.rows.write().await;
        let stock = rows
            .get_mut(id)
            .filter(|s| s.branch == branch && s.updated_at == filter_timestamp)
            .ok_or_else(|| not_found(STOCK))?;
        stock.input = input.clone();
        stock.updated_at = stamp.at;
        stock.updated_by = stamp.by.clone();
        Ok(stock.clone())
    }

    async fn delete(&self, id: &str, branch: &str) -> Result<Stock, DatabaseError> {
        let mut rows = self.rows.write().await;
        match rows.get(id) {
            Some(s) if s.branch == branch => rows.remove(id).ok_or_else(|| not_found(STOCK)),
            _ => Err(not_found(STOCK)),
        }
    }

    async fn set_disable(&self, id: &str, branch: &str, disable: bool, stamp: &Stamp) -> Result<Stock, DatabaseError> {
        let mut rows = self.rows.write().await;
        let stock = rows
            .get_mut(id)
            .filter(|s| s.branch == branch)
            .ok_or_else(|| not_found(STOCK))?;
        stock.disable = disable;
        stock.updated_at = stamp.at;
        stock.updated_by = stamp.by.clone();
        Ok(stock.clone())
    }

    async fn get(&self, id: &str) -> Result<Stock, DatabaseError> {
        self.rows.read().await.get(id).cloned().ok_or_else(|| not_found(STOCK))
    }

    async fn find(&self, filter: &StockFilter) -> Result<Vec<Stock>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(select(&rows, |s| filter.matches(s), StockFilter::order, filter.limit))
    }

    async fn change_qty(
        &self,
        id: &str,
        branch: &str,
        mode: StockMode,
        change: &StockChange,
    ) -> Result<Stock, DatabaseError> {
        let mut rows = self.rows.write().await;
        let stock = rows
            .get_mut(id)
            .filter(|s| s.branch == branch && !s.disable)
            .filter(|s| mode == StockMode::Increment || s.quantity >= change.qty)
            .ok_or_else(|| not_found(STOCK))?;
        stock.quantity = stock
            .quantity
            .checked_add(mode.delta(change.qty))
            .ok_or_else(|| DatabaseError::QueryError(format!("{} quantity out of range", STOCK)))?;
        match mode {
            StockMode::Increment => stock.increment.push(change.clone()),
            StockMode::Decrement => stock.decrement.push(change.clone()),
        }
        stock.updated_at = change.time;
        stock.updated_by = change.author.clone();
        Ok(stock.clone())
    }
}

#[derive(Default)]
pub struct MemoryChecklistStore {
    rows: Table<Checklist>,
}

const CHECKLIST: &str = "checklist";

impl MemoryChecklistStore {
    /// Applies `change` to an unfinished checklist of the branch
    async fn modify_open<F>(&self, id: &str, branch: &str, change: F) -> Result<Checklist, DatabaseError>
    where
        F: FnOnce(&mut Checklist) -> bool + Send,
    {
        let mut rows = self.rows.write().await;
        let checklist = rows
            .get_mut(id)
            .filter(|c| c.branch == branch && !c.is_finish)
            .ok_or_else(|| not_found(CHECKLIST))?;
        if !change(checklist) {
            return Err(not_found(CHECKLIST));
        }
        Ok(checklist.clone())
    }
}

#[async_trait]
impl ChecklistStore for MemoryChecklistStore {
    async fn insert(&self, checklist: &Checklist) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        let open_twice = !checklist.is_finish
            && rows
                .values()
                .any(|c| c.branch == checklist.branch && c.kind == checklist.kind && !c.is_finish);
        if open_twice {
            return Err(DatabaseError::Duplicate(format!(
                "unfinished {} {} checklist already exists in {}",
                checklist.branch, checklist.kind, CHECKLIST
            )));
        }
        insert_new(&mut rows, &checklist.id, checklist, CHECKLIST)
    }

    async fn get(&self, id: &str) -> Result<Checklist, DatabaseError> {
        self.rows.read().await.get(id).cloned().ok_or_else(|| not_found(CHECKLIST))
    }

    async fn find(&self, filter: &ChecklistFilter) -> Result<Vec<Checklist>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(select(&rows, |c| filter.matches(c), ChecklistFilter::order, filter.limit))
    }

    async fn find_unfinished(&self, branch: &str, kind: ChecklistKind) -> Result<Option<Checklist>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|c| c.branch == branch && c.kind == kind && !c.is_finish)
            .cloned())
    }

    async fn update_item(
        &self,
        id: &str,
        branch: &str,
        item_id: &str,
        patch: &CheckItemPatch,
        stamp: &Stamp,
    ) -> Result<Checklist, DatabaseError> {
        self.modify_open(id, branch, |checklist| {
            match checklist.items.iter_mut().find(|item| item.id == item_id) {
                Some(item) => {
                    patch.apply(item, &stamp.by, stamp.at);
                    checklist.updated_at = stamp.at;
                    checklist.updated_by = stamp.by.clone();
                    true
                }
                None => false,
            }
        })
        .await
    }

    async fn finish(&self, id: &str, branch: &str, note: &str, stamp: &Stamp) -> Result<Checklist, DatabaseError> {
        self.modify_open(id, branch, |checklist| {
            checklist.is_finish = true;
            checklist.time_ended = stamp.at;
            checklist.note = note.to_string();
            checklist.updated_at = stamp.at;
            checklist.updated_by = stamp.by.clone();
            true
        })
        .await
    }

    async fn delete(&self, id: &str, branch: &str) -> Result<Checklist, DatabaseError> {
        let mut rows = self.rows.write().await;
        match rows.get(id) {
            Some(c) if c.branch == branch && !c.is_finish => rows.remove(id).ok_or_else(|| not_found(CHECKLIST)),
            _ => Err(not_found(CHECKLIST)),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    rows: Table<User>,
}

const USER: &str = "user";

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        insert_new(&mut *self.rows.write().await, &user.id, user, USER)
    }

    async fn get(&self, id: &str) -> Result<User, DatabaseError> {
        self.rows.read().await.get(id).cloned().ok_or_else(|| not_found(USER))
    }

    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(select(&rows, |u| filter.matches(u), UserFilter::order, filter.limit))
    }

    async fn edit(&self, id: &str, edit: &UserEdit, updated_at: i64) -> Result<User, DatabaseError> {
        let mut rows = self.rows.write().await;
        let user = rows.get_mut(id).ok_or_else(|| not_found(USER))?;
        user.name = edit.name.clone();
        user.email = edit.email.clone();
        user.roles = edit.roles.clone();
        user.branch = edit.branch.clone();
        user.updated_at = updated_at;
        Ok(user.clone())
    }

    async fn change_password(&self, id: &str, hashed_password: &str, updated_at: i64) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        let user = rows.get_mut(id).ok_or_else(|| not_found(USER))?;
        user.hashed_password = hashed_password.to_string();
        user.updated_at = updated_at;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<User, DatabaseError> {
        self.rows.write().await.remove(id).ok_or_else(|| not_found(USER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ping_history_is_capped() {
        let store = MemoryGenUnitStore::default();
        let unit = GenUnit::new("u1".into(), "CCTV".into(), "CAM".into(), String::new(), "NORTH".into());
        store.insert(&unit).await.unwrap();
        for time in 1..=5 {
            store.append_ping("u1", &PingState { code: 1, time }).await.unwrap();
        }
        let unit = store.get("u1").await.unwrap();
        let times: Vec<i64> = unit.pings_state.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![3, 4, 5]);
        assert_eq!(unit.last_ping, 5);
    }

    #[tokio::test]
    async fn cases_are_counted_once() {
        let store = MemoryGenUnitStore::default();
        let unit = GenUnit::new("u1".into(), "CCTV".into(), "CAM".into(), String::new(), "NORTH".into());
        store.insert(&unit).await.unwrap();
        let case = Case { case_id: "h1".into(), case_note: "offline".into() };
        store.insert_case("u1", &case).await.unwrap();
        let unit = store.insert_case("u1", &case).await.unwrap();
        assert_eq!(unit.cases_size, 1);
        store.delete_case("u1", "h1").await.unwrap();
        let unit = store.delete_case("u1", "h1").await.unwrap();
        assert_eq!(unit.cases_size, 0);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = MemoryGenUnitStore::default();
        let unit = GenUnit::new("u1".into(), "PC".into(), "PC-01".into(), String::new(), "NORTH".into());
        store.insert(&unit).await.unwrap();
        assert!(matches!(store.insert(&unit).await, Err(DatabaseError::Duplicate(_))));
    }

    #[tokio::test]
    async fn one_unfinished_checklist_per_branch_and_kind() {
        let store = MemoryChecklistStore::default();
        let checklist = |id: &str, kind: ChecklistKind, is_finish: bool| Checklist {
            id: id.to_string(),
            created_at: 1,
            created_by: "vendor1".to_string(),
            updated_at: 1,
            updated_by: "vendor1".to_string(),
            branch: "NORTH".to_string(),
            kind,
            name: "check".to_string(),
            time_started: 1,
            time_ended: 0,
            is_finish,
            note: String::new(),
            items: Vec::new(),
        };
        store.insert(&checklist("c1", ChecklistKind::Vendor, false)).await.unwrap();
        let second = store.insert(&checklist("c2", ChecklistKind::Vendor, false)).await;
        assert!(matches!(second, Err(DatabaseError::Duplicate(_))));

        store.insert(&checklist("c3", ChecklistKind::Altai, false)).await.unwrap();
        store.insert(&checklist("c4", ChecklistKind::Vendor, true)).await.unwrap();
    }

    #[tokio::test]
    async fn stock_quantity_overflow_is_an_error() {
        let store = MemoryStockStore::default();
        let stock = Stock {
            id: "s1".into(),
            created_at: 1,
            created_by: "budi".into(),
            updated_at: 1,
            updated_by: "budi".into(),
            branch: "NORTH".into(),
            input: StockInput { name: "CABLE".into(), ..Default::default() },
            quantity: 5,
            increment: Vec::new(),
            decrement: Vec::new(),
            disable: false,
            image: String::new(),
        };
        store.insert(&stock).await.unwrap();

        let change = StockChange { author: "budi".into(), qty: i64::MAX, time: 2, note: String::new(), base_qty: 5 };
        let result = store.change_qty("s1", "NORTH", StockMode::Increment, &change).await;
        assert!(matches!(result, Err(DatabaseError::QueryError(_))));

        let stock = store.get("s1").await.unwrap();
        assert_eq!(stock.quantity, 5);
        assert!(stock.increment.is_empty());
    }
}
