use axum::extract::FromRef;
use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::dao::memory::{
    MemoryAssetStore, MemoryChecklistStore, MemoryGenUnitStore, MemoryHistoryStore, MemoryStockStore,
    MemoryUserStore,
};
use crate::dao::mongo::{
    MongoAssetStore, MongoChecklistStore, MongoGenUnitStore, MongoHistoryStore, MongoStockStore, MongoUserStore,
};
use crate::dao::{AssetStore, ChecklistStore, GenUnitStore, HistoryStore, StockStore, UserStore};
use crate::database::models::{CctvDetail, ComputerDetail, OtherDetail};
use crate::database::DatabaseManager;
use crate::services::{
    AssetService, ChecklistService, FindLimits, GenUnitService, HistoryService, StockService, UserService,
};

/// Store handles for every collection
pub struct Stores {
    pub cctvs: Arc<dyn AssetStore<CctvDetail>>,
    pub computers: Arc<dyn AssetStore<ComputerDetail>>,
    pub others: Arc<dyn AssetStore<OtherDetail>>,
    pub units: Arc<dyn GenUnitStore>,
    pub histories: Arc<dyn HistoryStore>,
    pub stocks: Arc<dyn StockStore>,
    pub checklists: Arc<dyn ChecklistStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn mongo(db: &DatabaseManager) -> Self {
        Self {
            cctvs: Arc::new(MongoAssetStore::<CctvDetail>::new(db)),
            computers: Arc::new(MongoAssetStore::<ComputerDetail>::new(db)),
            others: Arc::new(MongoAssetStore::<OtherDetail>::new(db)),
            units: Arc::new(MongoGenUnitStore::new(db)),
            histories: Arc::new(MongoHistoryStore::new(db)),
            stocks: Arc::new(MongoStockStore::new(db)),
            checklists: Arc::new(MongoChecklistStore::new(db)),
            users: Arc::new(MongoUserStore::new(db)),
        }
    }

    pub fn memory() -> Self {
        Self {
            cctvs: Arc::new(MemoryAssetStore::<CctvDetail>::default()),
            computers: Arc::new(MemoryAssetStore::<ComputerDetail>::default()),
            others: Arc::new(MemoryAssetStore::<OtherDetail>::default()),
            units: Arc::new(MemoryGenUnitStore::default()),
            histories: Arc::new(MemoryHistoryStore::default()),
            stocks: Arc::new(MemoryStockStore::default()),
            checklists: Arc::new(MemoryChecklistStore::default()),
            users: Arc::new(MemoryUserStore::default()),
        }
    }
}

/// Shared by every handler; cloning copies `Arc`s only
#[derive(Clone)]
pub struct AppState {
    pub cctvs: AssetService<CctvDetail>,
    pub computers: AssetService<ComputerDetail>,
    pub others: AssetService<OtherDetail>,
    pub genunits: GenUnitService,
    pub histories: HistoryService,
    pub stocks: StockService,
    pub checklists: ChecklistService,
    pub users: UserService,
    pub tokens: TokenIssuer,
    /// `None` when running on the in-memory stores
    pub database: Option<DatabaseManager>,
}

impl AppState {
    pub fn new(config: &AppConfig, stores: Stores, database: Option<DatabaseManager>) -> Self {
        let limits = FindLimits::from_config(&config.api);
        let tokens = TokenIssuer::new(&config.security);
        let histories = HistoryService::new(stores.histories.clone(), stores.units.clone(), limits);

        Self {
            cctvs: AssetService::new(stores.cctvs.clone(), stores.units.clone(), limits),
            computers: AssetService::new(stores.computers.clone(), stores.units.clone(), limits),
            others: AssetService::new(stores.others.clone(), stores.units.clone(), limits),
            genunits: GenUnitService::new(stores.units.clone(), limits),
            checklists: ChecklistService::new(
                stores.checklists,
                stores.units,
                stores.cctvs,
                stores.computers,
                stores.others,
                histories.clone(),
                limits,
            ),
            histories,
            stocks: StockService::new(stores.stocks, limits),
            users: UserService::new(stores.users, tokens.clone(), limits),
            tokens,
            database,
        }
    }

    pub fn mongo(config: &AppConfig, db: DatabaseManager) -> Self {
        let stores = Stores::mongo(&db);
        Self::new(config, stores, Some(db))
    }

    pub fn memory(config: &AppConfig) -> Self {
        Self::new(config, Stores::memory(), None)
    }
}

impl FromRef<AppState> for AssetService<CctvDetail> {
    fn from_ref(state: &AppState) -> Self {
        state.cctvs.clone()
    }
}

impl FromRef<AppState> for AssetService<ComputerDetail> {
    fn from_ref(state: &AppState) -> Self {
        state.computers.clone()
    }
}

impl FromRef<AppState> for AssetService<OtherDetail> {
    fn from_ref(state: &AppState) -> Self {
        state.others.clone()
    }
}
