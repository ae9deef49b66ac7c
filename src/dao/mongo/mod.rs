mod asset;
mod checklist;
mod genunit;
mod history;
mod stock;
mod user;

pub use asset::MongoAssetStore;
pub use checklist::MongoChecklistStore;
pub use genunit::MongoGenUnitStore;
pub use history::MongoHistoryStore;
pub use stock::MongoStockStore;
pub use user::MongoUserStore;
