pub mod asset;
pub mod checklist;
pub mod genunit;
pub mod history;
pub mod stock;
pub mod user;

pub use asset::{AssetDoc, AssetInput, AssetKind, CctvDetail, ComputerDetail, FieldErrors, OtherDetail};
pub use checklist::{CheckItem, CheckItemPatch, Checklist, ChecklistSummary};
pub use genunit::{Case, GenUnit, GenUnitEdit, PingState};
pub use history::{History, HistoryEdit, HistoryInput, HistoryUpdate};
pub use stock::{Stock, StockChange, StockInput, StockMode};
pub use user::{RegisterInput, User, UserEdit, UserView};
