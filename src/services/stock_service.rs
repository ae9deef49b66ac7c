use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::{check_fields, field_error, stamp, FindLimits, ServiceError, ServiceResult};
use crate::dao::StockStore;
use crate::database::models::{FieldErrors, Stock, StockChange, StockInput, StockMode};
use crate::database::DatabaseError;
use crate::filter::StockFilter;
use crate::middleware::AuthUser;
use crate::types::{new_id, unix_now};

#[derive(Debug, Clone, Deserialize)]
pub struct StockPayload {
    /// `updated_at` the client last read; required on edit
    #[serde(default)]
    pub filter_timestamp: Option<i64>,
    /// Opening quantity, only read on insert
    #[serde(default)]
    pub quantity: i64,
    #[serde(flatten)]
    pub input: StockInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuantityChange {
    pub qty: i64,
    #[serde(default)]
    pub note: String,
}

#[derive(Clone)]
pub struct StockService {
    stocks: Arc<dyn StockStore>,
    limits: FindLimits,
}

fn normalized(mut input: StockInput) -> StockInput {
    input.name = input.name.trim().to_uppercase();
    input.category = input.category.trim().to_uppercase();
    input.unit = input.unit.trim().to_string();
    input
}

impl StockService {
    pub fn new(stocks: Arc<dyn StockStore>, limits: FindLimits) -> Self {
        Self { stocks, limits }
    }

    async fn owned(&self, user: &AuthUser, id: &str) -> ServiceResult<Stock> {
        let stock = self.stocks.get(id).await?;
        if stock.branch != user.branch {
            return Err(DatabaseError::not_found("stock not found or not editable").into());
        }
        Ok(stock)
    }

    pub async fn insert(&self, user: &AuthUser, payload: StockPayload) -> ServiceResult<Stock> {
        let input = normalized(payload.input);
        let mut errors = FieldErrors::new();
        input.validate(&mut errors);
        if payload.quantity < 0 {
            errors.insert("quantity".to_string(), "Must not be negative".to_string());
        }
        check_fields(errors)?;

        let now = unix_now();
        let stock = Stock {
            id: new_id(),
            created_at: now,
            created_by: user.identity.clone(),
            updated_at: now,
            updated_by: user.identity.clone(),
            branch: user.branch.clone(),
            input,
            quantity: payload.quantity,
            increment: Vec::new(),
            decrement: Vec::new(),
            disable: false,
            image: String::new(),
        };
        self.stocks.insert(&stock).await?;
        info!("stock {} inserted by {}", stock.id, user.identity);
        Ok(stock)
    }

    pub async fn edit(&self, user: &AuthUser, id: &str, payload: StockPayload) -> ServiceResult<Stock> {
        let filter_timestamp = payload
            .filter_timestamp
            .ok_or_else(|| field_error("filter_timestamp", "This field is required"))?;
        let input = normalized(payload.input);
        let mut errors = FieldErrors::new();
        input.validate(&mut errors);
        check_fields(errors)?;

        Ok(self
            .stocks
            .edit(id, &user.branch, filter_timestamp, &input, &stamp(user))
            .await?)
    }

    pub async fn delete(&self, user: &AuthUser, id: &str) -> ServiceResult<Stock> {
        let deleted = self.stocks.delete(id, &user.branch).await?;
        info!("stock {} deleted by {}", id, user.identity);
        Ok(deleted)
    }

    pub async fn disable(&self, user: &AuthUser, id: &str, disable: bool) -> ServiceResult<Stock> {
        Ok(self.stocks.set_disable(id, &user.branch, disable, &stamp(user)).await?)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Stock> {
        Ok(self.stocks.get(id).await?)
    }

    pub async fn find(&self, mut filter: StockFilter) -> ServiceResult<Vec<Stock>> {
        filter.limit = self.limits.apply(filter.limit);
        Ok(self.stocks.find(&filter).await?)
    }

    /// Quantity never drops below zero; a lost race on the guard reads as insufficient stock
    pub async fn change_qty(
        &self,
        user: &AuthUser,
        id: &str,
        mode: StockMode,
        change: QuantityChange,
    ) -> ServiceResult<Stock> {
        if change.qty <= 0 {
            return Err(field_error("qty", "Must be greater than zero"));
        }
        let stock = self.owned(user, id).await?;
        if stock.disable {
            return Err(ServiceError::BadRequest(format!("Stock {} is disabled", stock.input.name)));
        }
        let insufficient = || {
            ServiceError::BadRequest(format!(
                "Insufficient stock for {}: requested {}, available {}",
                stock.input.name, change.qty, stock.quantity
            ))
        };
        if mode == StockMode::Decrement && stock.quantity < change.qty {
            return Err(insufficient());
        }
        if mode == StockMode::Increment && stock.quantity.checked_add(change.qty).is_none() {
            return Err(field_error("qty", "Quantity would exceed the storable maximum"));
        }

        let record = StockChange {
            author: user.identity.clone(),
            qty: change.qty,
            time: unix_now(),
            note: change.note.trim().to_string(),
            base_qty: stock.quantity,
        };
        match self.stocks.change_qty(id, &user.branch, mode, &record).await {
            Ok(updated) => {
                info!("stock {} {} by {} ({})", id, mode.field(), change.qty, user.identity);
                if updated.below_threshold() {
                    warn!("stock {} is below its threshold: {} left", updated.input.name, updated.quantity);
                }
                Ok(updated)
            }
            Err(DatabaseError::NotFound(_)) if mode == StockMode::Decrement => Err(insufficient()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::memory::MemoryStockStore;
    use crate::services::test_support::user;

    fn payload(name: &str, quantity: i64) -> StockPayload {
        StockPayload {
            filter_timestamp: None,
            quantity,
            input: StockInput {
                name: name.to_string(),
                unit: "pcs".to_string(),
                threshold: 2,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn decrement_cannot_go_below_zero() {
        let service = StockService::new(Arc::new(MemoryStockStore::default()), FindLimits::default());
        let operator = user("budi", "NORTH", &["NORMAL"]);
        let stock = service.insert(&operator, payload("rj45 connector", 5)).await.unwrap();
        assert_eq!(stock.input.name, "RJ45 CONNECTOR");

        let taken = service
            .change_qty(&operator, &stock.id, StockMode::Decrement, QuantityChange { qty: 4, note: "rack".into() })
            .await
            .unwrap();
        assert_eq!(taken.quantity, 1);
        assert_eq!(taken.decrement[0].base_qty, 5);
        assert!(taken.below_threshold());

        let result = service
            .change_qty(&operator, &stock.id, StockMode::Decrement, QuantityChange { qty: 2, note: String::new() })
            .await;
        assert!(matches!(result, Err(ServiceError::BadRequest(_))));

        let restocked = service
            .change_qty(&operator, &stock.id, StockMode::Increment, QuantityChange { qty: 10, note: String::new() })
            .await
            .unwrap();
        assert_eq!(restocked.quantity, 11);
        assert_eq!(restocked.increment.len(), 1);
    }

    #[tokio::test]
    async fn quantity_must_be_positive_and_stock_enabled() {
        let service = StockService::new(Arc::new(MemoryStockStore::default()), FindLimits::default());
        let operator = user("budi", "NORTH", &["NORMAL"]);
        let stock = service.insert(&operator, payload("cable", 3)).await.unwrap();

        let zero = service
            .change_qty(&operator, &stock.id, StockMode::Increment, QuantityChange { qty: 0, note: String::new() })
            .await;
        assert!(matches!(zero, Err(ServiceError::Validation(_))));

        service.disable(&operator, &stock.id, true).await.unwrap();
        let disabled = service
            .change_qty(&operator, &stock.id, StockMode::Increment, QuantityChange { qty: 1, note: String::new() })
            .await;
        assert!(matches!(disabled, Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn increment_past_i64_max_is_a_field_error() {
        let service = StockService::new(Arc::new(MemoryStockStore::default()), FindLimits::default());
        let operator = user("budi", "NORTH", &["NORMAL"]);
        let stock = service.insert(&operator, payload("patch cord", 5)).await.unwrap();

        let result = service
            .change_qty(&operator, &stock.id, StockMode::Increment, QuantityChange { qty: i64::MAX, note: String::new() })
            .await;
        match result {
            Err(ServiceError::Validation(fields)) => assert!(fields.contains_key("qty")),
            other => panic!("unexpected: {:?}", other.map(|s| s.quantity)),
        }
        assert_eq!(service.get(&stock.id).await.unwrap().quantity, 5);
    }
}
