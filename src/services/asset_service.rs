use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{check_fields, reconcile, stamp, FindLimits, ServiceError, ServiceResult};
use crate::dao::{AssetStore, GenUnitStore};
use crate::database::models::{AssetDoc, AssetInput, AssetKind, FieldErrors, GenUnit, GenUnitEdit};
use crate::database::DatabaseError;
use crate::filter::AssetFilter;
use crate::middleware::AuthUser;
use crate::types::{new_id, unix_now};

/// Request body for asset insert and edit
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "D: AssetKind")]
pub struct AssetPayload<D> {
    /// `updated_at` the client last read; required on edit
    #[serde(default)]
    pub filter_timestamp: Option<i64>,
    #[serde(flatten)]
    pub input: AssetInput,
    #[serde(flatten)]
    pub detail: D,
}

/// CRUD for one asset registry, mirrored into the GenUnit collection
pub struct AssetService<D: AssetKind> {
    assets: Arc<dyn AssetStore<D>>,
    units: Arc<dyn GenUnitStore>,
    limits: FindLimits,
}

impl<D: AssetKind> Clone for AssetService<D> {
    fn clone(&self) -> Self {
        Self {
            assets: self.assets.clone(),
            units: self.units.clone(),
            limits: self.limits,
        }
    }
}

impl<D: AssetKind> AssetService<D> {
    pub fn new(assets: Arc<dyn AssetStore<D>>, units: Arc<dyn GenUnitStore>, limits: FindLimits) -> Self {
        Self { assets, units, limits }
    }

    fn prepare(payload: AssetPayload<D>) -> ServiceResult<(AssetInput, D)> {
        let input = payload.input.normalized();
        let mut detail = payload.detail;
        detail.normalize();

        let mut errors = FieldErrors::new();
        input.validate(&mut errors);
        detail.validate(&mut errors);
        check_fields(errors)?;
        Ok((input, detail))
    }

    /// Loads the asset and hides it from callers of other branches
    async fn owned(&self, user: &AuthUser, id: &str) -> ServiceResult<AssetDoc<D>> {
        let asset = self.assets.get(id).await?;
        if asset.branch != user.branch {
            return Err(DatabaseError::not_found(format!("{} not found or not editable", D::COLLECTION)).into());
        }
        Ok(asset)
    }

    pub async fn insert(&self, user: &AuthUser, payload: AssetPayload<D>) -> ServiceResult<AssetDoc<D>> {
        let (input, detail) = Self::prepare(payload)?;
        let now = unix_now();
        let asset = AssetDoc {
            id: new_id(),
            created_at: now,
            created_by: user.identity.clone(),
            updated_at: now,
            updated_by: user.identity.clone(),
            branch: user.branch.clone(),
            disable: false,
            image: String::new(),
            input,
            detail,
        };
        let unit = GenUnit::new(
            asset.id.clone(),
            asset.detail.unit_category(),
            asset.input.name.clone(),
            asset.input.ip.clone(),
            asset.branch.clone(),
        );

        let (saved, mirrored) = tokio::join!(self.assets.insert(&asset), self.units.insert(&unit));
        reconcile(saved, mirrored)?;

        info!("{} {} inserted by {}", D::COLLECTION, asset.id, user.identity);
        Ok(asset)
    }

    /// Optimistic edit of the asset, then the mirror follows
    pub async fn edit(&self, user: &AuthUser, id: &str, payload: AssetPayload<D>) -> ServiceResult<AssetDoc<D>> {
        let filter_timestamp = payload
            .filter_timestamp
            .ok_or_else(|| super::field_error("filter_timestamp", "This field is required"))?;
        let (input, detail) = Self::prepare(payload)?;

        let updated = self
            .assets
            .edit(id, &user.branch, filter_timestamp, &input, &detail, &stamp(user))
            .await?;

        let mirror = GenUnitEdit {
            category: updated.detail.unit_category(),
            name: updated.input.name.clone(),
            ip: updated.input.ip.clone(),
            branch: updated.branch.clone(),
        };
        if let Err(e) = self.units.edit(id, &mirror).await {
            return Err(ServiceError::Internal(format!(
                "Asset saved but genunit mirror failed: {}",
                e
            )));
        }

        info!("{} {} edited by {}", D::COLLECTION, id, user.identity);
        Ok(updated)
    }

    pub async fn delete(&self, user: &AuthUser, id: &str) -> ServiceResult<AssetDoc<D>> {
        self.owned(user, id).await?;
        let (deleted, mirrored) = tokio::join!(self.assets.delete(id, &user.branch), self.units.delete(id));
        let deleted = reconcile(deleted, mirrored)?;

        info!("{} {} deleted by {}", D::COLLECTION, id, user.identity);
        Ok(deleted)
    }

    pub async fn disable(&self, user: &AuthUser, id: &str, disable: bool) -> ServiceResult<AssetDoc<D>> {
        self.owned(user, id).await?;
        let stamp = stamp(user);
        let (updated, mirrored) = tokio::join!(
            self.assets.set_disable(id, &user.branch, disable, &stamp),
            self.units.set_disable(id, disable)
        );
        reconcile(updated, mirrored)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<AssetDoc<D>> {
        Ok(self.assets.get(id).await?)
    }

    pub async fn find(&self, mut filter: AssetFilter) -> ServiceResult<Vec<AssetDoc<D>>> {
        filter.limit = self.limits.apply(filter.limit);
        Ok(self.assets.find(&filter).await?)
    }
}
