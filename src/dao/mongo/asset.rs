use async_trait::async_trait;
use mongodb::bson::{doc, to_document};

use crate::dao::{AssetStore, Stamp};
use crate::database::models::{AssetDoc, AssetInput, AssetKind};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::filter::AssetFilter;

/// One registry collection (`cctv`, `computer`, `other`), picked by the detail type
pub struct MongoAssetStore<D> {
    repo: Repository<AssetDoc<D>>,
}

impl<D: AssetKind> MongoAssetStore<D> {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            repo: Repository::new(manager, D::COLLECTION),
        }
    }
}

#[async_trait]
impl<D: AssetKind> AssetStore<D> for MongoAssetStore<D> {
    async fn insert(&self, asset: &AssetDoc<D>) -> Result<(), DatabaseError> {
        self.repo.insert(asset).await
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
        let mut set = to_document(input)?;
        set.extend(to_document(detail)?);
        set.insert("updated_at", stamp.at);
        set.insert("updated_by", stamp.by.as_str());

        let filter = doc! { "_id": id, "branch": branch, "updated_at": filter_timestamp };
        self.repo.update_404(filter, doc! { "$set": set }).await
    }

    async fn delete(&self, id: &str, branch: &str) -> Result<AssetDoc<D>, DatabaseError> {
        self.repo.delete_404(doc! { "_id": id, "branch": branch }).await
    }

    async fn set_disable(
        &self,
        id: &str,
        branch: &str,
        disable: bool,
        stamp: &Stamp,
    ) -> Result<AssetDoc<D>, DatabaseError> {
        let update = doc! {
            "$set": { "disable": disable, "updated_at": stamp.at, "updated_by": stamp.by.as_str() }
        };
        self.repo
            .update_404(doc! { "_id": id, "branch": branch }, update)
            .await
    }

    async fn get(&self, id: &str) -> Result<AssetDoc<D>, DatabaseError> {
        self.repo.select_404(doc! { "_id": id }).await
    }

    async fn find(&self, filter: &AssetFilter) -> Result<Vec<AssetDoc<D>>, DatabaseError> {
        self.repo
            .select_any(
                filter.to_document(),
                AssetFilter::sort_document(),
                filter.limit.unwrap_or(0),
            )
            .await
    }
}
