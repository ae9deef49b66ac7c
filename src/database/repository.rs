use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::database::manager::{bounded, is_duplicate_key, DatabaseError, DatabaseManager};

/// Typed wrapper around one collection; every call is bounded by the call timeout
pub struct Repository<T> {
    collection_name: &'static str,
    collection: Collection<T>,
    call_timeout: Duration,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            collection_name: self.collection_name,
            collection: self.collection.clone(),
            call_timeout: self.call_timeout,
        }
    }
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    pub fn new(manager: &DatabaseManager, collection_name: &'static str) -> Self {
        Self {
            collection_name,
            collection: manager.collection::<T>(collection_name),
            call_timeout: manager.call_timeout(),
        }
    }

    pub async fn insert(&self, document: &T) -> Result<(), DatabaseError> {
        match bounded(self.call_timeout, self.collection.insert_one(document, None)).await {
            Ok(_) => Ok(()),
            Err(DatabaseError::Mongo(e)) if is_duplicate_key(&e) => Err(DatabaseError::Duplicate(
                format!("document already exists in {}", self.collection_name),
            )),
            Err(other) => Err(other),
        }
    }

    pub async fn select_any(
        &self,
        filter: Document,
        sort: Document,
        limit: i64,
    ) -> Result<Vec<T>, DatabaseError> {
        let options = FindOptions::builder().sort(sort).limit(limit).build();
        let timeout = self.call_timeout;
        bounded(timeout, async {
            let cursor = self.collection.find(filter, options).await?;
            cursor.try_collect::<Vec<T>>().await
        })
        .await
    }

    pub async fn select_one(&self, filter: Document) -> Result<Option<T>, DatabaseError> {
        bounded(self.call_timeout, self.collection.find_one(filter, None)).await
    }

    pub async fn select_404(&self, filter: Document) -> Result<T, DatabaseError> {
        self.select_one(filter)
            .await?
            .ok_or_else(|| self.not_found())
    }

    /// `findOneAndUpdate` returning the document after the update
    pub async fn update_404(&self, filter: Document, update: Document) -> Result<T, DatabaseError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        bounded(
            self.call_timeout,
            self.collection.find_one_and_update(filter, update, options),
        )
        .await?
        .ok_or_else(|| self.not_found())
    }

    pub async fn delete_404(&self, filter: Document) -> Result<T, DatabaseError> {
        bounded(self.call_timeout, self.collection.find_one_and_delete(filter, None))
            .await?
            .ok_or_else(|| self.not_found())
    }

    fn not_found(&self) -> DatabaseError {
        DatabaseError::NotFound(format!("{} not found or not editable", self.collection_name))
    }
}
