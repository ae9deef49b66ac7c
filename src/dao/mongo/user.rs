use async_trait::async_trait;
use mongodb::bson::doc;

use crate::dao::UserStore;
use crate::database::models::{User, UserEdit};
use crate::database::{DatabaseError, DatabaseManager, Repository};
use crate::filter::UserFilter;

pub const COLLECTION: &str = "user";

pub struct MongoUserStore {
    repo: Repository<User>,
}

impl MongoUserStore {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            repo: Repository::new(manager, COLLECTION),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        self.repo.insert(user).await
    }

    async fn get(&self, id: &str) -> Result<User, DatabaseError> {
        self.repo.select_404(doc! { "_id": id }).await
    }

    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, DatabaseError> {
        self.repo
            .select_any(
                filter.to_document(),
                UserFilter::sort_document(),
                filter.limit.unwrap_or(0),
            )
            .await
    }

    async fn edit(&self, id: &str, edit: &UserEdit, updated_at: i64) -> Result<User, DatabaseError> {
        let update = doc! {
            "$set": {
                "name": edit.name.as_str(),
                "email": edit.email.as_str(),
                "roles": edit.roles.clone(),
                "branch": edit.branch.as_str(),
                "updated_at": updated_at,
            }
        };
        self.repo.update_404(doc! { "_id": id }, update).await
    }

    async fn change_password(&self, id: &str, hashed_password: &str, updated_at: i64) -> Result<(), DatabaseError> {
        let update = doc! { "$set": { "hashed_password": hashed_password, "updated_at": updated_at } };
        self.repo.update_404(doc! { "_id": id }, update).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<User, DatabaseError> {
        self.repo.delete_404(doc! { "_id": id }).await
    }
}
