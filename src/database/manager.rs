use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database call exceeded {0:?}")]
    Timeout(Duration),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error(transparent)]
    Serialization(#[from] mongodb::bson::ser::Error),
}

impl DatabaseError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DatabaseError::NotFound(what.into())
    }
}

/// Run one driver call under the configured deadline
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, mongodb::error::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(DatabaseError::from),
        Err(_) => Err(DatabaseError::Timeout(limit)),
    }
}

/// E11000 from a unique index
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

/// Shared Mongo handle. Cloning is cheap, the driver pools connections internally.
#[derive(Clone)]
pub struct DatabaseManager {
    client: Client,
    database: Database,
    call_timeout: Duration,
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(config.app_name.clone());
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(Duration::from_millis(config.connect_timeout_ms));
        options.server_selection_timeout = Some(Duration::from_millis(config.connect_timeout_ms));

        let client = Client::with_options(options)?;
        let database = client.database(&config.name);

        info!("Connected MongoDB client for database: {}", config.name);
        Ok(Self {
            client,
            database,
            call_timeout: config.call_timeout(),
        })
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        self.database.collection::<T>(name)
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Pings the server to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        bounded(self.call_timeout, self.database.run_command(doc! { "ping": 1 }, None)).await?;
        Ok(())
    }

    /// Indexes for the branch partition key and the lookups the services run
    pub async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        let branch_indexed = ["cctv", "computer", "other", "stock", "history", "checklist", "genunit"];
        for name in branch_indexed {
            self.create_index(name, doc! { "branch": 1 }).await?;
        }
        self.create_index("genunit", doc! { "category": 1, "branch": 1 }).await?;
        self.create_index("history", doc! { "parent_id": 1 }).await?;
        self.create_index("checklist", doc! { "kind": 1, "branch": 1, "is_finish": 1 }).await?;

        // at most one unfinished checklist per branch and kind
        let one_open = IndexOptions::builder()
            .background(true)
            .unique(true)
            .partial_filter_expression(doc! { "is_finish": false })
            .build();
        self.create_index_with("checklist", doc! { "branch": 1, "kind": 1 }, one_open).await?;
        Ok(())
    }

    async fn create_index(&self, collection: &str, keys: Document) -> Result<(), DatabaseError> {
        self.create_index_with(collection, keys, IndexOptions::builder().background(true).build())
            .await
    }

    async fn create_index_with(
        &self,
        collection: &str,
        keys: Document,
        options: IndexOptions,
    ) -> Result<(), DatabaseError> {
        let model = IndexModel::builder().keys(keys).options(options).build();
        bounded(
            self.call_timeout,
            self.collection::<Document>(collection).create_index(model, None),
        )
        .await?;
        Ok(())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("Closed MongoDB client");
    }
}
