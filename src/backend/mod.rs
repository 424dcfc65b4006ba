use crate::allowlist::Allowlist;
use crate::config::BackendConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::sync::Arc;

pub mod database;
pub mod memory;

pub use memory::MemoryAllowlistStore;

/// Supported database backend types
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn parse(db_type: &str) -> AppResult<Self> {
        match db_type {
            "postgresql" => Ok(DatabaseType::PostgreSQL),
            "sqlite" => Ok(DatabaseType::SQLite),
            other => Err(AppError::Configuration(format!(
                "Unsupported database type: {}",
                other
            ))),
        }
    }
}

/// Persistence for the signup allow-list.
///
/// The allow-list is a single value read and written wholesale: `get` falls
/// back to an empty list when nothing was saved yet and `set` overwrites
/// whatever was there (last write wins).
#[async_trait]
pub trait AllowlistStore: Send + Sync {
    /// Read the current allow-list, or an empty one if none was saved
    async fn get(&self) -> AppResult<Allowlist>;

    /// Replace the stored allow-list
    async fn set(&self, allowlist: &Allowlist) -> AppResult<()>;

    /// Check if the storage is reachable
    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Connection lifecycle for database-backed stores
#[async_trait]
pub trait Backend: Send + Sync {
    /// Connect to the storage backend
    async fn connect(config: &database::DatabaseBackendConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Create the tables the store needs if they do not exist yet
    async fn init_schema(&self) -> AppResult<()>;
}

/// Factory for creating allow-list stores
pub struct BackendFactory;

impl BackendFactory {
    /// Create and initialize the store described by configuration
    pub async fn create(config: &BackendConfig) -> AppResult<Arc<dyn AllowlistStore>> {
        match config.backend_type.as_str() {
            "memory" => Ok(Arc::new(MemoryAllowlistStore::new())),
            "database" => {
                let database = config.database.as_ref().ok_or_else(|| {
                    AppError::Configuration(
                        "Database configuration is required when backend type is 'database'"
                            .to_string(),
                    )
                })?;

                let backend_config = database::DatabaseBackendConfig::new(
                    DatabaseType::parse(&database.db_type)?,
                    database.url.clone(),
                )
                .with_max_connections(database.max_connections)
                .with_connection_timeout(database.connection_timeout);

                Self::create_database_store(&backend_config).await
            }
            other => Err(AppError::Configuration(format!(
                "Unsupported backend type: {}",
                other
            ))),
        }
    }

    /// Connect a database store and initialize its schema
    pub async fn create_database_store(
        config: &database::DatabaseBackendConfig,
    ) -> AppResult<Arc<dyn AllowlistStore>> {
        match config.database_type {
            DatabaseType::PostgreSQL => {
                let store = database::PostgresAllowlistStore::connect(config).await?;
                store.init_schema().await?;
                Ok(Arc::new(store))
            }
            DatabaseType::SQLite => {
                let store = database::SqliteAllowlistStore::connect(config).await?;
                store.init_schema().await?;
                Ok(Arc::new(store))
            }
        }
    }
}
