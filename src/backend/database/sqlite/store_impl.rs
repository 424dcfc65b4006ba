use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use crate::allowlist::Allowlist;
use crate::backend::database::{
    DatabaseBackendConfig, OptionAccessor, UnifiedOptionOps, OPTIONS_TABLE,
};
use crate::backend::{AllowlistStore, Backend};
use crate::error::{AppError, AppResult};

/// SQLite-specific option accessor storing JSON as TEXT
pub struct SqliteOptionAccessor {
    pool: SqlitePool,
}

impl SqliteOptionAccessor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OptionAccessor for SqliteOptionAccessor {
    async fn read_option(&self, name: &str) -> AppResult<Option<String>> {
        let sql = format!("SELECT value FROM {} WHERE name = ?1", OPTIONS_TABLE);

        sqlx::query_scalar::<_, String>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read option {}: {}", name, e)))
    }

    async fn write_option(
        &self,
        name: &str,
        value: &str,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let sql = format!(
            "INSERT INTO {} (name, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            OPTIONS_TABLE
        );

        sqlx::query(&sql)
            .bind(name)
            .bind(value)
            .bind(updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to write option {}: {}", name, e)))?;

        Ok(())
    }
}

/// SQLite allow-list store
pub struct SqliteAllowlistStore {
    pool: SqlitePool,
    option_ops: UnifiedOptionOps<SqliteOptionAccessor>,
}

impl SqliteAllowlistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            option_ops: UnifiedOptionOps::new(SqliteOptionAccessor::new(pool.clone())),
            pool,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Backend for SqliteAllowlistStore {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        let options = SqliteConnectOptions::from_str(&config.connection_url)
            .map_err(|e| AppError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout));

        if config.is_memory_database() {
            // every new connection would open a fresh, empty database
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to SQLite: {}", e)))?;

        Ok(Self::new(pool))
    }

    async fn init_schema(&self) -> AppResult<()> {
        super::schema::init_options_schema(&self.pool).await
    }
}

#[async_trait]
impl AllowlistStore for SqliteAllowlistStore {
    async fn get(&self) -> AppResult<Allowlist> {
        self.option_ops.load_allowlist().await
    }

    async fn set(&self, allowlist: &Allowlist) -> AppResult<()> {
        self.option_ops.save_allowlist(allowlist).await
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Health check failed: {}", e)))?;

        Ok(())
    }
}
