use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::allowlist::Allowlist;
use crate::backend::database::{
    DatabaseBackendConfig, OptionAccessor, UnifiedOptionOps, OPTIONS_TABLE,
};
use crate::backend::{AllowlistStore, Backend};
use crate::error::{AppError, AppResult};

/// PostgreSQL-specific option accessor storing JSON as JSONB
pub struct PostgresOptionAccessor {
    pool: PgPool,
}

impl PostgresOptionAccessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OptionAccessor for PostgresOptionAccessor {
    async fn read_option(&self, name: &str) -> AppResult<Option<String>> {
        let sql = format!("SELECT value::text FROM {} WHERE name = $1", OPTIONS_TABLE);

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
            "INSERT INTO {} (name, value, updated_at) VALUES ($1, $2::jsonb, $3) \
             ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
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

/// PostgreSQL allow-list store
pub struct PostgresAllowlistStore {
    pool: PgPool,
    option_ops: UnifiedOptionOps<PostgresOptionAccessor>,
}

impl PostgresAllowlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            option_ops: UnifiedOptionOps::new(PostgresOptionAccessor::new(pool.clone())),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Backend for PostgresAllowlistStore {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        config
            .validate()
            .map_err(|e| AppError::Configuration(format!("Invalid backend config: {}", e)))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.connection_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    async fn init_schema(&self) -> AppResult<()> {
        super::schema::init_options_schema(&self.pool).await
    }
}

#[async_trait]
impl AllowlistStore for PostgresAllowlistStore {
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
