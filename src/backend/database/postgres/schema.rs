use crate::backend::database::OPTIONS_TABLE;
use crate::error::{AppError, AppResult};
use sqlx::PgPool;

/// Initialize the options table for PostgreSQL
pub async fn init_options_schema(pool: &PgPool) -> AppResult<()> {
    let options_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            name TEXT PRIMARY KEY,
            value JSONB NOT NULL,
            updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
        )
        "#,
        OPTIONS_TABLE
    );

    sqlx::query(&options_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create options table: {}", e)))?;

    Ok(())
}
