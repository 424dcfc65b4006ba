use crate::backend::database::OPTIONS_TABLE;
use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

/// Initialize the options table for SQLite
pub async fn init_options_schema(pool: &SqlitePool) -> AppResult<()> {
    let options_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
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

/// Drop the options table (for cleanup/testing)
#[cfg(test)]
pub async fn drop_options_schema(pool: &SqlitePool) -> AppResult<()> {
    let sql = format!("DROP TABLE IF EXISTS {}", OPTIONS_TABLE);
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to drop options table: {}", e)))?;

    Ok(())
}
