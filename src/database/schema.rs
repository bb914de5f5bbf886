use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Statements of the bundled DDL, in file order
pub fn statements() -> impl Iterator<Item = &'static str> {
    SCHEMA_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Create the companies, jobs and users tables if they are missing
pub async fn apply(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for statement in statements() {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Database schema applied");
    Ok(())
}
