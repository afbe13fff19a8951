use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub const MANAGED_TABLES: &[&str] = &["category", "service", "cart"];

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Tables from [`MANAGED_TABLES`] that are not present yet.
pub async fn missing_tables(pool: &DbPool) -> Result<Vec<&'static str>, sqlx::Error> {
    let mut missing = Vec::new();
    for table in MANAGED_TABLES {
        let exists: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;
        if exists == 0 {
            missing.push(*table);
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::{missing_tables, run_pending, MANAGED_TABLES, MIGRATOR};
    use crate::connect_with_settings;

    #[tokio::test]
    async fn fresh_database_reports_every_table_missing() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");

        let missing = missing_tables(&pool).await.expect("inspect schema");
        assert_eq!(missing, MANAGED_TABLES.to_vec());
    }

    #[tokio::test]
    async fn migrations_create_order_catalog_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        assert!(missing_tables(&pool).await.expect("inspect schema").is_empty());

        let index_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_cart_%'",
        )
        .fetch_one(&pool)
        .await
        .expect("count cart indexes");
        assert_eq!(index_count, 2);
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&pool)
            .await
            .expect("count applied migrations");
        assert_eq!(applied, MIGRATOR.iter().count() as i64);
    }
}
