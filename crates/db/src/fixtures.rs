use serde::Serialize;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

const DEMO_CATEGORY_IDS: &[i64] = &[1, 2, 3];
const DEMO_SERVICE_IDS: &[i64] = &[1, 2, 3, 4, 5];
const DEMO_CART_IDS: &[i64] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

/// Cart line that references a service absent from the catalog.
const DEMO_ORPHAN_CART_ID: i64 = 8;

/// Deterministic demo orders: four weeks of salon bookings across three categories.
pub struct DemoDataset;

impl DemoDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_orders.sql");

    /// Inserts the demo rows. Rows that already exist are left untouched.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(Self::SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(SeedResult {
            categories: DEMO_CATEGORY_IDS.len(),
            services: DEMO_SERVICE_IDS.len(),
            order_lines: DEMO_CART_IDS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        checks.push(("categories", count_present(pool, "category", DEMO_CATEGORY_IDS).await?));
        checks.push(("services", count_present(pool, "service", DEMO_SERVICE_IDS).await?));
        checks.push(("order-lines", count_present(pool, "cart", DEMO_CART_IDS).await?));

        let orphan_unresolved: i64 = sqlx::query_scalar(
            "SELECT NOT EXISTS(SELECT 1 FROM service WHERE id = (SELECT product_id FROM cart WHERE id = ?1))",
        )
        .bind(DEMO_ORPHAN_CART_ID)
        .fetch_one(pool)
        .await?;
        checks.push(("orphan-line-unresolved", orphan_unresolved == 1));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the demo rows, leaving anything else in place.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        for (table, ids) in
            [("cart", DEMO_CART_IDS), ("service", DEMO_SERVICE_IDS), ("category", DEMO_CATEGORY_IDS)]
        {
            sqlx::query(&format!("DELETE FROM {table} WHERE id IN {}", sql_array_from_ids(ids)))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn count_present(
    pool: &DbPool,
    table: &'static str,
    ids: &[i64],
) -> Result<bool, RepositoryError> {
    let present: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(1) FROM {table} WHERE id IN {}",
        sql_array_from_ids(ids)
    ))
    .fetch_one(pool)
    .await?;
    Ok(present == ids.len() as i64)
}

fn sql_array_from_ids(ids: &[i64]) -> String {
    let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
    format!("({joined})")
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SeedResult {
    pub categories: usize,
    pub services: usize,
    pub order_lines: usize,
}

#[derive(Debug, Serialize)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
